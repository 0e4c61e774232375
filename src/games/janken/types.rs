//! Core domain types for the rock-paper-scissors card game.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;

use super::config::GameConfig;

/// Kind printed on a card.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CardKind {
    /// Beats scissors.
    Rock,
    /// Beats rock.
    Paper,
    /// Beats paper.
    Scissors,
}

impl CardKind {
    /// Returns true if this kind defeats `other`.
    pub fn beats(self, other: CardKind) -> bool {
        matches!(
            (self, other),
            (CardKind::Rock, CardKind::Scissors)
                | (CardKind::Scissors, CardKind::Paper)
                | (CardKind::Paper, CardKind::Rock)
        )
    }

    /// Returns the display label for this kind.
    pub fn label(self) -> &'static str {
        match self {
            CardKind::Rock => "Rock",
            CardKind::Paper => "Paper",
            CardKind::Scissors => "Scissors",
        }
    }
}

/// Unique identifier for a card.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CardId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Unique identifier for a player.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Returns the seat id for the player at `index` (`player-0`, `player-1`, ...).
    pub fn seat(index: usize) -> Self {
        Self(format!("player-{index}"))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A single card. Identity is the id, never the kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
pub struct Card {
    /// Rock, paper or scissors.
    pub kind: CardKind,
    /// Unique id.
    pub id: CardId,
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.kind.label(), self.id)
    }
}

/// A seat at the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Player id.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Unplayed cards, in deal order.
    pub hand: Vec<Card>,
    /// Remaining coins.
    pub coins: u32,
    /// Whether this seat is driven by a person.
    pub is_human: bool,
}

impl Player {
    /// Creates the player for seat `index`. Seat 0 is the human.
    #[instrument]
    pub fn seated(index: usize, initial_coins: u32) -> Self {
        let is_human = index == 0;
        Self {
            id: PlayerId::seat(index),
            name: if is_human { "Player" } else { "Computer" }.to_string(),
            hand: Vec::new(),
            coins: initial_coins,
            is_human,
        }
    }

    /// Returns true if a card with this id is in hand.
    pub fn holds(&self, card_id: &CardId) -> bool {
        self.hand.iter().any(|card| &card.id == card_id)
    }

    /// Removes the card with this id from hand, if present.
    pub fn remove_from_hand(&mut self, card_id: &CardId) -> Option<Card> {
        let index = self.hand.iter().position(|card| &card.id == card_id)?;
        Some(self.hand.remove(index))
    }
}

/// Outcome of a single round, from the human's side of the table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundResult {
    /// The first card won.
    PlayerWin,
    /// The second card won.
    ComputerWin,
    /// Same kind on both sides.
    Draw,
}

/// Step of the round state machine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    /// Seats exist but no cards have been dealt.
    #[default]
    Initialized,
    /// Waiting for the human to commit a card.
    Ready,
    /// Declared for compatibility. No transition enters this phase.
    PlayerSelecting,
    /// Both cards committed; the reveal is pending.
    Judging,
    /// The round has been scored and revealed.
    RoundResult,
    /// Terminal.
    GameOver,
}

/// Winner of a finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    /// The player with this id won.
    Player(PlayerId),
    /// Nobody won.
    Draw,
}

impl std::fmt::Display for Winner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Winner::Player(id) => write!(f, "{id}"),
            Winner::Draw => write!(f, "DRAW"),
        }
    }
}

/// Why the game ended.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GameOverReason {
    /// A player ran out of coins.
    CoinsDepleted,
    /// Every hand has been played out.
    HandExhausted,
}

/// Final result reported once the game can no longer continue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOverResult {
    /// Winning player, or a draw.
    pub winner: Winner,
    /// Why the game ended.
    pub reason: GameOverReason,
    /// Coins held by every player at the end.
    pub final_scores: BTreeMap<PlayerId, u32>,
}

/// Complete game state.
///
/// Published snapshots are shared behind `Arc` and never mutated; every
/// change produces a new value through the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Current phase.
    pub phase: GamePhase,
    /// Seats, human first.
    pub players: Vec<Player>,
    /// Played cards in play order.
    pub discard: Vec<Card>,
    /// Round number, 1-based once dealt.
    pub current_round: u32,
    /// Result of the last revealed round.
    pub last_result: Option<RoundResult>,
    /// Committed choices for the current round.
    pub selected_cards: BTreeMap<PlayerId, Card>,
    /// Deal token, bumped by every (re)initialization.
    pub session: u64,
}

impl GameState {
    /// Creates the undealt state: seats with starting coins and empty hands.
    #[instrument(skip(config), fields(players = config.player_count()))]
    pub fn new(config: &GameConfig) -> Self {
        let players = (0..*config.player_count())
            .map(|index| Player::seated(index, *config.initial_coins()))
            .collect();
        Self {
            phase: GamePhase::Initialized,
            players,
            discard: Vec::new(),
            current_round: 0,
            last_result: None,
            selected_cards: BTreeMap::new(),
            session: 0,
        }
    }

    /// Looks up a player by id.
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| &player.id == id)
    }

    /// Returns the human player.
    pub fn human(&self) -> Option<&Player> {
        self.players.iter().find(|player| player.is_human)
    }

    /// Returns the designated computer opponent (the first non-human seat).
    pub fn opponent(&self) -> Option<&Player> {
        self.players.iter().find(|player| !player.is_human)
    }

    /// Number of cards across all hands and the discard.
    pub fn card_count(&self) -> usize {
        self.players
            .iter()
            .map(|player| player.hand.len())
            .sum::<usize>()
            + self.discard.len()
    }

    /// Total coins still held by all players.
    pub fn coins_in_play(&self) -> u32 {
        self.players.iter().map(|player| player.coins).sum()
    }

    /// Returns true if the discard holds a card with this id.
    pub fn discarded(&self, card_id: &CardId) -> bool {
        self.discard.iter().any(|card| &card.id == card_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_each_kind_beats_exactly_one_other() {
        for kind in CardKind::iter() {
            let wins = CardKind::iter().filter(|other| kind.beats(*other)).count();
            assert_eq!(wins, 1, "{kind} should beat exactly one kind");
            assert!(!kind.beats(kind));
        }
    }

    #[test]
    fn test_new_state_seats_human_first() {
        let state = GameState::new(&GameConfig::default());
        assert_eq!(state.phase, GamePhase::Initialized);
        assert_eq!(state.players.len(), 2);
        assert_eq!(state.human().map(|p| p.id.as_str()), Some("player-0"));
        assert_eq!(state.opponent().map(|p| p.id.as_str()), Some("player-1"));
        assert!(state.players.iter().all(|p| p.coins == 3 && p.hand.is_empty()));
    }

    #[test]
    fn test_remove_from_hand_matches_by_id() {
        let mut player = Player::seated(0, 3);
        player.hand.push(Card::new(CardKind::Rock, "card-a".into()));
        player.hand.push(Card::new(CardKind::Rock, "card-b".into()));

        let removed = player.remove_from_hand(&"card-b".into());
        assert_eq!(removed.map(|c| c.id), Some(CardId::from("card-b")));
        assert!(player.holds(&"card-a".into()));
        assert!(!player.holds(&"card-b".into()));
    }

    #[test]
    fn test_snapshot_serializes_with_wire_names() {
        let mut state = GameState::new(&GameConfig::default());
        state.phase = GamePhase::RoundResult;
        state.last_result = Some(RoundResult::PlayerWin);
        state.discard.push(Card::new(CardKind::Paper, "card-1-3".into()));

        let json = serde_json::to_value(&state).expect("serializes");
        assert_eq!(json["phase"], "ROUND_RESULT");
        assert_eq!(json["last_result"], "PLAYER_WIN");
        assert_eq!(json["discard"][0]["kind"], "PAPER");
        assert_eq!(json["discard"][0]["id"], "card-1-3");
        assert_eq!(json["players"][0]["id"], "player-0");
    }

    #[test]
    fn test_phase_labels() {
        assert_eq!(GamePhase::RoundResult.to_string(), "ROUND_RESULT");
        assert_eq!(RoundResult::ComputerWin.to_string(), "COMPUTER_WIN");
        assert_eq!(CardKind::Scissors.to_string(), "SCISSORS");
    }
}
