//! Card selection for computer-controlled seats.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, instrument};

use super::store::GameStateStore;
use super::{Card, PlayerId};

/// Failure to produce a card for a computer seat.
///
/// Each case means the controller asked for a card no seat can play; the
/// round is aborted rather than recovered.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SelectorError {
    /// No player with this id.
    #[display("Player {player_id} not found")]
    PlayerNotFound {
        /// Requested player.
        player_id: PlayerId,
    },

    /// The game has no computer-controlled seat to play against.
    #[display("No computer-controlled seat is in play")]
    NoOpponent,

    /// The player has no cards left.
    #[display("Player {player_id} has no cards in hand")]
    HandEmpty {
        /// Requested player.
        player_id: PlayerId,
    },
}

impl std::error::Error for SelectorError {}

/// Chooses a card for a computer-controlled seat.
///
/// Implementations read the store but never write to it, and must not
/// call back into the controller.
pub trait OpponentSelector: Send + Sync {
    /// Picks a card from the current hand of `player_id`.
    fn select_card(
        &self,
        player_id: &PlayerId,
        store: &GameStateStore,
    ) -> Result<Card, SelectorError>;

    /// Returns the selector's display name.
    fn name(&self) -> &str;
}

/// Reads the hand of `player_id`, failing if the seat is missing or empty.
#[instrument(skip(store))]
pub fn current_hand(player_id: &PlayerId, store: &GameStateStore) -> Result<Vec<Card>, SelectorError> {
    let state = store.get_state();
    let player = state
        .player(player_id)
        .ok_or_else(|| SelectorError::PlayerNotFound {
            player_id: player_id.clone(),
        })?;
    if player.hand.is_empty() {
        return Err(SelectorError::HandEmpty {
            player_id: player_id.clone(),
        });
    }
    Ok(player.hand.clone())
}

/// Picks uniformly at random from the current hand.
#[derive(Debug)]
pub struct RandomSelector {
    name: String,
    rng: Mutex<StdRng>,
}

impl RandomSelector {
    /// Creates a selector seeded from the operating system.
    #[instrument]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Creates a reproducible selector.
    #[instrument]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            name: "Computer".to_string(),
            rng: Mutex::new(rng),
        }
    }
}

impl Default for RandomSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl OpponentSelector for RandomSelector {
    #[instrument(skip(self, store), fields(selector = %self.name))]
    fn select_card(
        &self,
        player_id: &PlayerId,
        store: &GameStateStore,
    ) -> Result<Card, SelectorError> {
        let mut hand = current_hand(player_id, store)?;
        let index = self
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .random_range(0..hand.len());
        let card = hand.swap_remove(index);
        debug!(card = %card, hand_size = hand.len() + 1, "Opponent chose card");
        Ok(card)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::janken::{CardKind, GameConfig, GameState, StatePatch};
    use std::collections::HashSet;

    fn store_with_hand(hand: Vec<Card>) -> GameStateStore {
        let store = GameStateStore::new(&GameConfig::default());
        let mut players = store.get_state().players.clone();
        players[1].hand = hand;
        store.set_state(StatePatch::new().players(players));
        store
    }

    fn hand() -> Vec<Card> {
        vec![
            Card::new(CardKind::Rock, "card-1".into()),
            Card::new(CardKind::Paper, "card-2".into()),
            Card::new(CardKind::Scissors, "card-3".into()),
        ]
    }

    #[test]
    fn test_selects_a_card_from_hand() {
        let store = store_with_hand(hand());
        let selector = RandomSelector::seeded(7);
        let card = selector
            .select_card(&"player-1".into(), &store)
            .expect("hand is not empty");
        assert!(hand().contains(&card));
    }

    #[test]
    fn test_does_not_mutate_store() {
        let store = store_with_hand(hand());
        let before: GameState = (*store.get_state()).clone();
        let selector = RandomSelector::seeded(7);
        for _ in 0..10 {
            selector.select_card(&"player-1".into(), &store).expect("selects");
        }
        assert_eq!(*store.get_state(), before);
    }

    #[test]
    fn test_eventually_selects_every_card() {
        let store = store_with_hand(hand());
        let selector = RandomSelector::seeded(42);
        let seen: HashSet<_> = (0..200)
            .map(|_| selector.select_card(&"player-1".into(), &store).expect("selects").id)
            .collect();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_unknown_player() {
        let store = store_with_hand(hand());
        let err = RandomSelector::seeded(1)
            .select_card(&"player-9".into(), &store)
            .unwrap_err();
        assert!(matches!(err, SelectorError::PlayerNotFound { .. }));
    }

    #[test]
    fn test_empty_hand() {
        let store = store_with_hand(Vec::new());
        let err = RandomSelector::seeded(1)
            .select_card(&"player-1".into(), &store)
            .unwrap_err();
        assert!(matches!(err, SelectorError::HandEmpty { .. }));
    }

    #[test]
    fn test_same_seed_same_choices() {
        let store = store_with_hand(hand());
        let a = RandomSelector::seeded(99);
        let b = RandomSelector::seeded(99);
        for _ in 0..20 {
            assert_eq!(
                a.select_card(&"player-1".into(), &store).expect("selects"),
                b.select_card(&"player-1".into(), &store).expect("selects")
            );
        }
    }
}
