//! Contract-based validation for rounds.
//!
//! Preconditions gate a selection before the store is touched.
//! Postconditions compare the judging snapshot with the revealed one.

use tracing::{instrument, warn};

use super::action::{CommandError, Selection};
use super::invariants::{InvariantSet, JankenInvariants, describe};
use super::{GamePhase, GameState};

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// A contract defines preconditions and postconditions for state transitions.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), CommandError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), CommandError>;
}

// ─────────────────────────────────────────────────────────────
//  Selection Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: the selecting player is seated and chooses their own card.
pub struct PlayerSeated;

impl PlayerSeated {
    #[instrument(skip(state), fields(player = %selection.player_id))]
    pub fn check(selection: &Selection, state: &GameState) -> Result<(), CommandError> {
        match state.player(&selection.player_id) {
            Some(player) if player.is_human => Ok(()),
            _ => Err(CommandError::NotPlayerTurn {
                player_id: selection.player_id.clone(),
            }),
        }
    }
}

/// Precondition: the card is in the player's hand, matched by id.
pub struct CardInHand;

impl CardInHand {
    #[instrument(skip(state), fields(card = %selection.card.id))]
    pub fn check(selection: &Selection, state: &GameState) -> Result<(), CommandError> {
        let holds = state
            .player(&selection.player_id)
            .is_some_and(|player| player.holds(&selection.card.id));
        if holds {
            Ok(())
        } else {
            Err(CommandError::CardNotInHand {
                card_id: selection.card.id.clone(),
            })
        }
    }
}

/// Precondition: the game is waiting for a selection.
pub struct ReadyPhase;

impl ReadyPhase {
    #[instrument(skip(state), fields(phase = %state.phase))]
    pub fn check(state: &GameState) -> Result<(), CommandError> {
        if state.phase == GamePhase::Ready {
            Ok(())
        } else {
            Err(CommandError::InvalidPhase {
                expected: GamePhase::Ready,
                actual: state.phase,
            })
        }
    }
}

/// Composite precondition: seated player, card in hand, game ready.
///
/// Player and card are checked before the phase, so a bad card is reported
/// as such whatever the phase.
pub struct LegalSelection;

impl LegalSelection {
    /// Validates all preconditions for a selection.
    #[instrument(skip(state))]
    pub fn check(selection: &Selection, state: &GameState) -> Result<(), CommandError> {
        PlayerSeated::check(selection, state)?;
        CardInHand::check(selection, state)?;
        ReadyPhase::check(state)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
//  Round Contract (Pre + Post)
// ─────────────────────────────────────────────────────────────

/// Contract for a judged round.
///
/// Preconditions:
/// - Player is the seated human
/// - Card is in that player's hand
/// - Phase is `Ready`
///
/// Postconditions (`before` is the judging snapshot):
/// - No card is created or destroyed
/// - The discard grew by exactly the selected cards
/// - Each selecting player's hand shrank by one
/// - No player's coins went up, and none dropped by more than one
/// - All game invariants hold
pub struct RoundContract;

impl Contract<GameState, Selection> for RoundContract {
    fn pre(state: &GameState, action: &Selection) -> Result<(), CommandError> {
        LegalSelection::check(action, state)
    }

    fn post(before: &GameState, after: &GameState) -> Result<(), CommandError> {
        let mut failures = Vec::new();

        if before.card_count() != after.card_count() {
            failures.push(format!(
                "card count changed from {} to {}",
                before.card_count(),
                after.card_count()
            ));
        }

        let played = before.selected_cards.len();
        if after.discard.len() != before.discard.len() + played
            || !before
                .selected_cards
                .values()
                .all(|card| after.discarded(&card.id))
        {
            failures.push("discard did not receive exactly the played cards".to_string());
        }

        for player_id in before.selected_cards.keys() {
            let sizes = before
                .player(player_id)
                .zip(after.player(player_id))
                .map(|(b, a)| (b.hand.len(), a.hand.len()));
            if !matches!(sizes, Some((b, a)) if a + 1 == b) {
                failures.push(format!("hand of {player_id} did not shrink by one"));
            }
        }

        for before_player in &before.players {
            let Some(after_player) = after.player(&before_player.id) else {
                failures.push(format!("player {} disappeared", before_player.id));
                continue;
            };
            if after_player.coins > before_player.coins
                || before_player.coins - after_player.coins > 1
            {
                failures.push(format!(
                    "coins of {} went from {} to {}",
                    before_player.id, before_player.coins, after_player.coins
                ));
            }
        }

        if let Err(violations) = JankenInvariants::check_all(after) {
            failures.push(describe(&violations));
        }

        if failures.is_empty() {
            Ok(())
        } else {
            let description = format!("Postcondition failed: {}", failures.join("; "));
            warn!(%description, "Round contract violated");
            Err(CommandError::InvariantViolation { description })
        }
    }
}
