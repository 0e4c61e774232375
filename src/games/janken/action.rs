//! Commands issued to the controller and the ways they can be rejected.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::opponent::SelectorError;
use super::{Card, CardId, GamePhase, PlayerId};

/// A player's committed choice for the current round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// The player committing the card.
    pub player_id: PlayerId,
    /// The card being played.
    pub card: Card,
}

impl Selection {
    /// Creates a new selection.
    #[instrument]
    pub fn new(player_id: PlayerId, card: Card) -> Self {
        Self { player_id, card }
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} plays {}", self.player_id, self.card)
    }
}

/// Stable code identifying why a command was rejected.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unknown player, or a seat that does not choose its own card.
    NotPlayerTurn,
    /// The card is not in the player's hand.
    CardNotInHand,
    /// The command is not allowed in the current phase.
    InvalidPhase,
    /// The computer opponent could not choose a card.
    OpponentFailed,
    /// A round would have broken a game invariant.
    InvariantViolation,
}

/// Error returned by controller commands. The game state is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum CommandError {
    /// The player does not exist or does not choose its own card.
    #[display("Player {player_id} cannot select a card")]
    NotPlayerTurn {
        /// Player named in the command.
        player_id: PlayerId,
    },

    /// The card is not in the player's hand.
    #[display("Card {card_id} is not in the player's hand")]
    CardNotInHand {
        /// Card named in the command.
        card_id: CardId,
    },

    /// The command arrived in the wrong phase.
    #[display("Expected phase {expected}, game is in {actual}")]
    InvalidPhase {
        /// Phase the command requires.
        expected: GamePhase,
        /// Phase the game is in.
        actual: GamePhase,
    },

    /// The opponent selector failed; the round was aborted.
    #[display("Opponent selection failed: {}", _0)]
    Opponent(SelectorError),

    /// A postcondition failed; the round was aborted.
    #[display("Invariant violation: {}", description)]
    InvariantViolation {
        /// Violated invariants.
        description: String,
    },
}

impl CommandError {
    /// Returns the stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            CommandError::NotPlayerTurn { .. } => ErrorCode::NotPlayerTurn,
            CommandError::CardNotInHand { .. } => ErrorCode::CardNotInHand,
            CommandError::InvalidPhase { .. } => ErrorCode::InvalidPhase,
            CommandError::Opponent(_) => ErrorCode::OpponentFailed,
            CommandError::InvariantViolation { .. } => ErrorCode::InvariantViolation,
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Opponent(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SelectorError> for CommandError {
    fn from(err: SelectorError) -> Self {
        CommandError::Opponent(err)
    }
}
