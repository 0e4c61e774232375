//! Rock-paper-scissors card game.
//!
//! The [`GameStateStore`] holds the only copy of the game, the
//! [`GameController`] is the only writer, and the pure [`rules`] decide
//! rounds and the end of the game.

mod action;
mod config;
mod contracts;
mod controller;
mod opponent;
mod store;
mod types;

pub mod invariants;
pub mod rules;

pub use action::{CommandError, ErrorCode, Selection};
pub use config::{ConfigError, GameConfig, GameConfigOverrides, MAX_HAND_SIZE, MAX_PLAYER_COUNT};
pub use contracts::{CardInHand, Contract, LegalSelection, PlayerSeated, ReadyPhase, RoundContract};
pub use controller::{GameController, REVEAL_DELAY, RoundFlow};
pub use opponent::{OpponentSelector, RandomSelector, SelectorError, current_hand};
pub use store::{GameStateStore, Listener, ListenerId, StatePatch, Subscription};
pub use types::{
    Card, CardId, CardKind, GameOverReason, GameOverResult, GamePhase, GameState, Player,
    PlayerId, RoundResult, Winner,
};
