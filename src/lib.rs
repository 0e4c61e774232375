//! Janken - a rock-paper-scissors card game engine
//!
//! A human and a computer opponent each hold a hand of rock, paper and
//! scissors cards and play one per round. The loser of a round pays a coin;
//! the game ends when a player runs out of coins or both hands are empty.
//!
//! # Architecture
//!
//! - **Store**: [`GameStateStore`] holds immutable snapshots and notifies
//!   subscribers after every write
//! - **Controller**: [`GameController`] is the round state machine and the
//!   only writer
//! - **Rules**: [`judge_round`] and [`evaluate_game_over`] are pure
//! - **Opponent**: [`OpponentSelector`] picks the computer's card;
//!   [`RandomSelector`] picks uniformly
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use janken::{GameConfig, GameController, RandomSelector};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let controller = GameController::new(GameConfig::default(), Arc::new(RandomSelector::new()));
//! let state = controller.initialize();
//! let human = state.human().expect("seat 0 is human");
//! controller.select_card(&human.id, &human.hand[0])?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod games;

// Crate-level exports - Game types
pub use games::janken::{
    Card, CardId, CardKind, GameOverReason, GameOverResult, GamePhase, GameState, Player,
    PlayerId, RoundResult, Winner,
};

// Crate-level exports - Configuration
pub use games::janken::{
    ConfigError, GameConfig, GameConfigOverrides, MAX_HAND_SIZE, MAX_PLAYER_COUNT,
};

// Crate-level exports - State store
pub use games::janken::{GameStateStore, Listener, ListenerId, StatePatch, Subscription};

// Crate-level exports - Controller and commands
pub use games::janken::{
    CommandError, ErrorCode, GameController, REVEAL_DELAY, RoundFlow, Selection,
};

// Crate-level exports - Opponent
pub use games::janken::{OpponentSelector, RandomSelector, SelectorError, current_hand};

// Crate-level exports - Rules, contracts and invariants
pub use games::janken::invariants::{
    Invariant, InvariantSet, InvariantViolation, JankenInvariants, KnownSelectionsInvariant,
    PhaseSelectionsInvariant, UniqueCardsInvariant,
};
pub use games::janken::rules::{evaluate_game_over, judge_round, loser_of};
pub use games::janken::{
    CardInHand, Contract, LegalSelection, PlayerSeated, ReadyPhase, RoundContract,
};
