//! Game rules for rock-paper-scissors.
//!
//! Pure functions over cards and snapshots. The controller composes them;
//! nothing here touches the store.

pub mod game_over;
pub mod judgment;

pub use game_over::evaluate_game_over;
pub use judgment::{judge_round, loser_of};
