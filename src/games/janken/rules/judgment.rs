//! Round judgment.

use super::super::{Card, RoundResult};
use tracing::instrument;

/// Judges one round. The first card is the human's, the second the opponent's.
///
/// Only the kinds matter; ids are ignored. Equal kinds draw, otherwise the
/// first card wins iff its kind beats the second.
#[instrument(skip(first, second), fields(first = %first.kind, second = %second.kind))]
pub fn judge_round(first: &Card, second: &Card) -> RoundResult {
    if first.kind == second.kind {
        RoundResult::Draw
    } else if first.kind.beats(second.kind) {
        RoundResult::PlayerWin
    } else {
        RoundResult::ComputerWin
    }
}

/// Returns the index (0 = first card's owner, 1 = second) of the side that
/// pays a coin, or `None` on a draw.
pub fn loser_of(result: RoundResult) -> Option<usize> {
    match result {
        RoundResult::PlayerWin => Some(1),
        RoundResult::ComputerWin => Some(0),
        RoundResult::Draw => None,
    }
}
