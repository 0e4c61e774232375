//! Unique cards invariant: every card id lives in exactly one place.

use std::collections::HashSet;

use super::super::GameState;
use super::Invariant;

/// Invariant: no card id appears twice across all hands and the discard.
pub struct UniqueCardsInvariant;

impl Invariant<GameState> for UniqueCardsInvariant {
    fn holds(state: &GameState) -> bool {
        let mut seen = HashSet::new();
        state
            .players
            .iter()
            .flat_map(|player| player.hand.iter())
            .chain(state.discard.iter())
            .all(|card| seen.insert(&card.id))
    }

    fn description() -> &'static str {
        "Each card id appears in at most one hand or the discard"
    }
}
