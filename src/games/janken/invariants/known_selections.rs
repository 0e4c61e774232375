//! Known selections invariant.

use super::super::GameState;
use super::Invariant;

/// Invariant: selections are only recorded for seated players.
pub struct KnownSelectionsInvariant;

impl Invariant<GameState> for KnownSelectionsInvariant {
    fn holds(state: &GameState) -> bool {
        state
            .selected_cards
            .keys()
            .all(|player_id| state.player(player_id).is_some())
    }

    fn description() -> &'static str {
        "Selections belong to known players"
    }
}
