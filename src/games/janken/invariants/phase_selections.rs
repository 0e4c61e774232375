//! Phase selections invariant: where selected cards live in each phase.

use super::super::{Card, GamePhase, GameState, PlayerId};
use super::Invariant;

/// Invariant: selections agree with the phase.
///
/// - Before dealing (`Initialized`) there are none.
/// - While `Ready`, only the human's pending choice may be recorded, and
///   that card is still in hand.
/// - While `Judging`, every selected card is still in its owner's hand.
/// - After the reveal (`RoundResult`, `GameOver`), every selected card has
///   left its owner's hand and sits in the discard.
pub struct PhaseSelectionsInvariant;

impl Invariant<GameState> for PhaseSelectionsInvariant {
    fn holds(state: &GameState) -> bool {
        let in_hand = |(player_id, card): (&PlayerId, &Card)| {
            state
                .player(player_id)
                .is_some_and(|player| player.holds(&card.id))
        };

        match state.phase {
            GamePhase::Initialized => state.selected_cards.is_empty(),
            GamePhase::Ready => state.selected_cards.iter().all(|selection| {
                in_hand(selection)
                    && state
                        .player(selection.0)
                        .is_some_and(|player| player.is_human)
            }),
            GamePhase::Judging => state.selected_cards.iter().all(in_hand),
            GamePhase::RoundResult | GamePhase::GameOver => state
                .selected_cards
                .iter()
                .all(|selection| !in_hand(selection) && state.discarded(&selection.1.id)),
            GamePhase::PlayerSelecting => true,
        }
    }

    fn description() -> &'static str {
        "Selections match the phase (in hand until revealed, discarded after)"
    }
}
