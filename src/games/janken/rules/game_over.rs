//! End-of-game detection.

use std::collections::BTreeMap;
use tracing::{debug, instrument};

use super::super::{GameOverReason, GameOverResult, GameState, Winner};

/// Returns the final result if the game can no longer continue.
///
/// Only the seats in play (the human and the designated opponent) are
/// considered; any further seats sit out. Coin depletion is checked first,
/// human first, and the other seat wins. Otherwise, once both hands are
/// empty, the seat with strictly more coins wins and a tie is a draw.
#[instrument(skip(state), fields(round = state.current_round))]
pub fn evaluate_game_over(state: &GameState) -> Option<GameOverResult> {
    let final_scores: BTreeMap<_, _> = state
        .players
        .iter()
        .map(|player| (player.id.clone(), player.coins))
        .collect();

    let seats: Vec<_> = state.human().into_iter().chain(state.opponent()).collect();

    if let Some(broke) = seats.iter().find(|player| player.coins == 0) {
        let winner = seats
            .iter()
            .find(|player| player.id != broke.id)
            .map_or(Winner::Draw, |player| Winner::Player(player.id.clone()));
        debug!(broke = %broke.id, %winner, "Coins depleted");
        return Some(GameOverResult {
            winner,
            reason: GameOverReason::CoinsDepleted,
            final_scores,
        });
    }

    if seats.iter().all(|player| player.hand.is_empty()) {
        let winner = match seats.as_slice() {
            [human, opponent] if human.coins > opponent.coins => Winner::Player(human.id.clone()),
            [human, opponent] if opponent.coins > human.coins => {
                Winner::Player(opponent.id.clone())
            }
            _ => Winner::Draw,
        };
        debug!(%winner, "Hands exhausted");
        return Some(GameOverResult {
            winner,
            reason: GameOverReason::HandExhausted,
            final_scores,
        });
    }

    None
}
