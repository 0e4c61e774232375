//! Application state for the terminal front end.

use std::sync::Arc;
use tracing::debug;

use janken::{
    Card, CommandError, GameOverResult, GamePhase, GameState, RoundFlow, RoundResult, Winner,
};

/// What a new snapshot means for the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing to schedule.
    None,
    /// A round has just been revealed; the next step is due after a pause.
    RoundRevealed,
    /// A new game was dealt.
    Dealt,
}

/// What the screen shows, rebuilt from each store snapshot.
#[derive(Debug)]
pub struct App {
    state: Arc<GameState>,
    status: String,
    game_over: Option<GameOverResult>,
    should_quit: bool,
}

impl App {
    /// Creates the app from the current snapshot.
    pub fn new(state: Arc<GameState>) -> Self {
        let mut app = Self {
            state,
            status: String::new(),
            game_over: None,
            should_quit: false,
        };
        app.status = app.phase_status();
        app
    }

    /// The latest snapshot.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Status line.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Final result, once the game has ended.
    pub fn game_over(&self) -> Option<&GameOverResult> {
        self.game_over.as_ref()
    }

    /// Whether the user asked to leave.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Marks the app for exit.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Replaces the snapshot and reports what changed.
    pub fn apply_snapshot(&mut self, next: Arc<GameState>) -> Transition {
        let previous = std::mem::replace(&mut self.state, next);
        debug!(from = %previous.phase, to = %self.state.phase, "Applying snapshot");

        let transition = if self.state.session != previous.session {
            self.game_over = None;
            Transition::Dealt
        } else if self.state.phase == GamePhase::RoundResult
            && previous.phase != GamePhase::RoundResult
        {
            Transition::RoundRevealed
        } else {
            Transition::None
        };

        if self.state.phase != GamePhase::GameOver {
            self.status = self.phase_status();
        }
        transition
    }

    /// Records what followed a revealed round.
    pub fn apply_flow(&mut self, flow: RoundFlow) {
        if let RoundFlow::GameOver(result) = flow {
            self.status = self.game_over_status(&result);
            self.game_over = Some(result);
        }
    }

    /// Shows a rejected command.
    pub fn report_error(&mut self, err: &CommandError) {
        self.status = format!("{} ({})", err, err.code());
    }

    /// The human's card at `index`, if any.
    pub fn card_at(&self, index: usize) -> Option<&Card> {
        self.state.human()?.hand.get(index)
    }

    /// The card each side committed this round, human first.
    pub fn battle(&self) -> (Option<&Card>, Option<&Card>) {
        let selected = &self.state.selected_cards;
        (
            self.state.human().and_then(|player| selected.get(&player.id)),
            self.state.opponent().and_then(|player| selected.get(&player.id)),
        )
    }

    fn phase_status(&self) -> String {
        let state = &self.state;
        match state.phase {
            GamePhase::Initialized | GamePhase::PlayerSelecting => "Dealing...".to_string(),
            GamePhase::Ready => {
                let cards = state.human().map_or(0, |player| player.hand.len());
                format!("Round {}: choose a card (1-{cards})", state.current_round)
            }
            GamePhase::Judging => "Judging...".to_string(),
            GamePhase::RoundResult => match state.last_result {
                Some(RoundResult::PlayerWin) => "You win the round!".to_string(),
                Some(RoundResult::ComputerWin) => "Computer wins the round.".to_string(),
                Some(RoundResult::Draw) | None => "Draw.".to_string(),
            },
            GamePhase::GameOver => "Game over.".to_string(),
        }
    }

    fn game_over_status(&self, result: &GameOverResult) -> String {
        let headline = match &result.winner {
            Winner::Draw => "It's a draw".to_string(),
            Winner::Player(id) => match self.state.player(id) {
                Some(player) if player.is_human => "You win the game".to_string(),
                Some(player) => format!("{} wins the game", player.name),
                None => format!("{id} wins the game"),
            },
        };
        format!("{headline} ({}). Press r to play again or q to quit.", result.reason)
    }
}
