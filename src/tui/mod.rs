//! Terminal front end.
//!
//! The store pushes every snapshot through an unbounded channel into the
//! event loop, which redraws, reads keys, and after each revealed round
//! waits the next-round delay before asking the controller to move on.

mod app;
mod input;
mod ui;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::Backend, backend::CrosstermBackend};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant, sleep};
use tracing::{debug, error, info, instrument, warn};

use janken::{
    GameConfig, GameController, GameState, OpponentSelector, PlayerId, REVEAL_DELAY,
    RandomSelector,
};
use app::{App, Transition};
use input::{KeyCommand, parse_key};

/// Default pause between a revealed round and the next one.
pub const NEXT_ROUND_DELAY: Duration = Duration::from_millis(3000);

/// Timing and logging options for the terminal game.
#[derive(Debug, Clone)]
pub struct TuiOptions {
    /// Delay before a judged round is revealed.
    pub reveal_delay: Duration,
    /// Pause after a reveal before the next round (or the game-over screen).
    pub next_round_delay: Duration,
    /// Seed for the opponent; random if unset.
    pub seed: Option<u64>,
    /// File receiving the log output while the terminal is in raw mode.
    pub log_file: PathBuf,
}

impl Default for TuiOptions {
    fn default() -> Self {
        Self {
            reveal_delay: REVEAL_DELAY,
            next_round_delay: NEXT_ROUND_DELAY,
            seed: None,
            log_file: PathBuf::from("janken.log"),
        }
    }
}

/// Runs the terminal game until the user quits.
pub async fn run_tui(config: GameConfig, options: TuiOptions) -> Result<()> {
    // Log to a file so output does not tear the screen
    let log_file = std::fs::File::create(&options.log_file)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init();

    info!(?options, "Starting janken TUI");

    let selector: Arc<dyn OpponentSelector> = match options.seed {
        Some(seed) => Arc::new(RandomSelector::seeded(seed)),
        None => Arc::new(RandomSelector::new()),
    };
    let controller =
        GameController::new(config, selector).with_reveal_delay(options.reveal_delay);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let res = run_game(&mut terminal, &controller, options.next_round_delay).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "Game loop error");
    }
    res
}

/// The event loop. Generic over the backend so it can be driven headless.
#[instrument(skip_all, fields(next_round_delay = ?next_round_delay))]
async fn run_game<B: Backend>(
    terminal: &mut Terminal<B>,
    controller: &GameController,
    next_round_delay: Duration,
) -> Result<()>
where
    <B as Backend>::Error: Send + Sync + 'static,
{
    let (state_tx, mut state_rx) = mpsc::unbounded_channel::<Arc<GameState>>();
    let subscription = controller.store().subscribe(move |state| {
        // The receiver only goes away when the loop exits
        let _ = state_tx.send(Arc::clone(state));
    });

    let mut app = App::new(controller.initialize());
    let human = app
        .state()
        .human()
        .map(|player| player.id.clone())
        .unwrap_or_else(|| PlayerId::seat(0));
    let mut advance_at: Option<Instant> = None;

    let result = loop {
        while let Ok(snapshot) = state_rx.try_recv() {
            match app.apply_snapshot(snapshot) {
                Transition::RoundRevealed => advance_at = Some(Instant::now() + next_round_delay),
                Transition::Dealt => advance_at = None,
                Transition::None => {}
            }
        }

        if let Some(deadline) = advance_at
            && Instant::now() >= deadline
        {
            advance_at = None;
            match controller.finish_round() {
                Ok(flow) => app.apply_flow(flow),
                Err(err) => {
                    warn!(error = %err, "Could not finish round");
                    app.report_error(&err);
                }
            }
            continue;
        }

        if let Err(err) = terminal.draw(|frame| ui::draw(frame, &app)) {
            break Err(err.into());
        }

        match poll_key() {
            Ok(Some(command)) => handle_command(command, &mut app, controller, &human),
            Ok(None) => {}
            Err(err) => break Err(err),
        }
        if app.should_quit() {
            break Ok(());
        }

        sleep(Duration::from_millis(10)).await;
    };

    subscription.unsubscribe();
    result
}

fn poll_key() -> Result<Option<KeyCommand>> {
    if event::poll(Duration::from_millis(100))?
        && let Event::Key(key) = event::read()?
        && key.kind != KeyEventKind::Release
    {
        return Ok(parse_key(key.code));
    }
    Ok(None)
}

#[instrument(skip(app, controller))]
fn handle_command(command: KeyCommand, app: &mut App, controller: &GameController, human: &PlayerId) {
    debug!("Handling key command");
    match command {
        KeyCommand::Quit => {
            info!("User quit");
            app.quit();
        }
        KeyCommand::Reset => {
            controller.reset();
        }
        KeyCommand::Select(index) => {
            let Some(card) = app.card_at(index).cloned() else {
                debug!(index, "No card at position");
                return;
            };
            if let Err(err) = controller.select_card(human, &card) {
                app.report_error(&err);
            }
        }
    }
}
