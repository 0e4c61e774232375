//! Janken - terminal rock-paper-scissors card game

#![warn(missing_docs)]

mod cli;
mod tui;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command, OutputFormat};
use janken::GameConfig;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;
use tui::TuiOptions;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            config,
            reveal_delay_ms,
            next_round_delay_ms,
            seed,
            log_file,
        } => {
            let config = load_config(config.as_deref())?;
            let options = TuiOptions {
                reveal_delay: Duration::from_millis(reveal_delay_ms),
                next_round_delay: Duration::from_millis(next_round_delay_ms),
                seed,
                log_file,
            };
            tui::run_tui(config, options).await
        }
        Command::Config { config, format } => print_config(config.as_deref(), format),
    }
}

/// Loads the game config from `path`, or the defaults.
#[instrument]
fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    match path {
        Some(path) => Ok(GameConfig::from_file(path)?),
        None => Ok(GameConfig::default()),
    }
}

/// Validates and prints the effective configuration.
fn print_config(path: Option<&Path>, format: OutputFormat) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(path)?;
    info!(?config, "Config validated");
    match format {
        OutputFormat::Toml => print!("{}", config.to_toml()?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
    }
    Ok(())
}
