//! Command-line interface for janken.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Janken - rock-paper-scissors card game against the computer
#[derive(Parser, Debug)]
#[command(name = "janken")]
#[command(about = "Rock-paper-scissors card game in the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a game in the terminal
    Play {
        /// Path to a TOML game config (defaults apply for missing fields)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Delay before a judged round is revealed, in milliseconds
        #[arg(long, default_value = "1500")]
        reveal_delay_ms: u64,

        /// Pause after a revealed round, in milliseconds
        #[arg(long, default_value = "3000")]
        next_round_delay_ms: u64,

        /// Seed for the computer opponent
        #[arg(long)]
        seed: Option<u64>,

        /// Log file written while the game is running
        #[arg(long, default_value = "janken.log")]
        log_file: PathBuf,
    },

    /// Validate a config file and print the effective configuration
    Config {
        /// Path to a TOML game config
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Toml)]
        format: OutputFormat,
    },
}

/// Output format for printed configuration.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// TOML, loadable with `--config`
    Toml,
    /// Pretty-printed JSON
    Json,
}
