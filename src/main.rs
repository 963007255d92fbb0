//! Binary entry point that wires environment bootstrap, logging and the
//! command line, then runs the poodle on the terminal.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use poodle::runtime::{self, RunOptions};

/// Poodle - a toy poodle that obeys spoken and pressed commands.
///
/// Each line on standard input is treated as recognised speech. Lines
/// starting with ':' are instructions: :mic, :press <control>, :drop,
/// :help and :quit.
#[derive(Parser, Debug)]
#[command(name = "poodle", version, about)]
struct Cli {
    /// Path to the runtime configuration file.
    #[arg(long, default_value = "config.json", env = "POODLE_CONFIG")]
    config: PathBuf,

    /// Path to the command vocabulary file.
    #[arg(long, default_value = "commands.json", env = "POODLE_COMMANDS")]
    commands: PathBuf,

    /// Start with the microphone on.
    #[arg(long, env = "POODLE_LISTEN")]
    listen: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    runtime::run_poodle(RunOptions {
        config_path: cli.config,
        commands_path: cli.commands,
        listen: cli.listen,
    })
    .await
}
