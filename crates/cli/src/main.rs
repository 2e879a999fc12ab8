//! Arena command-line driver.
//!
//! Plays scripted scenarios through the turn engine and inspects persisted
//! snapshots. Run with `arena <command>`.

mod commands;
mod config;
mod dirs;
mod logging;
mod scenario;

use anyhow::Result;
use clap::Parser;
use commands::{Abilities, Inspect, Run};

/// Deterministic turn-based arena resolver
#[derive(Parser)]
#[command(name = "arena")]
#[command(about = "Play and inspect arena combat scenarios", long_about = None)]
#[command(version)]
struct Cli {
    /// Log engine diagnostics to stderr (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Play a scenario file turn by turn
    Run(Run),

    /// Show a persisted snapshot
    Inspect(Inspect),

    /// List the built-in abilities
    Abilities(Abilities),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (for ARENA_DATA_DIR and friends)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logging::setup_logging(cli.verbose)?;

    match cli.command {
        Command::Run(cmd) => cmd.execute().await,
        Command::Inspect(cmd) => cmd.execute().await,
        Command::Abilities(cmd) => cmd.execute(),
    }
}
