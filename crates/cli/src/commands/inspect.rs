//! Read and inspect persisted snapshots.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use arena_runtime::FileDataStore;
use arena_runtime::history::{load_snapshot, snapshot_key};
use clap::Parser;
use console::style;

use super::run::describe;
use crate::config::CliConfig;

/// Show a persisted snapshot
#[derive(Parser)]
pub struct Inspect {
    /// Session to read from
    #[arg(value_name = "SESSION")]
    session: String,

    /// Turn number of the snapshot (0 is the state before the first turn)
    #[arg(value_name = "TURN")]
    turn: u32,

    /// Custom data directory (defaults to ARENA_DATA_DIR or a platform-specific location)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Roster, abilities and event kinds
    Summary,
    /// Full JSON envelope
    Json,
}

impl Inspect {
    pub async fn execute(self) -> Result<()> {
        let data_dir = self
            .data_dir
            .unwrap_or_else(|| CliConfig::from_env().data_dir);
        let store = FileDataStore::open(&data_dir)
            .await
            .with_context(|| format!("Failed to open data store: {}", data_dir.display()))?;

        let Some(persisted) = load_snapshot(&store, &self.session, self.turn).await? else {
            bail!(
                "Snapshot not found: {}\n\nHint: snapshots are stored under {}",
                snapshot_key(&self.session, self.turn),
                data_dir.display()
            );
        };

        if let OutputFormat::Json = self.format {
            println!("{}", serde_json::to_string_pretty(&persisted)?);
            return Ok(());
        }

        let snapshot = &persisted.snapshot;
        println!("{} {}", style("Session:").bold().cyan(), persisted.session_id);
        println!("{} {}", style("Turn:").bold().cyan(), snapshot.turn);
        println!("{} {}", style("Captured:").bold().cyan(), persisted.captured_at);
        println!("{} {}", style("Digest:").bold().cyan(), persisted.digest);
        println!();

        println!("{}", style("Players:").bold().yellow());
        for player in snapshot.roster.iter() {
            println!("  {}", describe(player));
        }
        println!();

        println!("{}", style("Abilities:").bold().yellow());
        if snapshot.abilities.is_empty() {
            println!("  (none bound)");
        }
        for instance in &snapshot.abilities {
            let uses = instance
                .remaining_uses
                .map_or_else(|| "unlimited".to_string(), |uses| uses.to_string());
            println!(
                "  {} {} cooldown {} uses {} errors {}{}",
                style(&instance.ability_id).bold(),
                snapshot.roster.name_of(instance.owner),
                instance.cooldown,
                uses,
                instance.error_count,
                if instance.is_active { "" } else { " (disabled)" }
            );
        }
        println!();

        println!(
            "{} {}",
            style("Events:").bold().yellow(),
            snapshot.events.len()
        );
        for event in &snapshot.events {
            let cancelled = if event.is_cancelled() { " (cancelled)" } else { "" };
            println!("  {:>4} {}{cancelled}", event.timestamp(), event.kind());
        }
        Ok(())
    }
}
