//! Play a scenario file through a game session.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use arena_core::{Player, Roster};
use arena_runtime::{FileDataStore, GameSession, SessionConfig, TurnResult};
use clap::Parser;
use console::style;
use tracing::info;

use crate::config::CliConfig;
use crate::scenario::Scenario;

/// Play a scenario file turn by turn
#[derive(Parser)]
pub struct Run {
    /// Scenario file (RON)
    #[arg(value_name = "SCENARIO")]
    scenario: PathBuf,

    /// Override the scenario's seed
    #[arg(long)]
    seed: Option<u64>,

    /// Session identifier used for stored snapshots
    #[arg(short, long, value_name = "SESSION")]
    session: Option<String>,

    /// Custom data directory (defaults to ARENA_DATA_DIR or a platform-specific location)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Keep playing passes after the scripted turns until the game ends
    #[arg(long)]
    to_the_end: bool,

    /// Hard cap on resolved turns
    #[arg(long, default_value_t = 200)]
    max_turns: u32,
}

impl Run {
    pub async fn execute(self) -> Result<()> {
        let env = CliConfig::from_env();
        let scenario = Scenario::load_from_file(&self.scenario)?;

        let seed = self
            .seed
            .or(scenario.seed)
            .unwrap_or_else(rand::random::<u64>);
        let session_id = self
            .session
            .or_else(|| env.session_id.clone())
            .or_else(|| scenario.session_id.clone())
            .unwrap_or_else(default_session_id);
        let data_dir = self.data_dir.unwrap_or(env.data_dir.clone());

        let game = scenario.game_config();
        let roster = scenario.roster(&game)?;
        let mut config = SessionConfig {
            game,
            seed,
            session_id: session_id.clone(),
            hook_time_budget: env.hook_time_budget,
            persist_snapshots: env.persist_snapshots,
            ..SessionConfig::default()
        };
        if let Some(threshold) = env.ability_error_threshold {
            config.ability_error_threshold = threshold;
        }

        let store = FileDataStore::open(&data_dir)
            .await
            .with_context(|| format!("Failed to open data store: {}", data_dir.display()))?;
        let mut builder = GameSession::builder(roster)
            .config(config)
            .store(Arc::new(store));
        for (owner, ability) in scenario.bindings() {
            builder = builder.bind(owner, ability);
        }
        let mut session = builder.build()?;

        info!(session = %session_id, seed, data_dir = %data_dir.display(), "running scenario");
        println!(
            "{} {} {}",
            style("Session:").bold().cyan(),
            session_id,
            style(format!("(seed {seed})")).dim()
        );

        for line in session.start().await? {
            println!("  {line}");
        }

        let mut index = 0usize;
        while !session.engine().is_game_over() && (index as u32) < self.max_turns {
            if index >= scenario.turns.len() && !self.to_the_end {
                break;
            }
            let actions = scenario.actions_for(index, session.engine().roster())?;
            let result = session.play_turn(&actions).await?;
            print_turn(&result);
            index += 1;
        }

        let summary = session.finish().await?;
        println!();
        match &summary.winner_name {
            Some(name) => println!(
                "{} {} after {} turn(s)",
                style("Winner:").bold().green(),
                name,
                summary.turns
            ),
            None if session.engine().roster().alive_count() == 0 => {
                println!("{} nobody survived", style("Result:").bold().yellow())
            }
            None => println!(
                "{} undecided after {} turn(s)",
                style("Result:").bold().yellow(),
                summary.turns
            ),
        }
        for line in &summary.logs {
            println!("  {line}");
        }
        print_roster(session.engine().roster());
        Ok(())
    }
}

fn default_session_id() -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    format!("session_{timestamp}")
}

fn print_turn(result: &TurnResult) {
    let mut header = format!("Turn {}", result.turn_number);
    if result.is_death_zone {
        header.push_str(" [death zone]");
    }
    println!();
    println!("{}", style(header).bold().yellow());
    for line in &result.logs {
        println!("  {line}");
    }
}

fn print_roster(roster: &Roster) {
    println!();
    println!("{}", style("Players:").bold().cyan());
    for player in roster.iter() {
        println!("  {}", describe(player));
    }
}

pub(crate) fn describe(player: &Player) -> String {
    let state = if player.is_alive() {
        style(format!("{:?}", player.status)).green()
    } else {
        style(format!("{:?}", player.status)).red()
    };
    let mut line = format!(
        "{:<10} hp {}/{}  gauge {}/{}  evade {}  {}",
        player.name,
        player.hp,
        player.max_hp,
        player.defense_gauge,
        player.max_defense_gauge,
        player.evade_count,
        state
    );
    if let Some(ability) = &player.ability_id {
        line.push_str(&format!("  ability {ability}"));
    }
    let effects: Vec<String> = player
        .status_effects
        .iter()
        .map(|effect| format!("{}x{}", effect.id, effect.stacks))
        .collect();
    if !effects.is_empty() {
        line.push_str(&format!("  effects [{}]", effects.join(", ")));
    }
    line
}
