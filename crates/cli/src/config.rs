//! CLI configuration loaded from the environment.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::dirs;

/// Settings shared by every command; flags override them.
#[derive(Clone, Debug)]
pub struct CliConfig {
    pub data_dir: PathBuf,
    pub session_id: Option<String>,
    pub persist_snapshots: bool,
    pub ability_error_threshold: Option<u32>,
    pub hook_time_budget: Option<Duration>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir(),
            session_id: None,
            persist_snapshots: true,
            ability_error_threshold: None,
            hook_time_budget: None,
        }
    }
}

impl CliConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `ARENA_DATA_DIR` - Directory for the file data store (default: platform-specific)
    /// - `ARENA_SESSION_ID` - Session identifier (default: scenario's, else timestamp-based)
    /// - `ARENA_PERSIST_SNAPSHOTS` - Write every snapshot to the data store (default: true)
    /// - `ARENA_ABILITY_ERROR_THRESHOLD` - Faults tolerated before an ability is disabled (default: 3)
    /// - `ARENA_HOOK_BUDGET_MS` - Time budget for one ability hook (default: unbounded)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("ARENA_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        config.session_id = env::var("ARENA_SESSION_ID").ok();
        if let Some(persist) = read_env::<bool>("ARENA_PERSIST_SNAPSHOTS") {
            config.persist_snapshots = persist;
        }
        config.ability_error_threshold = read_env::<u32>("ARENA_ABILITY_ERROR_THRESHOLD");
        config.hook_time_budget = read_env::<u64>("ARENA_HOOK_BUDGET_MS").map(Duration::from_millis);

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
