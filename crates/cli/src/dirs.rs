//! Platform-specific directory utilities.

use std::path::PathBuf;

/// Platform data directory for arena save data.
///
/// - macOS: `~/Library/Application Support/arena`
/// - Linux: `~/.local/share/arena` (or `$XDG_DATA_HOME/arena`)
/// - Windows: `%APPDATA%\arena`
/// - Fallback: `./arena_data`
pub fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "arena")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./arena_data"))
}
