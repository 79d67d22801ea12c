mod config;
pub mod database;
mod sanitize;
pub mod snapshot;

pub use config::{
    Config, DurationsConfig, EngineConfig, NotificationsConfig, SuggestionsConfig,
};
pub use database::Database;
pub use snapshot::{
    LoadedSnapshot, MemorySnapshotStore, PersistedSnapshot, SnapshotStore,
    SqliteSnapshotStore, SNAPSHOT_KEY,
};

use std::path::PathBuf;

use crate::error::CoreError;

/// Returns the data directory, creating it if needed.
///
/// `BREAKBUDDY_DATA_DIR` wins when set. Otherwise `~/.config/breakbuddy/`,
/// or `~/.config/breakbuddy-dev/` when `BREAKBUDDY_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let dir = match std::env::var_os("BREAKBUDDY_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("BREAKBUDDY_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("breakbuddy-dev")
            } else {
                base_dir.join("breakbuddy")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
