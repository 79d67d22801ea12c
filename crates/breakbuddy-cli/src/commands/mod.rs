pub mod config;
pub mod history;
pub mod run;
pub mod stats;
pub mod suggest;

use breakbuddy_core::storage::{LoadedSnapshot, SnapshotStore, SqliteSnapshotStore};
use breakbuddy_core::{Clock, SystemClock};

/// Read the stored snapshot without starting an engine.
pub fn load_snapshot() -> Result<LoadedSnapshot, Box<dyn std::error::Error>> {
    let store = SqliteSnapshotStore::open()?;
    Ok(store.load(SystemClock.today()))
}
