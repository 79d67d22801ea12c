//! Durable engine snapshot: the codec and the stores it is written to.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::database::Database;
use super::sanitize;
use crate::error::{CoreError, DatabaseError};
use crate::stats::{SessionHistoryEntry, WeeklyStats};
use crate::timer::Durations;

/// Key of the snapshot document in the kv table.
pub const SNAPSHOT_KEY: &str = "focus_timer:v1";

/// What gets written on every meaningful change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    pub durations: Durations,
    pub weekly_stats: WeeklyStats,
    pub session_history: Vec<SessionHistoryEntry>,
    pub completed_focus_sessions: u64,
    pub total_focus_seconds: u64,
    pub total_break_seconds: u64,
    pub cycle_streak: u32,
    pub auto_brew_enabled: bool,
}

/// A decoded snapshot. Absent or invalid fields are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSnapshot {
    pub durations: Option<Durations>,
    pub weekly_stats: Option<WeeklyStats>,
    pub session_history: Option<Vec<SessionHistoryEntry>>,
    pub completed_focus_sessions: Option<u64>,
    pub total_focus_seconds: Option<u64>,
    pub total_break_seconds: Option<u64>,
    pub cycle_streak: Option<u32>,
    pub auto_brew_enabled: bool,
}

impl Default for LoadedSnapshot {
    fn default() -> Self {
        Self {
            durations: None,
            weekly_stats: None,
            session_history: None,
            completed_focus_sessions: None,
            total_focus_seconds: None,
            total_break_seconds: None,
            cycle_streak: None,
            auto_brew_enabled: true,
        }
    }
}

pub fn encode(snapshot: &PersistedSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(snapshot)
}

/// Decode a stored document. Never fails: unparseable input yields an
/// empty snapshot and each field is validated on its own.
pub fn decode(raw: &str, today: NaiveDate) -> LoadedSnapshot {
    let parsed: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "stored snapshot is not valid JSON; using defaults");
            return LoadedSnapshot::default();
        }
    };
    let Some(doc) = parsed.as_object() else {
        warn!("stored snapshot is not an object; using defaults");
        return LoadedSnapshot::default();
    };

    let field = |key: &str| doc.get(key).unwrap_or(&Value::Null);
    LoadedSnapshot {
        durations: sanitize::durations(field("durations")),
        weekly_stats: sanitize::weekly_stats(field("weeklyStats"), today),
        session_history: sanitize::session_history(field("sessionHistory")),
        completed_focus_sessions: sanitize::count(field("completedFocusSessions")),
        total_focus_seconds: sanitize::count(field("totalFocusSeconds")),
        total_break_seconds: sanitize::count(field("totalBreakSeconds")),
        cycle_streak: sanitize::count(field("cycleStreak"))
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX)),
        auto_brew_enabled: sanitize::boolean(field("autoBrewEnabled"), true),
    }
}

/// Where the snapshot document lives.
pub trait SnapshotStore: Send + Sync {
    fn load_raw(&self) -> Result<Option<String>, CoreError>;
    fn save_raw(&self, raw: &str) -> Result<(), CoreError>;

    /// Load and decode; read failures are logged and give an empty snapshot.
    fn load(&self, today: NaiveDate) -> LoadedSnapshot {
        match self.load_raw() {
            Ok(Some(raw)) => decode(&raw, today),
            Ok(None) => LoadedSnapshot::default(),
            Err(e) => {
                warn!(error = %e, "failed to read snapshot; using defaults");
                LoadedSnapshot::default()
            }
        }
    }

    fn save(&self, snapshot: &PersistedSnapshot) -> Result<(), CoreError> {
        self.save_raw(&encode(snapshot)?)
    }
}

/// Snapshot stored in the SQLite kv table.
pub struct SqliteSnapshotStore {
    db: Mutex<Database>,
}

impl SqliteSnapshotStore {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    /// Open the default database in the data directory.
    pub fn open() -> Result<Self, CoreError> {
        Ok(Self::new(Database::open()?))
    }

    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self::new(Database::open_at(path)?))
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn load_raw(&self) -> Result<Option<String>, CoreError> {
        let db = self.db.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(db.kv_get(SNAPSHOT_KEY)?)
    }

    fn save_raw(&self, raw: &str) -> Result<(), CoreError> {
        let db = self.db.lock().unwrap_or_else(PoisonError::into_inner);
        db.kv_set(SNAPSHOT_KEY, raw)?;
        Ok(())
    }
}

/// Snapshot kept in memory, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    raw: Mutex<Option<String>>,
    writes: AtomicUsize,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
            writes: AtomicUsize::new(0),
        }
    }

    /// The last document written (or seeded).
    pub fn raw(&self) -> Option<String> {
        self.raw.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of `save_raw` calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load_raw(&self) -> Result<Option<String>, CoreError> {
        Ok(self.raw())
    }

    fn save_raw(&self, raw: &str) -> Result<(), CoreError> {
        *self.raw.lock().unwrap_or_else(PoisonError::into_inner) = Some(raw.to_owned());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
