//! # BreakBuddy Core Library
//!
//! This library provides the focus/break cycle engine behind BreakBuddy, a
//! Pomodoro-style timer that offers short, witty break suggestions. All
//! operations are available through the standalone `breakbuddy` CLI; any
//! other front end is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine with catch-up
//!   ticking; the caller (or the built-in ticker) invokes `tick()`
//! - **Stats**: Rolling seven-day totals and a capped session history
//! - **Suggestions**: Manual and automatic break-suggestion lifecycle over a
//!   pluggable generator (Gemini over HTTP by default)
//! - **Storage**: SQLite key-value snapshot and TOML configuration
//!
//! ## Key Components
//!
//! - [`FocusTimer`]: The public facade, observable through a `watch` channel
//! - [`TimerEngine`]: Core timer state machine
//! - [`SnapshotStore`]: Durable snapshot persistence
//! - [`Config`]: Application configuration management
//! - [`SuggestionGenerator`]: Trait for suggestion text sources

pub mod clock;
pub mod error;
pub mod events;
pub mod focus_timer;
pub mod notify;
pub mod state;
pub mod stats;
pub mod storage;
pub mod suggestion;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, GenerationError};
pub use events::Event;
pub use focus_timer::{FocusTimer, FocusTimerBuilder};
pub use notify::{LogNotifier, NoopNotifier, Notifier, SoundCue};
pub use state::{EngineState, SuggestionState, TimerSnapshot, SPRINTS_PER_CYCLE};
pub use stats::{DayStats, Mood, SessionHistoryEntry, WeeklyStats};
pub use storage::{Config, Database, SnapshotStore, SqliteSnapshotStore};
pub use suggestion::{
    AutoBrewDriver, AutoBrewHandle, GeminiClient, StaticGenerator, SuggestionGenerator,
    SuggestionRequest,
};
pub use timer::{format_minutes, Durations, DurationsUpdate, Phase, TimerEngine};
