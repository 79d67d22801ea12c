mod durations;
mod engine;
mod session_tracker;
mod ticker;

pub use durations::{
    format_minutes, is_valid_phase_secs, Durations, DurationsUpdate, Phase, DEFAULT_FOCUS_SECS,
    DEFAULT_LONG_BREAK_SECS, DEFAULT_SHORT_BREAK_SECS, MAX_PHASE_SECS,
};
pub use engine::{TickReport, TimerEngine, DEFAULT_MAX_CATCH_UP};
pub use session_tracker::{create_session_id, SessionTracker};
pub use ticker::{TickOutcome, Ticker};
