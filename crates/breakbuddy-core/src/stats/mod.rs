//! Usage statistics: the rolling weekly window and the session history.

pub mod history;
pub mod weekly;

pub use history::{attach_suggestion, push_entry, round_minutes, Mood, SessionHistoryEntry, HISTORY_LIMIT};
pub use weekly::{day_key, initial_week, normalize_week, upsert_day, week_totals, DayStats, WeeklyStats, WEEK_LEN};
