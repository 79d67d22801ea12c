//! Field-by-field validation of a stored snapshot.
//!
//! Every function here is total: a bad value yields `None` (or a fallback)
//! for that field alone, never an error.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::stats::{
    normalize_week, round_minutes, DayStats, Mood, SessionHistoryEntry, WeeklyStats,
    HISTORY_LIMIT,
};
use crate::timer::{is_valid_phase_secs, Durations, MAX_PHASE_SECS};

/// A finite number, or a non-blank string that parses as one.
pub(crate) fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

/// A non-negative number rounded to the nearest integer.
pub(crate) fn count(value: &Value) -> Option<u64> {
    number(value)
        .filter(|n| *n >= 0.0)
        .map(|n| n.round().min(u64::MAX as f64) as u64)
}

pub(crate) fn boolean(value: &Value, fallback: bool) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => true,
            "false" => false,
            _ => fallback,
        },
        _ => fallback,
    }
}

/// Durations with at least one valid field; invalid fields take defaults.
pub(crate) fn durations(value: &Value) -> Option<Durations> {
    let source = value.as_object()?;
    let positive = |key: &str| {
        source
            .get(key)
            .and_then(number)
            .filter(|n| *n > 0.0 && *n <= MAX_PHASE_SECS as f64)
            .map(|n| n.floor() as u64)
            .filter(|n| is_valid_phase_secs(*n))
    };

    let mut out = Durations::default();
    let mut has_value = false;
    if let Some(v) = positive("focus") {
        out.focus = v;
        has_value = true;
    }
    if let Some(v) = positive("shortBreak") {
        out.short_break = v;
        has_value = true;
    }
    if let Some(v) = positive("longBreak") {
        out.long_break = v;
        has_value = true;
    }
    has_value.then_some(out)
}

fn day_stats(value: &Value) -> Option<DayStats> {
    let record = value.as_object()?;
    let field = |key: &str| record.get(key).and_then(count).unwrap_or(0);
    Some(DayStats {
        focus_seconds: field("focusSeconds"),
        break_seconds: field("breakSeconds"),
        focus_count: field("focusCount"),
        break_count: field("breakCount"),
    })
}

/// Per-day sanitised stats, normalised to the week ending `today`.
pub(crate) fn weekly_stats(value: &Value, today: NaiveDate) -> Option<WeeklyStats> {
    let raw = value.as_object()?;
    let days: WeeklyStats = raw
        .iter()
        .filter_map(|(key, stats)| Some((key.clone(), day_stats(stats)?)))
        .collect();
    Some(normalize_week(&days, today))
}

fn history_entry(value: &Value) -> Option<SessionHistoryEntry> {
    let entry = value.as_object()?;

    let id = entry.get("id")?.as_str()?;
    if id.trim().is_empty() {
        return None;
    }
    let completed_at = DateTime::parse_from_rfc3339(entry.get("completedAt")?.as_str()?)
        .ok()?
        .with_timezone(&Utc);
    let focus_minutes = entry.get("focusMinutes").and_then(number).filter(|n| *n >= 0.0)?;
    let cycle = entry.get("cycle").and_then(number).filter(|n| *n >= 0.0)?;
    let mood = entry
        .get("mood")
        .and_then(Value::as_str)
        .and_then(Mood::from_symbol);
    let suggestion = entry
        .get("suggestion")
        .and_then(Value::as_str)
        .map(str::to_owned);

    Some(SessionHistoryEntry {
        id: id.to_owned(),
        completed_at,
        focus_minutes: round_minutes(focus_minutes),
        mood,
        suggestion,
        cycle: cycle.round().min(u32::MAX as f64) as u32,
    })
}

/// Valid entries only, newest first, capped.
pub(crate) fn session_history(value: &Value) -> Option<Vec<SessionHistoryEntry>> {
    let items = value.as_array()?;
    let mut entries: Vec<SessionHistoryEntry> = items.iter().filter_map(history_entry).collect();
    entries.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    entries.truncate(HISTORY_LIMIT);
    Some(entries)
}
