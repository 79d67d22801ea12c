//! Rolling seven-day focus/break totals.
//!
//! Days are keyed `YYYY-MM-DD`, so lexicographic order of keys is
//! chronological order and a `BTreeMap` keeps them sorted for free.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of trailing calendar days kept.
pub const WEEK_LEN: usize = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStats {
    pub focus_seconds: u64,
    pub break_seconds: u64,
    pub focus_count: u64,
    pub break_count: u64,
}

impl DayStats {
    pub fn with_focus(self, seconds: u64) -> Self {
        Self {
            focus_seconds: self.focus_seconds.saturating_add(seconds),
            focus_count: self.focus_count.saturating_add(1),
            ..self
        }
    }

    pub fn with_break(self, seconds: u64) -> Self {
        Self {
            break_seconds: self.break_seconds.saturating_add(seconds),
            break_count: self.break_count.saturating_add(1),
            ..self
        }
    }
}

pub type WeeklyStats = BTreeMap<String, DayStats>;

pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// The seven keys ending at `today`, oldest first.
fn trailing_keys(today: NaiveDate) -> impl Iterator<Item = String> {
    (0..WEEK_LEN as u64)
        .rev()
        .filter_map(move |back| today.checked_sub_days(Days::new(back)))
        .map(day_key)
}

/// A zeroed week ending at `today`.
pub fn initial_week(today: NaiveDate) -> WeeklyStats {
    trailing_keys(today).map(|k| (k, DayStats::default())).collect()
}

/// Replace `day`'s entry with `updater(existing or zero)` and keep only the
/// seven most recent keys.
pub fn upsert_day<F>(stats: &WeeklyStats, day: &str, updater: F) -> WeeklyStats
where
    F: FnOnce(DayStats) -> DayStats,
{
    let mut next = stats.clone();
    let existing = next.get(day).copied().unwrap_or_default();
    next.insert(day.to_owned(), updater(existing));

    while next.len() > WEEK_LEN {
        next.pop_first();
    }
    next
}

/// Rebuild exactly the trailing seven days relative to `today`.
///
/// Missing days default to zero; days outside the window are dropped. This
/// also reconciles a snapshot saved during an earlier week.
pub fn normalize_week(raw: &WeeklyStats, today: NaiveDate) -> WeeklyStats {
    trailing_keys(today)
        .map(|k| {
            let day = raw.get(&k).copied().unwrap_or_default();
            (k, day)
        })
        .collect()
}

/// Sum of the whole window.
pub fn week_totals(stats: &WeeklyStats) -> DayStats {
    stats.values().fold(DayStats::default(), |acc, d| DayStats {
        focus_seconds: acc.focus_seconds + d.focus_seconds,
        break_seconds: acc.break_seconds + d.break_seconds,
        focus_count: acc.focus_count + d.focus_count,
        break_count: acc.break_count + d.break_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn initial_week_has_seven_zero_days() {
        let week = initial_week(date("2024-03-03"));
        assert_eq!(week.len(), 7);
        assert_eq!(week.keys().next().unwrap(), "2024-02-26");
        assert_eq!(week.keys().last().unwrap(), "2024-03-03");
        assert!(week.values().all(|d| *d == DayStats::default()));
    }

    #[test]
    fn upsert_trims_oldest() {
        let week = initial_week(date("2024-03-03"));
        let next = upsert_day(&week, "2024-03-04", |d| d.with_focus(1500));
        assert_eq!(next.len(), 7);
        assert!(!next.contains_key("2024-02-26"));
        assert_eq!(next["2024-03-04"].focus_count, 1);
        assert_eq!(next["2024-03-04"].focus_seconds, 1500);
    }

    #[test]
    fn upsert_accumulates_existing_day() {
        let week = initial_week(date("2024-03-03"));
        let week = upsert_day(&week, "2024-03-03", |d| d.with_break(300));
        let week = upsert_day(&week, "2024-03-03", |d| d.with_break(900));
        assert_eq!(week["2024-03-03"].break_seconds, 1200);
        assert_eq!(week["2024-03-03"].break_count, 2);
    }

    #[test]
    fn normalize_keeps_window_and_drops_stale_days() {
        let mut raw = WeeklyStats::new();
        raw.insert("2024-01-01".into(), DayStats::default().with_focus(60));
        raw.insert("2024-03-01".into(), DayStats::default().with_focus(120));

        let week = normalize_week(&raw, date("2024-03-03"));
        assert_eq!(week.len(), 7);
        assert!(!week.contains_key("2024-01-01"));
        assert_eq!(week["2024-03-01"].focus_seconds, 120);
        assert_eq!(week["2024-03-03"], DayStats::default());
    }

    #[test]
    fn normalize_empty_input() {
        let week = normalize_week(&WeeklyStats::new(), date("2024-01-03"));
        let keys: Vec<_> = week.keys().cloned().collect();
        assert_eq!(keys.first().unwrap(), "2023-12-28");
        assert_eq!(keys.last().unwrap(), "2024-01-03");
    }

    #[test]
    fn totals_sum_all_days() {
        let week = initial_week(date("2024-03-03"));
        let week = upsert_day(&week, "2024-03-02", |d| d.with_focus(100));
        let week = upsert_day(&week, "2024-03-03", |d| d.with_break(50));
        let total = week_totals(&week);
        assert_eq!(total.focus_seconds, 100);
        assert_eq!(total.break_count, 1);
    }
}
