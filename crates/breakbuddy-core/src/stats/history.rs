use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of retained history entries.
pub const HISTORY_LIMIT: usize = 50;

/// Self-reported mood, one of five symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    #[serde(rename = "😎")]
    Confident,
    #[serde(rename = "😴")]
    Sleepy,
    #[serde(rename = "😠")]
    Spicy,
    #[serde(rename = "🧠")]
    Focused,
    #[serde(rename = "❤️")]
    Warm,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Mood::Confident,
        Mood::Sleepy,
        Mood::Spicy,
        Mood::Focused,
        Mood::Warm,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Mood::Confident => "😎",
            Mood::Sleepy => "😴",
            Mood::Spicy => "😠",
            Mood::Focused => "🧠",
            Mood::Warm => "❤️",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mood::Confident => "Confident Roast",
            Mood::Sleepy => "Sleepy Debugger",
            Mood::Spicy => "Spicy Sprint",
            Mood::Focused => "Laser Focus",
            Mood::Warm => "Warm Fuzzies",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.symbol() == symbol)
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Mood {
    type Err = String;

    /// Accepts the symbol, the variant name or the first word of the label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(mood) = Self::from_symbol(s) {
            return Ok(mood);
        }
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| {
                let name = format!("{m:?}").to_ascii_lowercase();
                let label = m.label().to_ascii_lowercase();
                name == lower || label == lower || label.split(' ').next() == Some(lower.as_str())
            })
            .ok_or_else(|| format!("unknown mood: {s}"))
    }
}

/// One credited focus interval.
///
/// Immutable once created except for a single later attachment of the
/// suggestion text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHistoryEntry {
    pub id: String,
    pub completed_at: DateTime<Utc>,
    pub focus_minutes: f64,
    pub mood: Option<Mood>,
    pub suggestion: Option<String>,
    /// 1-based position in the four-sprint cycle.
    pub cycle: u32,
}

/// Minutes rounded to one decimal place.
pub fn round_minutes(minutes: f64) -> f64 {
    (minutes * 10.0).round() / 10.0
}

/// Prepend `entry`, replacing any entry with the same id, and cap the list.
pub fn push_entry(history: &[SessionHistoryEntry], entry: SessionHistoryEntry) -> Vec<SessionHistoryEntry> {
    let mut next = Vec::with_capacity(HISTORY_LIMIT);
    let id = entry.id.clone();
    next.push(entry);
    next.extend(history.iter().filter(|e| e.id != id).cloned());
    next.truncate(HISTORY_LIMIT);
    next
}

/// Attach `suggestion` to the entry with `id`. Returns false when no entry
/// matches or the entry already carries a suggestion.
pub fn attach_suggestion(history: &mut [SessionHistoryEntry], id: &str, suggestion: &str) -> bool {
    match history.iter_mut().find(|e| e.id == id) {
        Some(entry) if entry.suggestion.is_none() => {
            entry.suggestion = Some(suggestion.to_owned());
            true
        }
        _ => false,
    }
}
