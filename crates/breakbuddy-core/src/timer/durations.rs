use serde::{Deserialize, Serialize};

/// The three phases of the focus cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn is_break(self) -> bool {
        !matches!(self, Phase::Focus)
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Focus => "Focus",
            Phase::ShortBreak => "Short Break",
            Phase::LongBreak => "Long Break",
        }
    }
}

/// Phase lengths in seconds. Every field is positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Durations {
    pub focus: u64,
    pub short_break: u64,
    pub long_break: u64,
}

pub const DEFAULT_FOCUS_SECS: u64 = 25 * 60;
pub const DEFAULT_SHORT_BREAK_SECS: u64 = 5 * 60;
pub const DEFAULT_LONG_BREAK_SECS: u64 = 15 * 60;
/// Longest accepted phase. Anything above it is treated as invalid.
pub const MAX_PHASE_SECS: u64 = 24 * 60 * 60;

/// Whether `secs` is a usable phase length.
pub fn is_valid_phase_secs(secs: u64) -> bool {
    secs > 0 && secs <= MAX_PHASE_SECS
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            focus: DEFAULT_FOCUS_SECS,
            short_break: DEFAULT_SHORT_BREAK_SECS,
            long_break: DEFAULT_LONG_BREAK_SECS,
        }
    }
}

impl Durations {
    /// Length of `phase` in seconds.
    pub fn for_phase(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Focus => self.focus,
            Phase::ShortBreak => self.short_break,
            Phase::LongBreak => self.long_break,
        }
    }

    /// Length of `phase` in milliseconds.
    ///
    /// Uses saturating arithmetic to prevent overflow with large values.
    pub fn phase_ms(&self, phase: Phase) -> i64 {
        i64::try_from(self.for_phase(phase))
            .unwrap_or(i64::MAX)
            .saturating_mul(1000)
    }

    /// Merge a partial update. Zero and out-of-range values are ignored.
    pub fn merged(&self, update: &DurationsUpdate) -> Self {
        let pick = |new: Option<u64>, old: u64| {
            new.filter(|v| is_valid_phase_secs(*v)).unwrap_or(old)
        };
        Self {
            focus: pick(update.focus, self.focus),
            short_break: pick(update.short_break, self.short_break),
            long_break: pick(update.long_break, self.long_break),
        }
    }
}

/// Partial duration edit, as issued by a settings screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationsUpdate {
    #[serde(default)]
    pub focus: Option<u64>,
    #[serde(default)]
    pub short_break: Option<u64>,
    #[serde(default)]
    pub long_break: Option<u64>,
}

impl DurationsUpdate {
    /// The edited value for `phase`, if this update touches it with a usable value.
    pub fn for_phase(&self, phase: Phase) -> Option<u64> {
        match phase {
            Phase::Focus => self.focus,
            Phase::ShortBreak => self.short_break,
            Phase::LongBreak => self.long_break,
        }
        .filter(|v| is_valid_phase_secs(*v))
    }
}

/// Render seconds as minutes with at most one decimal ("25", "7.5").
pub fn format_minutes(seconds: u64) -> String {
    let formatted = format!("{:.1}", seconds as f64 / 60.0);
    formatted
        .strip_suffix(".0")
        .map(str::to_owned)
        .unwrap_or(formatted)
}
