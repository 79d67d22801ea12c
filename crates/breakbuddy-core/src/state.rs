//! The observable engine state.
//!
//! `EngineState` is what subscribers receive. It is plain data: every
//! mutation goes through `TimerEngine`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::stats::{initial_week, Mood, SessionHistoryEntry, WeeklyStats};
use crate::storage::snapshot::{LoadedSnapshot, PersistedSnapshot};
use crate::timer::{Durations, Phase};

/// Number of completed focus sprints that forces a long break.
pub const SPRINTS_PER_CYCLE: u32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub seconds_remaining: u64,
    pub is_running: bool,
    /// Absolute end of the live phase in epoch millis; `None` while stopped.
    pub target_timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionState {
    pub break_suggestion: Option<String>,
    pub queued_suggestion: Option<String>,
    pub is_generating: bool,
    pub is_prefetching: bool,
    pub suggestion_error: Option<String>,
    pub auto_suggestion_error: Option<String>,
    pub snooze_until: Option<i64>,
    pub auto_brew_enabled: bool,
    pub focus_session_complete: bool,
    pub awaiting_break: bool,
    pub auto_prompt_visible: bool,
    /// Suggestions applied so far in this run.
    pub session_count: u32,
}

impl Default for SuggestionState {
    fn default() -> Self {
        Self {
            break_suggestion: None,
            queued_suggestion: None,
            is_generating: false,
            is_prefetching: false,
            suggestion_error: None,
            auto_suggestion_error: None,
            snooze_until: None,
            auto_brew_enabled: true,
            focus_session_complete: false,
            awaiting_break: false,
            auto_prompt_visible: false,
            session_count: 0,
        }
    }
}

impl SuggestionState {
    pub fn is_snoozed(&self, now_ms: i64) -> bool {
        self.snooze_until.is_some_and(|until| until > now_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    pub timer: TimerSnapshot,
    pub durations: Durations,
    pub cycle_streak: u32,
    pub show_break_gate: bool,
    pub completed_focus_sessions: u64,
    pub total_focus_seconds: u64,
    pub total_break_seconds: u64,
    pub pending_break_suggestions: u32,
    pub last_focus_seconds: Option<u64>,
    pub latest_mood: Option<Mood>,
    pub suggestion: SuggestionState,
    pub weekly_stats: WeeklyStats,
    pub session_history: Vec<SessionHistoryEntry>,
}

impl EngineState {
    /// Idle state at the start of a focus interval.
    pub fn initial(durations: Durations, today: NaiveDate) -> Self {
        Self {
            timer: TimerSnapshot {
                phase: Phase::Focus,
                seconds_remaining: durations.focus,
                is_running: false,
                target_timestamp: None,
            },
            durations,
            cycle_streak: 0,
            show_break_gate: false,
            completed_focus_sessions: 0,
            total_focus_seconds: 0,
            total_break_seconds: 0,
            pending_break_suggestions: 0,
            last_focus_seconds: None,
            latest_mood: None,
            suggestion: SuggestionState::default(),
            weekly_stats: initial_week(today),
            session_history: Vec::new(),
        }
    }

    /// Seed from a decoded snapshot; absent fields keep their defaults.
    pub fn from_loaded(defaults: Durations, loaded: LoadedSnapshot, today: NaiveDate) -> Self {
        let durations = loaded.durations.unwrap_or(defaults);
        let mut state = Self::initial(durations, today);
        if let Some(week) = loaded.weekly_stats {
            state.weekly_stats = week;
        }
        if let Some(history) = loaded.session_history {
            state.session_history = history;
        }
        state.completed_focus_sessions = loaded.completed_focus_sessions.unwrap_or(0);
        state.total_focus_seconds = loaded.total_focus_seconds.unwrap_or(0);
        state.total_break_seconds = loaded.total_break_seconds.unwrap_or(0);
        state.cycle_streak = loaded
            .cycle_streak
            .map(|s| s % SPRINTS_PER_CYCLE)
            .unwrap_or(0);
        state.suggestion.auto_brew_enabled = loaded.auto_brew_enabled;
        state
    }

    /// The durable subset.
    pub fn persisted(&self) -> PersistedSnapshot {
        PersistedSnapshot {
            durations: self.durations,
            weekly_stats: self.weekly_stats.clone(),
            session_history: self.session_history.clone(),
            completed_focus_sessions: self.completed_focus_sessions,
            total_focus_seconds: self.total_focus_seconds,
            total_break_seconds: self.total_break_seconds,
            cycle_streak: self.cycle_streak,
            auto_brew_enabled: self.suggestion.auto_brew_enabled,
        }
    }

    /// 1-based sprint position shown to the user.
    pub fn cycle_index(&self) -> u32 {
        if self.show_break_gate {
            return SPRINTS_PER_CYCLE;
        }
        match self.timer.phase {
            Phase::Focus => self.cycle_streak % SPRINTS_PER_CYCLE + 1,
            _ if self.cycle_streak == 0 => 1,
            _ => self.cycle_streak,
        }
    }

    /// Nothing has happened yet in this run.
    pub fn is_pristine(&self) -> bool {
        !self.timer.is_running
            && self.timer.phase == Phase::Focus
            && self.timer.seconds_remaining == self.durations.focus
            && self.completed_focus_sessions == 0
    }
}
