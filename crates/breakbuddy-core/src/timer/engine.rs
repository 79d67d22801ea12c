//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads - the owner is responsible for calling `tick()`
//! periodically while `is_running` is set (see [`super::Ticker`]).
//!
//! ## State Transitions
//!
//! ```text
//! focus --(complete, streak < 4)--> short-break --(complete)--> focus
//! focus --(complete, streak == 4)--> long-break + gate (ticking stops)
//! gate --(accept)--> long-break running    gate --(skip)--> focus running
//! long-break --(complete)--> focus
//! ```
//!
//! A tick that finds the target time already passed walks through every
//! phase boundary crossed since the last tick (catch-up), bounded by
//! `max_catch_up` completions.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(state, clock);
//! engine.start();
//! // In a loop:
//! let report = engine.tick();
//! ```

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::durations::{DurationsUpdate, Phase};
use super::session_tracker::SessionTracker;
use crate::clock::Clock;
use crate::error::GenerationError;
use crate::events::Event;
use crate::state::{EngineState, SPRINTS_PER_CYCLE};
use crate::stats::{day_key, push_entry, round_minutes, upsert_day, Mood, SessionHistoryEntry};
use crate::suggestion::{ManualTicket, PrefetchTicket, SuggestionController};

/// Default bound on phase completions per tick.
pub const DEFAULT_MAX_CATCH_UP: u32 = 24;

/// What a tick did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub events: Vec<Event>,
    /// False once the engine no longer needs ticking (paused, gated, reset).
    pub keep_ticking: bool,
}

impl TickReport {
    fn running(events: Vec<Event>) -> Self {
        Self {
            events,
            keep_ticking: true,
        }
    }

    fn stopped(events: Vec<Event>) -> Self {
        Self {
            events,
            keep_ticking: false,
        }
    }
}

/// Whole seconds left, rounded up.
fn ceil_secs(remaining_ms: i64) -> u64 {
    if remaining_ms <= 0 {
        0
    } else {
        (remaining_ms.saturating_add(999) / 1000) as u64
    }
}

fn secs_to_ms(secs: u64) -> i64 {
    i64::try_from(secs).unwrap_or(i64::MAX).saturating_mul(1000)
}

/// Core cycle engine.
///
/// Owns the whole observable state plus the session tracker and the
/// suggestion controller, so every mutation is a single `&mut self` call.
pub struct TimerEngine {
    state: EngineState,
    tracker: SessionTracker,
    suggestions: SuggestionController,
    clock: Arc<dyn Clock>,
    max_catch_up: u32,
}

impl TimerEngine {
    pub fn new(state: EngineState, clock: Arc<dyn Clock>) -> Self {
        Self {
            state,
            tracker: SessionTracker::default(),
            suggestions: SuggestionController::default(),
            clock,
            max_catch_up: DEFAULT_MAX_CATCH_UP,
        }
    }

    /// Override the per-tick catch-up bound (at least 1).
    pub fn with_max_catch_up(mut self, max: u32) -> Self {
        self.max_catch_up = max.max(1);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn tracker(&self) -> &SessionTracker {
        &self.tracker
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn is_running(&self) -> bool {
        self.state.timer.is_running
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.state.timer.is_running || self.state.show_break_gate {
            debug!("start ignored: running or gated");
            return None;
        }
        let now = self.clock.now_ms();
        if self.state.timer.seconds_remaining == 0 {
            self.state.timer.phase = Phase::Focus;
            self.state.timer.seconds_remaining = self.state.durations.focus;
            self.state.completed_focus_sessions = 0;
            self.state.pending_break_suggestions = 0;
        }
        if self.state.timer.phase == Phase::Focus {
            self.tracker.ensure_fresh(now);
        }
        self.suggestions.abort_auto(&mut self.state);

        let secs = self.state.timer.seconds_remaining;
        self.state.timer.is_running = true;
        self.state.timer.target_timestamp = Some(now.saturating_add(secs_to_ms(secs)));
        Some(Event::TimerStarted {
            phase: self.state.timer.phase,
            seconds_remaining: secs,
            at: self.clock.now_utc(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.state.timer.is_running || self.state.show_break_gate {
            return None;
        }
        let now = self.clock.now_ms();
        if let Some(target) = self.state.timer.target_timestamp {
            self.state.timer.seconds_remaining = ceil_secs(target.saturating_sub(now));
        }
        self.state.timer.is_running = false;
        self.state.timer.target_timestamp = None;
        Some(Event::TimerPaused {
            seconds_remaining: self.state.timer.seconds_remaining,
            at: self.clock.now_utc(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.state.timer.is_running || self.state.show_break_gate {
            return None;
        }
        if self.state.timer.seconds_remaining == 0 {
            self.state.timer.phase = Phase::Focus;
            self.state.timer.seconds_remaining = self.state.durations.focus;
        }
        let secs = self.state.timer.seconds_remaining;
        self.state.timer.is_running = true;
        let now = self.clock.now_ms();
        self.state.timer.target_timestamp = Some(now.saturating_add(secs_to_ms(secs)));
        Some(Event::TimerResumed {
            seconds_remaining: secs,
            at: self.clock.now_utc(),
        })
    }

    /// Back to an idle focus interval. Durations, weekly stats, history and
    /// the cumulative counters survive.
    pub fn reset(&mut self) -> Option<Event> {
        self.suggestions.invalidate();
        self.tracker.clear();

        let fresh = EngineState::initial(self.state.durations, self.clock.today());
        let previous = std::mem::replace(&mut self.state, fresh);
        let state = &mut self.state;
        state.weekly_stats = previous.weekly_stats;
        state.session_history = previous.session_history;
        state.completed_focus_sessions = previous.completed_focus_sessions;
        state.total_focus_seconds = previous.total_focus_seconds;
        state.total_break_seconds = previous.total_break_seconds;
        state.cycle_streak = previous.cycle_streak;
        state.suggestion.auto_brew_enabled = previous.suggestion.auto_brew_enabled;
        Some(Event::TimerReset {
            at: self.clock.now_utc(),
        })
    }

    /// Merge duration edits. While idle, editing the active phase's length
    /// also updates the countdown.
    pub fn set_durations(&mut self, update: DurationsUpdate) {
        self.state.durations = self.state.durations.merged(&update);
        if !self.state.timer.is_running {
            if let Some(secs) = update.for_phase(self.state.timer.phase) {
                self.state.timer.seconds_remaining = secs;
            }
        }
    }

    pub fn set_mood(&mut self, mood: Mood) {
        self.state.latest_mood = Some(mood);
    }

    pub fn clear_mood(&mut self) {
        self.state.latest_mood = None;
    }

    /// Advance the state machine to the current wall-clock time.
    pub fn tick(&mut self) -> TickReport {
        if !self.state.timer.is_running {
            return TickReport::stopped(Vec::new());
        }
        if self.state.show_break_gate {
            self.state.timer.is_running = false;
            self.state.timer.target_timestamp = None;
            return TickReport::stopped(Vec::new());
        }

        let now = self.clock.now_ms();
        let target = self
            .state
            .timer
            .target_timestamp
            .unwrap_or_else(|| now.saturating_add(secs_to_ms(self.state.timer.seconds_remaining)));
        let remaining_ms = target.saturating_sub(now);
        self.state.timer.target_timestamp = Some(target);

        if remaining_ms > 0 {
            self.state.timer.seconds_remaining = ceil_secs(remaining_ms);
            return TickReport::running(Vec::new());
        }

        let today = day_key(self.clock.today());
        let mut leftover_ms = remaining_ms.saturating_neg();
        let mut events = Vec::new();
        let mut completions = 0;

        loop {
            if completions >= self.max_catch_up {
                let phase = self.state.timer.phase;
                warn!(
                    completions,
                    ?phase,
                    "catch-up bound reached; restarting the current phase"
                );
                let full = self.state.durations.for_phase(phase);
                self.state.timer.seconds_remaining = full;
                self.state.timer.target_timestamp = Some(now.saturating_add(secs_to_ms(full)));
                break;
            }
            completions += 1;

            let next = match self.state.timer.phase {
                Phase::Focus => {
                    if self.complete_focus(&today, &mut events) {
                        self.raise_gate(&mut events);
                        return TickReport::stopped(events);
                    }
                    Phase::ShortBreak
                }
                phase => {
                    self.complete_break(phase, &today, &mut events);
                    Phase::Focus
                }
            };

            let next_ms = self.state.durations.phase_ms(next);
            self.state.timer.phase = next;
            events.push(Event::PhaseStarted {
                phase: next,
                duration_secs: self.state.durations.for_phase(next),
                at: self.clock.now_utc(),
            });

            if leftover_ms < next_ms {
                let remaining_in_phase = next_ms - leftover_ms;
                self.state.timer.seconds_remaining = ceil_secs(remaining_in_phase);
                self.state.timer.target_timestamp = Some(now.saturating_add(remaining_in_phase));
                break;
            }
            leftover_ms -= next_ms;
            self.state.timer.seconds_remaining = 0;
        }

        TickReport::running(events)
    }

    /// Returns true when this completion fills the cycle.
    fn complete_focus(&mut self, today: &str, events: &mut Vec<Event>) -> bool {
        let now = self.clock.now_ms();
        let id = self.tracker.active_or_begin(now);
        let focus = self.state.durations.focus;

        if self.tracker.is_logged(&id) {
            debug!(session_id = %id, "focus interval already credited");
        } else {
            let state = &mut self.state;
            state.weekly_stats = upsert_day(&state.weekly_stats, today, |d| d.with_focus(focus));
            state.total_focus_seconds = state.total_focus_seconds.saturating_add(focus);
            state.cycle_streak += 1;
            let entry = SessionHistoryEntry {
                id: id.clone(),
                completed_at: self.clock.now_utc(),
                focus_minutes: round_minutes(focus as f64 / 60.0),
                mood: state.latest_mood,
                suggestion: None,
                cycle: state.cycle_streak,
            };
            state.session_history = push_entry(&state.session_history, entry);
        }
        self.tracker.mark_logged(id.clone());

        let state = &mut self.state;
        state.completed_focus_sessions += 1;
        state.pending_break_suggestions = state.pending_break_suggestions.saturating_add(1);
        state.last_focus_seconds = Some(focus);
        self.suggestions.clear_auto(&mut state.suggestion);
        state.suggestion.focus_session_complete = true;
        state.suggestion.awaiting_break = true;

        info!(session_id = %id, streak = state.cycle_streak, "focus sprint completed");
        events.push(Event::PhaseCompleted {
            phase: Phase::Focus,
            session_id: Some(id),
            at: self.clock.now_utc(),
        });
        state.cycle_streak >= SPRINTS_PER_CYCLE
    }

    fn complete_break(&mut self, phase: Phase, today: &str, events: &mut Vec<Event>) {
        let secs = self.state.durations.for_phase(phase);
        let state = &mut self.state;
        state.total_break_seconds = state.total_break_seconds.saturating_add(secs);
        state.weekly_stats = upsert_day(&state.weekly_stats, today, |d| d.with_break(secs));
        self.suggestions.clear_auto(&mut state.suggestion);
        state.suggestion.focus_session_complete = false;
        state.suggestion.awaiting_break = false;
        self.tracker.begin(self.clock.now_ms());

        info!(?phase, "break completed");
        events.push(Event::PhaseCompleted {
            phase,
            session_id: None,
            at: self.clock.now_utc(),
        });
    }

    fn raise_gate(&mut self, events: &mut Vec<Event>) {
        let state = &mut self.state;
        state.show_break_gate = true;
        state.cycle_streak = 0;
        state.timer.phase = Phase::LongBreak;
        state.timer.seconds_remaining = state.durations.long_break;
        state.timer.is_running = false;
        state.timer.target_timestamp = None;
        state.suggestion.focus_session_complete = false;
        state.suggestion.awaiting_break = false;
        state.suggestion.auto_prompt_visible = false;

        info!("cycle complete; long break gate raised");
        events.push(Event::BreakGateRaised {
            at: self.clock.now_utc(),
        });
    }

    // ── Break gate ───────────────────────────────────────────────────

    /// Take the long break now.
    pub fn accept_break_gate(&mut self) -> Option<Event> {
        if !self.state.show_break_gate {
            return None;
        }
        self.tracker.set_active(None);
        self.open_gate(Phase::LongBreak);
        info!("long break accepted");
        Some(Event::BreakGateAccepted {
            at: self.clock.now_utc(),
        })
    }

    /// Skip the long break and start the next sprint.
    pub fn skip_break_gate(&mut self) -> Option<Event> {
        if !self.state.show_break_gate {
            return None;
        }
        self.tracker.begin(self.clock.now_ms());
        self.open_gate(Phase::Focus);
        info!("long break skipped");
        Some(Event::BreakGateSkipped {
            at: self.clock.now_utc(),
        })
    }

    fn open_gate(&mut self, phase: Phase) {
        let secs = self.state.durations.for_phase(phase);
        let now = self.clock.now_ms();
        let state = &mut self.state;
        state.show_break_gate = false;
        state.cycle_streak = 0;
        state.timer.phase = phase;
        state.timer.seconds_remaining = secs;
        state.timer.is_running = true;
        state.timer.target_timestamp = Some(now.saturating_add(secs_to_ms(secs)));
        state.suggestion.focus_session_complete = false;
        state.suggestion.auto_prompt_visible = false;
    }

    // ── Suggestions ──────────────────────────────────────────────────

    pub fn begin_manual_suggestion(&mut self) -> Option<ManualTicket> {
        self.suggestions
            .begin_manual(&mut self.state, self.tracker.last_logged())
    }

    pub fn finish_manual_suggestion(
        &mut self,
        ticket: ManualTicket,
        outcome: Result<String, GenerationError>,
    ) -> bool {
        self.suggestions.finish_manual(&mut self.state, ticket, outcome)
    }

    pub fn begin_prefetch(&mut self) -> Option<PrefetchTicket> {
        let now = self.clock.now_ms();
        self.suggestions.begin_prefetch(&mut self.state, now)
    }

    pub fn finish_prefetch(
        &mut self,
        ticket: PrefetchTicket,
        outcome: Result<String, GenerationError>,
    ) -> bool {
        self.suggestions.finish_prefetch(&mut self.state, ticket, outcome)
    }

    pub fn clear_break_suggestion(&mut self) {
        SuggestionController::clear_break_suggestion(&mut self.state);
    }

    pub fn trigger_auto_prompt(&mut self) -> bool {
        self.suggestions.trigger_auto_prompt(&mut self.state)
    }

    pub fn apply_queued_suggestion(&mut self) -> bool {
        self.suggestions
            .apply_queued(&mut self.state, self.tracker.last_logged())
    }

    pub fn abort_auto_suggestion(&mut self) {
        self.suggestions.abort_auto(&mut self.state);
    }

    pub fn snooze_auto_suggestion(&mut self, minutes: u32) {
        let now = self.clock.now_ms();
        self.suggestions.snooze(&mut self.state, minutes, now);
    }

    pub fn resume_awaiting_break(&mut self) -> bool {
        let now = self.clock.now_ms();
        self.suggestions.resume_awaiting_break(&mut self.state, now)
    }

    pub fn set_auto_brew_enabled(&mut self, enabled: bool) {
        self.suggestions.set_auto_brew(&mut self.state, enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::timer::Durations;

    fn engine() -> (TimerEngine, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let state = EngineState::initial(Durations::default(), clock.today());
        (TimerEngine::new(state, clock.clone()), clock)
    }

    #[test]
    fn start_pause_resume() {
        let (mut engine, clock) = engine();
        assert!(engine.start().is_some());
        assert!(engine.start().is_none());
        assert!(engine.is_running());

        clock.advance_ms(10_500);
        assert!(engine.pause().is_some());
        assert_eq!(engine.state().timer.seconds_remaining, 1490);
        assert!(engine.state().timer.target_timestamp.is_none());
        assert!(engine.pause().is_none());

        clock.advance_secs(600);
        assert!(engine.resume().is_some());
        let target = engine.state().timer.target_timestamp.unwrap();
        assert_eq!(target, clock.now_ms() + 1_490_000);
    }

    #[test]
    fn tick_refreshes_countdown_without_transition() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance_ms(1_200);
        let report = engine.tick();
        assert!(report.keep_ticking);
        assert!(report.events.is_empty());
        assert_eq!(engine.state().timer.seconds_remaining, 1499);
        assert_eq!(engine.state().timer.phase, Phase::Focus);
    }

    #[test]
    fn focus_completion_moves_to_short_break() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance_secs(1500);
        let report = engine.tick();

        let s = engine.state();
        assert_eq!(s.timer.phase, Phase::ShortBreak);
        assert_eq!(s.timer.seconds_remaining, 300);
        assert_eq!(s.total_focus_seconds, 1500);
        assert_eq!(s.session_history.len(), 1);
        assert_eq!(s.session_history[0].cycle, 1);
        assert_eq!(s.cycle_streak, 1);
        assert!(s.suggestion.focus_session_complete);
        assert!(s.suggestion.awaiting_break);
        assert_eq!(s.pending_break_suggestions, 1);
        assert!(matches!(
            report.events[0],
            Event::PhaseCompleted { phase: Phase::Focus, .. }
        ));
    }

    #[test]
    fn completion_is_credited_once_across_ticks() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance_secs(1500);
        engine.tick();
        engine.tick();
        clock.advance_ms(100);
        engine.tick();
        assert_eq!(engine.state().session_history.len(), 1);
        assert_eq!(engine.state().total_focus_seconds, 1500);
    }

    #[test]
    fn catch_up_spans_several_phases() {
        let (mut engine, clock) = engine();
        engine.start();
        // focus + short + focus, then 100s into the second short break
        clock.advance_secs(1500 + 300 + 1500 + 100);
        engine.tick();
        let s = engine.state();
        assert_eq!(s.timer.phase, Phase::ShortBreak);
        assert_eq!(s.timer.seconds_remaining, 200);
        assert_eq!(s.cycle_streak, 2);
        assert_eq!(s.session_history.len(), 2);
        assert_eq!(s.total_break_seconds, 300);
        assert_ne!(s.session_history[0].id, s.session_history[1].id);
        assert_eq!(s.session_history[0].cycle, 2);
    }

    #[test]
    fn fourth_sprint_raises_gate_and_stops() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance_secs(3 * (1500 + 300) + 1500 + 10_000);
        let report = engine.tick();
        assert!(!report.keep_ticking);
        assert!(report.events.iter().any(Event::is_gate_raised));

        let s = engine.state();
        assert!(s.show_break_gate);
        assert_eq!(s.timer.phase, Phase::LongBreak);
        assert_eq!(s.timer.seconds_remaining, 900);
        assert!(!s.timer.is_running);
        assert_eq!(s.cycle_streak, 0);
        assert_eq!(s.session_history.len(), 4);

        // gated: timer commands are ignored
        assert!(engine.start().is_none());
        assert!(engine.pause().is_none());
        assert!(engine.resume().is_none());
    }

    #[test]
    fn accept_gate_runs_long_break() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance_secs(3 * (1500 + 300) + 1500);
        engine.tick();
        assert!(engine.accept_break_gate().is_some());
        assert!(engine.accept_break_gate().is_none());

        let s = engine.state();
        assert!(s.timer.is_running);
        assert!(!s.show_break_gate);
        assert_eq!(s.timer.phase, Phase::LongBreak);
        assert_eq!(s.cycle_streak, 0);

        clock.advance_secs(900);
        engine.tick();
        assert_eq!(engine.state().timer.phase, Phase::Focus);
        assert_eq!(engine.state().total_break_seconds, 3 * 300 + 900);
    }

    #[test]
    fn skip_gate_starts_focus_with_new_session() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance_secs(3 * (1500 + 300) + 1500);
        engine.tick();
        let logged = engine.tracker().last_logged().unwrap().to_owned();

        assert!(engine.skip_break_gate().is_some());
        let s = engine.state();
        assert_eq!(s.timer.phase, Phase::Focus);
        assert_eq!(s.timer.seconds_remaining, 1500);
        assert!(s.timer.is_running);
        assert_ne!(engine.tracker().active(), Some(logged.as_str()));
    }

    #[test]
    fn reset_preserves_history_and_totals() {
        let (mut engine, clock) = engine();
        engine.set_mood(Mood::Focused);
        engine.start();
        clock.advance_secs(1600);
        engine.tick();
        engine.reset();

        let s = engine.state();
        assert_eq!(s.timer.phase, Phase::Focus);
        assert_eq!(s.timer.seconds_remaining, 1500);
        assert!(!s.timer.is_running);
        assert_eq!(s.session_history.len(), 1);
        assert_eq!(s.session_history[0].mood, Some(Mood::Focused));
        assert_eq!(s.total_focus_seconds, 1500);
        assert!(s.latest_mood.is_none());
        assert!(engine.tracker().active().is_none());
        assert!(engine.tracker().last_logged().is_none());
        assert!(!engine.tick().keep_ticking);
    }

    #[test]
    fn set_durations_updates_idle_countdown_only() {
        let (mut engine, _clock) = engine();
        engine.set_durations(DurationsUpdate {
            focus: Some(600),
            ..Default::default()
        });
        assert_eq!(engine.state().timer.seconds_remaining, 600);

        engine.set_durations(DurationsUpdate {
            short_break: Some(60),
            ..Default::default()
        });
        assert_eq!(engine.state().timer.seconds_remaining, 600);

        engine.start();
        engine.set_durations(DurationsUpdate {
            focus: Some(900),
            ..Default::default()
        });
        assert_eq!(engine.state().durations.focus, 900);
        assert_eq!(engine.state().timer.seconds_remaining, 600);
    }

    #[test]
    fn start_after_zero_reinitialises_focus() {
        let (mut engine, _clock) = engine();
        engine.set_durations(DurationsUpdate::default());
        engine.state.timer.seconds_remaining = 0;
        engine.state.timer.phase = Phase::ShortBreak;
        engine.state.completed_focus_sessions = 3;
        engine.start();
        assert_eq!(engine.state().timer.phase, Phase::Focus);
        assert_eq!(engine.state().timer.seconds_remaining, 1500);
        assert_eq!(engine.state().completed_focus_sessions, 0);
    }

    #[test]
    fn catch_up_bound_is_respected() {
        let clock = Arc::new(ManualClock::starting_now());
        let durations = Durations {
            focus: 10,
            short_break: 10,
            long_break: 10,
        };
        let state = EngineState::initial(durations, clock.today());
        let mut engine = TimerEngine::new(state, clock.clone()).with_max_catch_up(2);
        engine.start();
        clock.advance_secs(35);
        let report = engine.tick();
        assert!(report.keep_ticking);
        // focus and short break completed, the next focus restarts in full
        let s = engine.state();
        assert_eq!(s.timer.phase, Phase::Focus);
        assert_eq!(s.timer.seconds_remaining, 10);
        assert_eq!(s.cycle_streak, 1);
    }

    #[test]
    fn pending_auto_state_cleared_on_start() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance_secs(1500);
        engine.tick();
        engine.pause();
        assert!(engine.state().suggestion.focus_session_complete);
        engine.start();
        assert!(!engine.state().suggestion.focus_session_complete);
        assert!(!engine.state().suggestion.awaiting_break);
    }

    #[test]
    fn huge_remaining_time_saturates() {
        let (mut engine, clock) = engine();
        engine.state.timer.seconds_remaining = u64::MAX;
        engine.resume();
        assert_eq!(engine.state().timer.target_timestamp, Some(i64::MAX));
        clock.advance_secs(1);
        let report = engine.tick();
        assert!(report.keep_ticking);
        assert!(engine.state().timer.seconds_remaining > 0);
        engine.pause();
        assert_eq!(engine.state().timer.phase, Phase::Focus);
        assert_eq!(ceil_secs(i64::MAX), (i64::MAX / 1000) as u64);
    }

    #[test]
    fn stale_target_far_in_the_past_does_not_overflow() {
        let (mut engine, _clock) = engine();
        engine.start();
        engine.state.timer.target_timestamp = Some(i64::MIN);
        let report = engine.tick();
        assert!(!report.events.is_empty());
        assert!(engine.state().timer.target_timestamp.is_some() || engine.state().show_break_gate);
    }
}
