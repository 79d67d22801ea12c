//! Break-suggestion lifecycle.
//!
//! Every fetch is split into a synchronous `begin_*` that validates
//! preconditions and marks the fetch in flight, and a `finish_*` that is
//! handed the result later. The ticket returned by `begin_*` carries the
//! context the fetch was issued under; `finish_*` drops results whose
//! context has moved on (a reset, a new focus completion, an abort).

use tracing::debug;

use super::generator::SuggestionRequest;
use crate::error::GenerationError;
use crate::state::{EngineState, SuggestionState};
use crate::stats::attach_suggestion;

const SNOOZE_MINUTE_MS: i64 = 60_000;

/// Issued for a manual brew.
#[derive(Debug, Clone)]
pub struct ManualTicket {
    pub request: SuggestionRequest,
    seq: u64,
    target_session: Option<String>,
}

/// Issued for an automatic prefetch.
#[derive(Debug, Clone)]
pub struct PrefetchTicket {
    pub request: SuggestionRequest,
    epoch: u64,
}

#[derive(Debug, Default)]
pub struct SuggestionController {
    /// Bumped on every manual brew and on reset.
    manual_seq: u64,
    /// Bumped whenever auto-suggestion state is cleared.
    auto_epoch: u64,
}

impl SuggestionController {
    fn build_request(state: &EngineState) -> SuggestionRequest {
        let focus_seconds = state.last_focus_seconds.unwrap_or(state.durations.focus);
        SuggestionRequest {
            previous_suggestion: state.suggestion.break_suggestion.clone(),
            session_count: Some(state.suggestion.session_count.saturating_add(1)),
            ..SuggestionRequest::from_focus_seconds(focus_seconds, state.latest_mood)
        }
    }

    /// Invalidate every outstanding ticket.
    pub fn invalidate(&mut self) {
        self.manual_seq += 1;
        self.auto_epoch += 1;
    }

    /// Drop queued/prefetching/snooze/prompt state and orphan any prefetch.
    pub fn clear_auto(&mut self, s: &mut SuggestionState) {
        self.auto_epoch += 1;
        s.queued_suggestion = None;
        s.is_prefetching = false;
        s.auto_suggestion_error = None;
        s.snooze_until = None;
        s.auto_prompt_visible = false;
    }

    pub fn begin_manual(
        &mut self,
        state: &mut EngineState,
        last_logged: Option<&str>,
    ) -> Option<ManualTicket> {
        if state.suggestion.is_generating {
            debug!("manual brew already in flight");
            return None;
        }
        let request = Self::build_request(state);
        self.manual_seq += 1;
        state.suggestion.is_generating = true;
        state.suggestion.suggestion_error = None;
        Some(ManualTicket {
            request,
            seq: self.manual_seq,
            target_session: last_logged.map(str::to_owned),
        })
    }

    /// Apply a manual brew result. Returns false if the result was stale.
    pub fn finish_manual(
        &mut self,
        state: &mut EngineState,
        ticket: ManualTicket,
        outcome: Result<String, GenerationError>,
    ) -> bool {
        if ticket.seq != self.manual_seq || !state.suggestion.is_generating {
            debug!("discarding stale manual suggestion");
            return false;
        }
        state.suggestion.is_generating = false;
        match outcome {
            Ok(text) => {
                if let Some(id) = ticket.target_session.as_deref() {
                    attach_suggestion(&mut state.session_history, id, &text);
                }
                state.suggestion.break_suggestion = Some(text);
                state.suggestion.suggestion_error = None;
                state.pending_break_suggestions = state.pending_break_suggestions.saturating_sub(1);
                state.suggestion.session_count = state.suggestion.session_count.saturating_add(1);
            }
            Err(err) => {
                state.suggestion.suggestion_error = Some(err.to_string());
            }
        }
        true
    }

    pub fn begin_prefetch(&mut self, state: &mut EngineState, now_ms: i64) -> Option<PrefetchTicket> {
        let s = &state.suggestion;
        if !s.auto_brew_enabled
            || !s.focus_session_complete
            || s.is_prefetching
            || s.queued_suggestion.is_some()
            || s.is_snoozed(now_ms)
        {
            return None;
        }
        let request = Self::build_request(state);
        state.suggestion.is_prefetching = true;
        state.suggestion.auto_suggestion_error = None;
        Some(PrefetchTicket {
            request,
            epoch: self.auto_epoch,
        })
    }

    /// Apply a prefetch result. Returns false if the result was stale.
    pub fn finish_prefetch(
        &mut self,
        state: &mut EngineState,
        ticket: PrefetchTicket,
        outcome: Result<String, GenerationError>,
    ) -> bool {
        let s = &mut state.suggestion;
        if ticket.epoch != self.auto_epoch || !s.is_prefetching || !s.focus_session_complete {
            debug!("discarding stale prefetched suggestion");
            return false;
        }
        s.is_prefetching = false;
        match outcome {
            Ok(text) => {
                s.queued_suggestion = Some(text);
                s.auto_suggestion_error = None;
            }
            Err(err) => {
                s.auto_suggestion_error = Some(err.to_string());
            }
        }
        true
    }

    /// Surface the pending break as a visible prompt.
    pub fn trigger_auto_prompt(&self, state: &mut EngineState) -> bool {
        let s = &mut state.suggestion;
        if !s.focus_session_complete {
            return false;
        }
        s.auto_prompt_visible = true;
        s.awaiting_break = false;
        true
    }

    /// Promote the queued suggestion to the shown one.
    pub fn apply_queued(&mut self, state: &mut EngineState, last_logged: Option<&str>) -> bool {
        let Some(text) = state.suggestion.queued_suggestion.take() else {
            return false;
        };
        if let Some(id) = last_logged {
            attach_suggestion(&mut state.session_history, id, &text);
        }
        self.clear_auto(&mut state.suggestion);
        let s = &mut state.suggestion;
        s.break_suggestion = Some(text);
        s.focus_session_complete = false;
        s.awaiting_break = false;
        s.session_count = s.session_count.saturating_add(1);
        state.pending_break_suggestions = state.pending_break_suggestions.saturating_sub(1);
        true
    }

    /// Cancel the pending auto prompt/prefetch. A manually brewed
    /// suggestion is left alone.
    pub fn abort_auto(&mut self, state: &mut EngineState) {
        self.clear_auto(&mut state.suggestion);
        state.suggestion.focus_session_complete = false;
        state.suggestion.awaiting_break = false;
    }

    pub fn snooze(&mut self, state: &mut EngineState, minutes: u32, now_ms: i64) {
        let minutes = i64::from(minutes.max(1));
        let s = &mut state.suggestion;
        s.snooze_until = Some(now_ms.saturating_add(minutes * SNOOZE_MINUTE_MS));
        s.auto_prompt_visible = false;
        s.awaiting_break = false;
    }

    /// Re-arm the idle path once a snooze has run out.
    ///
    /// Safe to call late or repeatedly: it does nothing while the snooze is
    /// still running or once the completed sprint has been dealt with.
    pub fn resume_awaiting_break(&self, state: &mut EngineState, now_ms: i64) -> bool {
        let s = &mut state.suggestion;
        if !s.focus_session_complete || s.is_snoozed(now_ms) {
            return false;
        }
        s.snooze_until = None;
        s.awaiting_break = true;
        s.auto_prompt_visible = false;
        true
    }

    pub fn set_auto_brew(&mut self, state: &mut EngineState, enabled: bool) {
        if !enabled {
            self.clear_auto(&mut state.suggestion);
        }
        state.suggestion.auto_brew_enabled = enabled;
    }

    pub fn clear_break_suggestion(state: &mut EngineState) {
        state.suggestion.break_suggestion = None;
        state.suggestion.suggestion_error = None;
    }
}
