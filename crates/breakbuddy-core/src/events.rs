use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// Timer state changes, returned by the engine's commands and ticks.
/// Presentation code uses them for one-shot effects (flashes, sounds);
/// the state snapshot remains the source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    /// A phase ran to completion. `session_id` is set for focus phases.
    PhaseCompleted {
        phase: Phase,
        session_id: Option<String>,
        at: DateTime<Utc>,
    },
    PhaseStarted {
        phase: Phase,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// The fourth sprint finished; ticking stopped until accept or skip.
    BreakGateRaised {
        at: DateTime<Utc>,
    },
    BreakGateAccepted {
        at: DateTime<Utc>,
    },
    BreakGateSkipped {
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn is_gate_raised(&self) -> bool {
        matches!(self, Event::BreakGateRaised { .. })
    }
}
