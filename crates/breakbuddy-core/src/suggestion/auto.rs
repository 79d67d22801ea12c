//! Drives the automatic suggestion path from outside the engine.
//!
//! After a focus sprint the driver prefetches a suggestion, waits for the
//! user to go idle, raises the prompt, treats user activity as an abort and
//! re-arms the idle wait once a snooze runs out.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::debug;

use crate::focus_timer::FocusTimer;
use crate::state::{EngineState, SuggestionState};

/// Spawns the auto-brew loop for a [`FocusTimer`].
pub struct AutoBrewDriver {
    timer: FocusTimer,
    idle_prompt: Duration,
}

impl AutoBrewDriver {
    pub fn new(timer: FocusTimer, idle_prompt: Duration) -> Self {
        Self { timer, idle_prompt }
    }

    /// Start the loop on the current tokio runtime.
    pub fn spawn(self) -> AutoBrewHandle {
        let (activity_tx, activity_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(activity_rx));
        AutoBrewHandle { activity_tx, task }
    }

    async fn run(self, mut activity: mpsc::UnboundedReceiver<()>) {
        let mut states = self.timer.subscribe();
        let mut idle_deadline: Option<Instant> = None;

        loop {
            let state: EngineState = states.borrow_and_update().clone();
            let now_ms = self.timer.clock().now_ms();
            let s = &state.suggestion;

            if s.auto_brew_enabled
                && s.focus_session_complete
                && !s.is_snoozed(now_ms)
                && s.queued_suggestion.is_none()
                && !s.is_prefetching
                && s.auto_suggestion_error.is_none()
            {
                self.timer.spawn_prefetch();
            }

            let armed = idle_armed(s, now_ms);
            idle_deadline = match (armed, idle_deadline) {
                (false, _) => None,
                (true, Some(deadline)) => Some(deadline),
                (true, None) => Some(Instant::now() + self.idle_prompt),
            };

            let snooze_wait = s
                .snooze_until
                .filter(|_| s.focus_session_complete)
                .map(|until| Duration::from_millis(until.saturating_sub(now_ms).max(0) as u64));

            tokio::select! {
                changed = states.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                msg = activity.recv() => match msg {
                    Some(()) => {
                        // The state may have moved on since `armed` was computed.
                        let now_ms = self.timer.clock().now_ms();
                        let still_armed = idle_armed(&states.borrow().suggestion, now_ms);
                        if still_armed {
                            debug!("user active; aborting auto suggestion");
                            idle_deadline = None;
                            self.timer.abort_auto_suggestion();
                        }
                    }
                    None => break,
                },
                _ = sleep_until(idle_deadline.unwrap_or_else(Instant::now)), if idle_deadline.is_some() => {
                    debug!("idle wait elapsed; raising auto prompt");
                    idle_deadline = None;
                    self.timer.trigger_auto_prompt();
                }
                _ = sleep(snooze_wait.unwrap_or_default()), if snooze_wait.is_some() => {
                    debug!("snooze elapsed");
                    self.timer.resume_awaiting_break();
                }
            }
        }
    }
}

/// Waiting for the user to go idle before raising the auto prompt.
fn idle_armed(s: &SuggestionState, now_ms: i64) -> bool {
    s.auto_brew_enabled
        && s.focus_session_complete
        && s.awaiting_break
        && !s.is_snoozed(now_ms)
        && !s.auto_prompt_visible
}

/// Handle to a spawned [`AutoBrewDriver`]. Dropping it stops the loop.
pub struct AutoBrewHandle {
    activity_tx: mpsc::UnboundedSender<()>,
    task: JoinHandle<()>,
}

impl AutoBrewHandle {
    /// Report keyboard/pointer activity from the user.
    pub fn user_activity(&self) {
        let _ = self.activity_tx.send(());
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for AutoBrewHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::suggestion::StaticGenerator;
    use std::sync::Arc;

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    fn completed_sprint() -> (FocusTimer, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let timer = FocusTimer::builder()
            .clock(clock.clone())
            .generator(Arc::new(StaticGenerator::new("Go outside.")))
            .build();
        timer.start();
        clock.advance_secs(1500);
        timer.tick_now();
        timer.pause();
        (timer, clock)
    }

    #[tokio::test(start_paused = true)]
    async fn prefetches_then_prompts_after_idle() {
        let (timer, _clock) = completed_sprint();
        let _handle = AutoBrewDriver::new(timer.clone(), Duration::from_secs(60)).spawn();
        settle().await;
        assert_eq!(
            timer.state().suggestion.queued_suggestion.as_deref(),
            Some("Go outside.")
        );
        assert!(!timer.state().suggestion.auto_prompt_visible);

        sleep(Duration::from_secs(61)).await;
        settle().await;
        assert!(timer.state().suggestion.auto_prompt_visible);
        assert!(!timer.state().suggestion.awaiting_break);
    }

    #[tokio::test(start_paused = true)]
    async fn activity_aborts_armed_prompt() {
        let (timer, _clock) = completed_sprint();
        let handle = AutoBrewDriver::new(timer.clone(), Duration::from_secs(60)).spawn();
        settle().await;
        handle.user_activity();
        settle().await;
        let s = timer.state().suggestion;
        assert!(!s.focus_session_complete);
        assert!(s.queued_suggestion.is_none());

        sleep(Duration::from_secs(120)).await;
        settle().await;
        assert!(!timer.state().suggestion.auto_prompt_visible);
    }

    #[tokio::test(start_paused = true)]
    async fn snooze_rearms_after_expiry() {
        let (timer, clock) = completed_sprint();
        let _handle = AutoBrewDriver::new(timer.clone(), Duration::from_secs(600)).spawn();
        settle().await;
        timer.snooze_auto_suggestion(1);
        settle().await;
        assert!(!timer.state().suggestion.awaiting_break);

        clock.advance_secs(60);
        sleep(Duration::from_secs(61)).await;
        settle().await;
        let s = timer.state().suggestion;
        assert!(s.awaiting_break);
        assert!(s.snooze_until.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn activity_after_snooze_keeps_the_sprint() {
        let (timer, _clock) = completed_sprint();
        let handle = AutoBrewDriver::new(timer.clone(), Duration::from_secs(60)).spawn();
        settle().await;
        // Both land before the driver wakes again.
        timer.snooze_auto_suggestion(5);
        handle.user_activity();
        settle().await;
        let s = timer.state().suggestion;
        assert!(s.focus_session_complete);
        assert!(s.snooze_until.is_some());
        assert_eq!(s.queued_suggestion.as_deref(), Some("Go outside."));
    }
}
