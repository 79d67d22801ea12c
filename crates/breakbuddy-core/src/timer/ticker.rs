use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Returned by the tick callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Stop,
}

/// A periodic tick task. At most one is live per `Ticker`; starting again
/// replaces the previous task and dropping the ticker stops it.
#[derive(Debug, Default)]
pub struct Ticker {
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a task calling `on_tick` every `period`, first call immediately.
    ///
    /// Needs a tokio runtime; without one the ticker stays inactive.
    pub fn start<F>(&mut self, period: Duration, mut on_tick: F)
    where
        F: FnMut() -> TickOutcome + Send + 'static,
    {
        self.stop();
        let Ok(runtime) = Handle::try_current() else {
            warn!("no tokio runtime; ticker not started");
            return;
        };
        let period = period.max(Duration::from_millis(1));
        self.handle = Some(runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if on_tick() == TickOutcome::Stop {
                    debug!("ticker stopped by callback");
                    break;
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
