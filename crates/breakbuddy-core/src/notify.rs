//! Best-effort side effects: sounds and desktop notifications.
//!
//! The engine calls these fire-and-forget. Errors are logged and dropped;
//! they never touch engine state.

use std::sync::{Mutex, PoisonError};

use tracing::{info, warn};

pub type NotifyError = Box<dyn std::error::Error + Send + Sync>;

/// Audio cues the engine may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Played when a long break is accepted.
    LongBreakStart,
}

/// A single side effect, as recorded by [`CollectNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Sound(SoundCue),
    Message { title: String, body: String },
}

/// Every sound/notification backend implements this trait.
pub trait Notifier: Send + Sync {
    fn play_sound(&self, _cue: SoundCue) -> Result<(), NotifyError> {
        Ok(()) // default no-op
    }

    fn notify(&self, _title: &str, _body: &str) -> Result<(), NotifyError> {
        Ok(()) // default no-op
    }
}

/// Does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn play_sound(&self, cue: SoundCue) -> Result<(), NotifyError> {
        info!(?cue, "sound");
        Ok(())
    }

    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        info!(title, body, "notification");
        Ok(())
    }
}

/// Collects side effects in memory (for testing).
#[derive(Debug, Default)]
pub struct CollectNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl CollectNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self) -> Vec<Notification> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn push(&self, n: Notification) {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).push(n);
    }
}

impl Notifier for CollectNotifier {
    fn play_sound(&self, cue: SoundCue) -> Result<(), NotifyError> {
        self.push(Notification::Sound(cue));
        Ok(())
    }

    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        self.push(Notification::Message {
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

pub(crate) fn play(notifier: &dyn Notifier, cue: SoundCue) {
    if let Err(e) = notifier.play_sound(cue) {
        warn!(error = %e, ?cue, "sound playback failed");
    }
}

pub(crate) fn send(notifier: &dyn Notifier, title: &str, body: &str) {
    if let Err(e) = notifier.notify(title, body) {
        warn!(error = %e, title, "notification failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl Notifier for Failing {
        fn play_sound(&self, _cue: SoundCue) -> Result<(), NotifyError> {
            Err("no audio device".into())
        }

        fn notify(&self, _title: &str, _body: &str) -> Result<(), NotifyError> {
            Err("permission denied".into())
        }
    }

    #[test]
    fn failures_are_swallowed() {
        play(&Failing, SoundCue::LongBreakStart);
        send(&Failing, "t", "b");
    }

    #[test]
    fn collect_records_in_order() {
        let n = CollectNotifier::new();
        play(&n, SoundCue::LongBreakStart);
        send(&n, "Long break", "Enjoy");
        assert_eq!(
            n.seen(),
            vec![
                Notification::Sound(SoundCue::LongBreakStart),
                Notification::Message {
                    title: "Long break".into(),
                    body: "Enjoy".into()
                },
            ]
        );
    }
}
