//! Per-interval session identity.
//!
//! A focus interval is credited to stats and history at most once. The
//! tracker remembers which id is counting down and which id was most
//! recently logged; a completion whose active id equals the last logged id
//! has already been credited.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Create an id unique within this process: epoch millis plus a random suffix.
pub fn create_session_id(now_ms: i64) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect();
    format!("{now_ms}-{suffix}")
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTracker {
    active: Option<String>,
    last_logged: Option<String>,
}

impl SessionTracker {
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn last_logged(&self) -> Option<&str> {
        self.last_logged.as_deref()
    }

    pub fn set_active(&mut self, id: Option<String>) {
        self.active = id;
    }

    /// Allocate and activate a fresh id.
    pub fn begin(&mut self, now_ms: i64) -> &str {
        self.active.insert(create_session_id(now_ms))
    }

    /// Activate a fresh id unless an unlogged one is already active.
    pub fn ensure_fresh(&mut self, now_ms: i64) {
        if self.active.is_none() || self.active == self.last_logged {
            self.begin(now_ms);
        }
    }

    /// The active id, allocating one if nothing is active.
    pub fn active_or_begin(&mut self, now_ms: i64) -> String {
        if let Some(id) = &self.active {
            return id.clone();
        }
        self.begin(now_ms).to_owned()
    }

    pub fn is_logged(&self, id: &str) -> bool {
        self.last_logged.as_deref() == Some(id)
    }

    /// Record `id` as logged and clear the active slot.
    pub fn mark_logged(&mut self, id: String) {
        self.last_logged = Some(id);
        self.active = None;
    }

    pub fn clear(&mut self) {
        self.active = None;
        self.last_logged = None;
    }
}
