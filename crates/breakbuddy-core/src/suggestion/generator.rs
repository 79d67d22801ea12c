use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::stats::Mood;

/// Input for one break suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    /// Length of the focus sprint just finished, at least 1.
    pub focus_minutes: u32,
    pub mood: Option<Mood>,
    /// Text to avoid repeating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_count: Option<u32>,
}

impl SuggestionRequest {
    /// Build a request from focus seconds; minutes are rounded and floored at 1.
    pub fn from_focus_seconds(focus_seconds: u64, mood: Option<Mood>) -> Self {
        let minutes = (focus_seconds as f64 / 60.0).round().max(1.0);
        Self {
            focus_minutes: minutes.min(u32::MAX as f64) as u32,
            mood,
            previous_suggestion: None,
            session_count: None,
        }
    }
}

/// Turns a request into a short suggestion text.
///
/// Implementations are called without any engine lock held and may take as
/// long as they like; the engine re-validates its state when they return.
#[async_trait]
pub trait SuggestionGenerator: Send + Sync {
    async fn generate(&self, request: &SuggestionRequest) -> Result<String, GenerationError>;
}

/// Always returns the same text. Handy offline and in tests.
#[derive(Debug, Clone)]
pub struct StaticGenerator {
    text: String,
}

impl StaticGenerator {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl SuggestionGenerator for StaticGenerator {
    async fn generate(&self, _request: &SuggestionRequest) -> Result<String, GenerationError> {
        Ok(self.text.clone())
    }
}
