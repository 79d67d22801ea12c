//! Gemini-backed suggestion generator.

use async_trait::async_trait;
use indoc::{formatdoc, indoc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::generator::{SuggestionGenerator, SuggestionRequest};
use crate::error::GenerationError;
use crate::storage::SuggestionsConfig;

const SYSTEM_PROMPT: &str = indoc! {"
    You are BreakBuddy, a witty, sarcastic, but kind productivity companion for developers.
    You help users take small breaks when they've been coding or focusing for too long.
    Keep your personality casual, caffeinated, and human, like a supportive teammate who roasts you just enough to care.

    Your behavior rules:
    - Responses must be under 25 words.
    - Keep the tone funny, dry, or mildly sarcastic, never mean or depressing.
    - Encourage positive action: hydrate, stretch, move, breathe, or laugh.
    - Never repeat the same suggestion twice in a row.
    - Avoid corporate or generic wellness phrases.
    - You may reference coding humor, caffeine, or burnout in lighthearted ways.

    Example tone:
    - \"Blink. Again. Your retinas deserve hazard pay.\"
    - \"Hydration checkpoint. Coffee doesn't count.\"

    Your mission: help devs chill out without sounding like an HR pamphlet.
"};

/// Connection settings for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Named in the error when `api_key` is missing.
    pub api_key_env: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
}

impl GeminiSettings {
    /// Settings from config, reading the key from the configured variable.
    pub fn from_config(cfg: &SuggestionsConfig) -> Self {
        let api_key = std::env::var(&cfg.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self {
            base_url: cfg.api_base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            api_key,
            api_key_env: cfg.api_key_env.clone(),
            temperature: cfg.temperature,
            max_output_tokens: cfg.max_output_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StructuredSuggestion {
    break_suggestion: Option<String>,
    suggestion: Option<String>,
}

/// Calls the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    settings: GeminiSettings,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    pub fn from_config(cfg: &SuggestionsConfig) -> Self {
        Self::new(GeminiSettings::from_config(cfg))
    }

    pub fn settings(&self) -> &GeminiSettings {
        &self.settings
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.base_url, self.settings.model
        )
    }
}

/// The per-request user prompt.
pub(crate) fn build_user_prompt(request: &SuggestionRequest) -> String {
    let focus = request.focus_minutes.max(1);
    let mood = request
        .mood
        .map(|m| m.symbol().to_string())
        .unwrap_or_else(|| "none provided".to_string());
    let session_line = match request.session_count {
        Some(n) if n > 0 => format!("Session count today: {n}."),
        _ => "Session count today: not provided.".to_string(),
    };
    let repeat_line = match request.previous_suggestion.as_deref() {
        Some(prev) if !prev.is_empty() => {
            format!("Last suggestion: \"{prev}\". Do not repeat it.")
        }
        _ => "No previous suggestion this session.".to_string(),
    };

    formatdoc! {"
        User's focus duration: {focus} minutes
        User's current mood: {mood}
        {session_line}
        Generate one short break suggestion following your personality rules.
        Include light sarcasm or humor relevant to the situation.
        Avoid generic text or motivational clichés.
        {repeat_line}",
        focus = focus,
        mood = mood,
        session_line = session_line,
        repeat_line = repeat_line,
    }
}

/// Pull the suggestion out of the model text. JSON objects with a
/// `break_suggestion` or `suggestion` key are unwrapped; anything else is
/// returned trimmed. Yields `None` when nothing readable is left.
pub(crate) fn extract_suggestion(raw: &str) -> Option<String> {
    let cleaned = raw.trim();
    if cleaned.starts_with('{') {
        if let Ok(parsed) = serde_json::from_str::<StructuredSuggestion>(cleaned) {
            let keyed = parsed.break_suggestion.is_some() || parsed.suggestion.is_some();
            let picked = [parsed.break_suggestion, parsed.suggestion]
                .into_iter()
                .flatten()
                .map(|s| s.trim().to_string())
                .find(|s| !s.is_empty());
            if picked.is_some() || keyed {
                return picked;
            }
        }
    }
    Some(cleaned.to_string()).filter(|s| !s.is_empty())
}

#[async_trait]
impl SuggestionGenerator for GeminiClient {
    async fn generate(&self, request: &SuggestionRequest) -> Result<String, GenerationError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or_else(|| GenerationError::MissingApiKey {
                env_var: self.settings.api_key_env.clone(),
            })?;

        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": build_user_prompt(request) }],
            }],
            "systemInstruction": {
                "role": "system",
                "parts": [{ "text": SYSTEM_PROMPT }],
            },
            "generationConfig": {
                "temperature": self.settings.temperature,
                "topP": 0.8,
                "maxOutputTokens": self.settings.max_output_tokens,
                "responseMimeType": "application/json",
            },
        });

        debug!(model = %self.settings.model, "requesting break suggestion");
        let resp = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Http {
                status: status.as_u16(),
                body: if text.is_empty() {
                    "Unknown error".to_string()
                } else {
                    text
                },
            });
        }

        let data: GeminiResponse = resp
            .json()
            .await
            .map_err(|e| GenerationError::Malformed(e.to_string()))?;
        let candidate = data.candidates.into_iter().next();
        let finish_reason = candidate
            .as_ref()
            .and_then(|c| c.finish_reason.clone());
        let raw_text = candidate
            .and_then(|c| c.content)
            .and_then(|content| {
                content
                    .parts
                    .into_iter()
                    .find_map(|p| p.text.filter(|t| !t.trim().is_empty()))
            });

        match raw_text {
            Some(text) => extract_suggestion(&text).ok_or(GenerationError::Empty),
            None if finish_reason.as_deref() == Some("MAX_TOKENS") => {
                Err(GenerationError::TokenLimit)
            }
            None => Err(GenerationError::Empty),
        }
    }
}
