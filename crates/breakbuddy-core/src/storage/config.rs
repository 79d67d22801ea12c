//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Default focus/break durations
//! - Engine tuning (tick interval, catch-up bound)
//! - Break-suggestion settings (idle prompt, snooze, Gemini model)
//! - Notification preferences
//!
//! Configuration is stored at `~/.config/breakbuddy/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, CoreError};
use crate::timer::{
    is_valid_phase_secs, Durations, DEFAULT_FOCUS_SECS, DEFAULT_LONG_BREAK_SECS,
    DEFAULT_SHORT_BREAK_SECS,
};

/// Phase lengths in seconds, used when no snapshot has stored its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationsConfig {
    #[serde(default = "default_focus")]
    pub focus: u64,
    #[serde(default = "default_short_break")]
    pub short_break: u64,
    #[serde(default = "default_long_break")]
    pub long_break: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Upper bound on phase completions handled by one tick.
    #[serde(default = "default_max_catch_up")]
    pub max_catch_up_iterations: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionsConfig {
    /// Idle time after a focus sprint before the auto prompt shows.
    #[serde(default = "default_idle_prompt_secs")]
    pub idle_prompt_secs: u64,
    #[serde(default = "default_snooze_minutes")]
    pub snooze_minutes: u32,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Play a soft cue when a long break starts.
    #[serde(default = "default_true")]
    pub sound: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/breakbuddy/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub durations: DurationsConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub suggestions: SuggestionsConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

// Default functions
fn default_focus() -> u64 {
    DEFAULT_FOCUS_SECS
}
fn default_short_break() -> u64 {
    DEFAULT_SHORT_BREAK_SECS
}
fn default_long_break() -> u64 {
    DEFAULT_LONG_BREAK_SECS
}
fn default_tick_interval_ms() -> u64 {
    250
}
fn default_max_catch_up() -> u32 {
    24
}
fn default_idle_prompt_secs() -> u64 {
    60
}
fn default_snooze_minutes() -> u32 {
    5
}
fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn default_temperature() -> f64 {
    0.8
}
fn default_max_output_tokens() -> u32 {
    1000
}
fn default_true() -> bool {
    true
}

impl Default for DurationsConfig {
    fn default() -> Self {
        Self {
            focus: default_focus(),
            short_break: default_short_break(),
            long_break: default_long_break(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            max_catch_up_iterations: default_max_catch_up(),
        }
    }
}

impl Default for SuggestionsConfig {
    fn default() -> Self {
        Self {
            idle_prompt_secs: default_idle_prompt_secs(),
            snooze_minutes: default_snooze_minutes(),
            model: default_model(),
            api_base_url: default_api_base_url(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sound: true,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(unknown());
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or write and return the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&Self::path()?)
    }

    /// Like [`Config::load`] with an explicit file path.
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
                .into()
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not parse as
    /// the key's type.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        self.apply(key, value)?;
        self.save()?;
        Ok(())
    }

    /// Every leaf key with its current value, in dot-path form.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (k, v) in map {
                        let key = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{prefix}.{k}")
                        };
                        walk(&key, v, out);
                    }
                }
                serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out
    }

    /// Default phase lengths; zero or over-long entries fall back to the built-in values.
    pub fn durations(&self) -> Durations {
        let pick = |value: u64, fallback: u64| {
            if is_valid_phase_secs(value) {
                value
            } else {
                fallback
            }
        };
        Durations {
            focus: pick(self.durations.focus, DEFAULT_FOCUS_SECS),
            short_break: pick(self.durations.short_break, DEFAULT_SHORT_BREAK_SECS),
            long_break: pick(self.durations.long_break, DEFAULT_LONG_BREAK_SECS),
        }
    }
}
