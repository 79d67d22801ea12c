//! Core error types for breakbuddy-core.
//!
//! The engine facade never surfaces these to its callers: generation
//! failures become field-scoped strings on the state snapshot and storage
//! failures are logged and absorbed. Lower layers (stores, codec, HTTP
//! client, config) still report through these types.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for breakbuddy-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Suggestion generation errors
    #[error("Suggestion error: {0}")]
    Generation(#[from] GenerationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),
}

/// Failures of the break-suggestion collaborator.
///
/// The `Display` text is what ends up in `suggestion_error` or
/// `auto_suggestion_error`, so it is written for the user.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Gemini API key missing. Set {env_var} and try again.")]
    MissingApiKey { env_var: String },

    #[error("Gemini request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Gemini request failed ({status}): {body}")]
    Http { status: u16, body: String },

    #[error("Gemini returned an empty suggestion.")]
    Empty,

    #[error("Gemini hit the token cap before finishing the suggestion. Try again or shorten the prompt.")]
    TokenLimit,

    #[error("Gemini response could not be read: {0}")]
    Malformed(String),
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_messages_are_user_facing() {
        let err = GenerationError::Http {
            status: 503,
            body: "overloaded".into(),
        };
        assert_eq!(err.to_string(), "Gemini request failed (503): overloaded");
        assert_eq!(
            GenerationError::Empty.to_string(),
            "Gemini returned an empty suggestion."
        );
    }

    #[test]
    fn core_error_wraps_generation() {
        let err: CoreError = GenerationError::TokenLimit.into();
        assert!(err.to_string().starts_with("Suggestion error: Gemini hit the token cap"));
    }
}
