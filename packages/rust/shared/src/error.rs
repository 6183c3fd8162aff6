//! Error types for the worklog tools.
//!
//! Library crates use [`WorklogError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all worklog operations.
#[derive(Debug, thiserror::Error)]
pub enum WorklogError {
    /// Bad or contradictory date bounds supplied by the caller.
    #[error("invalid period: {message}")]
    InvalidPeriod { message: String },

    /// A required collection key, API key variable, or provider is not configured.
    #[error("missing configuration: {key}")]
    MissingConfiguration { key: String },

    /// Configuration loading or parsing error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Document store failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Language-model backend failure (API error, unusable response).
    #[error("summarizer error: {0}")]
    Summarizer(String),

    /// Transport failure talking to a model provider.
    #[error("network error: {0}")]
    Network(String),

    /// Malformed user input or undecodable property data.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, WorklogError>;

impl WorklogError {
    /// Create an invalid-period error from any displayable message.
    pub fn invalid_period(msg: impl Into<String>) -> Self {
        Self::InvalidPeriod {
            message: msg.into(),
        }
    }

    /// Create a missing-configuration error naming the absent key.
    pub fn missing_config(key: impl Into<String>) -> Self {
        Self::MissingConfiguration { key: key.into() }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from an external collaborator (store or model).
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            Self::Storage(_) | Self::Summarizer(_) | Self::Network(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = WorklogError::invalid_period("start is after end");
        assert_eq!(err.to_string(), "invalid period: start is after end");

        let err = WorklogError::missing_config("collections.weekly_achievements");
        assert!(err.to_string().contains("collections.weekly_achievements"));
    }

    #[test]
    fn backend_failure_classification() {
        assert!(WorklogError::Storage("locked".into()).is_backend_failure());
        assert!(WorklogError::Summarizer("HTTP 529".into()).is_backend_failure());
        assert!(WorklogError::Network("timeout".into()).is_backend_failure());
        assert!(!WorklogError::invalid_period("x").is_backend_failure());
        assert!(!WorklogError::missing_config("x").is_backend_failure());
    }
}
