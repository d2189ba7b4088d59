//! Error types for kbforge.
//!
//! Library crates use [`KbForgeError`] via `thiserror` for hard failures.
//! Recoverable problems found while detecting are [`DetectionError`] values
//! (see [`crate::types`]) and never abort a pass.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! [`DetectionError`]: crate::types::DetectionError

use std::path::PathBuf;

/// Top-level error type for all kbforge operations.
#[derive(Debug, thiserror::Error)]
pub enum KbForgeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Structured-data parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// An include directive could not be satisfied.
    #[error("include error: {message}")]
    Include { message: String },

    /// A config value that parses but can never work (e.g. an unmatchable alias).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// JSON serialization of a result failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, KbForgeError>;

impl KbForgeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create an include error from any displayable message.
    pub fn include(msg: impl Into<String>) -> Self {
        Self::Include {
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = KbForgeError::config("concurrency must be at least 1");
        assert_eq!(err.to_string(), "config error: concurrency must be at least 1");

        let err = KbForgeError::include("section Alpha not found");
        assert!(err.to_string().starts_with("include error:"));
    }

    #[test]
    fn io_error_carries_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = KbForgeError::io("/tmp/missing.yml", source);
        let rendered = err.to_string();
        assert!(rendered.contains("missing.yml"));
        assert!(rendered.contains("gone"));
    }
}
