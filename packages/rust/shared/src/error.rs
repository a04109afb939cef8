//! Error types for Contentible.
//!
//! Library crates use [`ContentibleError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

use crate::types::TurnId;

/// Top-level error type for all Contentible operations.
#[derive(Debug, thiserror::Error)]
pub enum ContentibleError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error talking to the generation endpoint or a resolver.
    #[error("network error: {0}")]
    Network(String),

    /// Response body or HTML could not be decoded.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Payload decoded but is missing required data.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A submission was made while another turn is still pending.
    #[error("turn {pending} is still pending")]
    Busy { pending: TurnId },

    /// A result arrived for a turn that is no longer the pending one.
    #[error("turn {turn} is stale")]
    StaleTurn { turn: TurnId },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ContentibleError>;

impl ContentibleError {
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
