//! Error types for the pfstats system
//!
//! Every failure the lookup pipeline can produce is one of these variants.
//! None of them ever escape the coordinator: they are logged and turned
//! into a cached placeholder line.

use thiserror::Error;

/// Result type alias for pfstats operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the pfstats system
#[derive(Error, Debug)]
pub enum Error {
    /// The identity service has no player with this name (HTTP 204)
    #[error("Player not found: {0}")]
    NotFound(String),

    /// Network error or unexpected status at one of the remote stages
    #[error("Transient failure at {stage} stage: {message}")]
    Transient {
        /// Stage that failed ("identity" or "stats")
        stage: &'static str,
        /// Status code, body or transport error text
        message: String,
    },

    /// Payload is missing required fields or reports `success: false`
    #[error("Malformed payload: {0}")]
    Structural(String),

    /// Assembling the display line failed
    #[error("Format error: {0}")]
    Format(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A response body that is not JSON at all
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a transient error for the given stage
    pub fn transient(stage: &'static str, message: impl Into<String>) -> Self {
        Self::Transient {
            stage,
            message: message.into(),
        }
    }

    /// Create a structural (payload shape) error
    pub fn structural(msg: impl Into<String>) -> Self {
        Self::Structural(msg.into())
    }

    /// Create a format error
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// True when the player simply does not exist upstream.
    pub fn is_terminal_miss(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Pipeline stage this error belongs to, for log context
    pub fn stage(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "identity",
            Self::Transient { stage, .. } => stage,
            Self::Structural(_) | Self::Json(_) => "transform",
            Self::Format(_) => "format",
            Self::Config(_) | Self::InvalidInput(_) | Self::Other(_) => "request",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_labels() {
        assert_eq!(Error::not_found("Ghost").stage(), "identity");
        assert_eq!(Error::transient("stats", "502").stage(), "stats");
        assert_eq!(Error::structural("no dungeons").stage(), "transform");
        assert_eq!(Error::format("bad level").stage(), "format");
    }

    #[test]
    fn test_json_error_converts() {
        let err: Error = serde_json::from_str::<serde_json::Value>("<html>")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Json(_)));
        assert_eq!(err.stage(), "transform");
    }

    #[test]
    fn test_terminal_miss() {
        assert!(Error::not_found("Ghost").is_terminal_miss());
        assert!(!Error::transient("identity", "timeout").is_terminal_miss());
    }

    #[test]
    fn test_transient_display_includes_stage() {
        let err = Error::transient("identity", "status 500: boom");
        assert_eq!(
            err.to_string(),
            "Transient failure at identity stage: status 500: boom"
        );
    }
}
