//! Error Types

use thiserror::Error;

/// Result type alias for LLM operations
pub type Result<T> = std::result::Result<T, LlmError>;

/// LLM error types
#[derive(Error, Debug)]
pub enum LlmError {
    /// Provider returned an error response
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Completion did not finish within the configured bound
    #[error("Completion timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Provider answered, but with no usable text
    #[error("Provider returned an empty completion")]
    EmptyResponse,

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl LlmError {
    /// Check if error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable(_) | Self::RateLimited(_) | Self::Timeout { .. }
        )
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(msg) => format!("The AI service encountered an error: {msg}"),
            Self::ProviderUnavailable(_) => "The AI service is currently unavailable. Please try again.".into(),
            Self::Timeout { .. } => "The AI service took too long to respond.".into(),
            Self::EmptyResponse => "The AI service returned no content.".into(),
            Self::RateLimited(_) => "The AI service is rate limiting requests. Please wait a moment.".into(),
            Self::Auth(_) => "The AI service rejected the configured credentials.".into(),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<anyhow::Error> for LlmError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
