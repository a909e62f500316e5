//! Provider Seam
//!
//! [`LlmProvider`] is the one trait every text-generation backend implements.
//! Callers describe a request with [`GenerationOptions`] and get back a
//! [`Completion`]; nothing above this module knows which vendor answered.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Message;

/// Sampling and length settings for one request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    pub model: String,
    pub temperature: f32,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    pub top_p: f32,
    pub stop_sequences: Vec<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4-turbo".into(),
            temperature: 0.7,
            max_tokens: 2048,
            top_p: 0.9,
            stop_sequences: Vec::new(),
        }
    }
}

impl GenerationOptions {
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// What a backend returned
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub content: String,
    /// Model that actually answered, as reported by the backend
    pub model: String,
    pub usage: Option<TokenUsage>,
    pub finish_reason: Option<FinishReason>,
}

impl Completion {
    /// Generation stopped at `max_tokens`
    pub fn truncated(&self) -> bool {
        self.finish_reason == Some(FinishReason::Length)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    Error,
}

impl FinishReason {
    /// Parse `finish_reason` / `done_reason` strings. Unknown values map to `Error`.
    pub fn from_wire(reason: &str) -> Self {
        match reason {
            "stop" => Self::Stop,
            "length" => Self::Length,
            "content_filter" => Self::ContentFilter,
            _ => Self::Error,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Display name such as `OpenAI`
    pub name: String,
    pub default_model: String,
}

/// A text-generation backend (Strategy pattern)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn info(&self) -> ProviderInfo;

    /// `Ok(false)` means reachable but not usable, e.g. missing model
    async fn health_check(&self) -> Result<bool>;

    async fn complete(&self, messages: &[Message], options: &GenerationOptions) -> Result<Completion>;

    /// Rough token count, about four bytes per token
    fn estimate_tokens(&self, text: &str) -> u32 {
        u32::try_from(text.len().div_ceil(4)).unwrap_or(u32::MAX)
    }
}
