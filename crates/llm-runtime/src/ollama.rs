//! Ollama LLM Provider
//!
//! Implementation of `LlmProvider` for local Ollama inference.

use std::time::Duration;

use async_trait::async_trait;
use llm_core::{
    error::{LlmError, Result},
    message::{Message, Role},
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider, ProviderInfo, TokenUsage},
};
use ollama_rs::{
    Ollama,
    generation::chat::{ChatMessage, ChatMessageResponse, request::ChatMessageRequest},
    models::ModelOptions,
};

/// Ollama provider configuration
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    /// Ollama host URL
    pub host: String,

    /// Ollama port
    pub port: u16,

    /// Model used when the caller does not pick one
    pub default_model: String,

    /// Connection timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".into(),
            port: 11434,
            default_model: "llama3.2".into(),
            timeout_secs: 120,
        }
    }
}

/// Ollama LLM provider
pub struct OllamaProvider {
    client: Ollama,
    config: OllamaConfig,
}

impl OllamaProvider {
    /// Create from configuration
    pub fn from_config(config: OllamaConfig) -> Result<Self> {
        // Ollama::new panics on a bad URL; reject it here instead
        reqwest::Url::parse(&config.host)
            .map_err(|e| LlmError::Config(format!("invalid Ollama host {:?}: {e}", config.host)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Config(e.to_string()))?;

        Ok(Self {
            client: Ollama::new_with_client(config.host.clone(), config.port, http),
            config,
        })
    }

    /// Create with default localhost settings
    pub fn localhost() -> Result<Self> {
        Self::from_config(OllamaConfig::default())
    }

    /// Convert messages to Ollama format
    fn convert_messages(messages: &[Message]) -> Vec<ChatMessage> {
        messages
            .iter()
            .map(|m| match m.role {
                Role::System => ChatMessage::system(m.content.clone()),
                Role::User => ChatMessage::user(m.content.clone()),
                Role::Assistant => ChatMessage::assistant(m.content.clone()),
            })
            .collect()
    }

    /// Build Ollama generation options
    fn build_options(opts: &GenerationOptions) -> ModelOptions {
        ModelOptions::default()
            .temperature(opts.temperature)
            .top_p(opts.top_p)
            .num_predict(i32::try_from(opts.max_tokens).unwrap_or(i32::MAX))
    }

    /// Convert Ollama response to a completion
    fn convert_completion(response: ChatMessageResponse, options: &GenerationOptions) -> Completion {
        let usage = response
            .final_data
            .as_ref()
            .map(|d| token_usage(d.prompt_eval_count, d.eval_count));

        Completion {
            content: response.message.content,
            model: options.model.clone(),
            usage,
            finish_reason: Some(finish_reason(usage, options.max_tokens)),
        }
    }
}

fn token_usage(prompt: impl TryInto<u32>, generated: impl TryInto<u32>) -> TokenUsage {
    let prompt_tokens = prompt.try_into().unwrap_or(u32::MAX);
    let completion_tokens = generated.try_into().unwrap_or(u32::MAX);
    TokenUsage {
        prompt_tokens,
        completion_tokens,
        total_tokens: prompt_tokens.saturating_add(completion_tokens),
    }
}

/// The chat response carries no stop reason; a spent budget means truncation
fn finish_reason(usage: Option<TokenUsage>, max_tokens: u32) -> FinishReason {
    match usage {
        Some(usage) if usage.completion_tokens >= max_tokens => FinishReason::Length,
        _ => FinishReason::Stop,
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "Ollama".into(),
            default_model: self.config.default_model.clone(),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        match self.client.list_local_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Ollama health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let request = ChatMessageRequest::new(options.model.clone(), Self::convert_messages(messages))
            .options(Self::build_options(options));

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| LlmError::Provider(e.to_string()))?;

        Ok(Self::convert_completion(response, options))
    }
}
