//! OpenAI LLM Provider
//!
//! Implementation of `LlmProvider` for the chat-completions API. Works with
//! any OpenAI-compatible endpoint via `base_url`.

use std::time::Duration;

use async_trait::async_trait;
use llm_core::{
    error::{LlmError, Result},
    message::Message,
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider, ProviderInfo, TokenUsage},
};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// OpenAI provider configuration
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    /// API key (sent as bearer token)
    pub api_key: String,

    /// API base URL
    pub base_url: String,

    /// Model used when the caller does not pick one
    pub default_model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".into(),
            default_model: "gpt-4-turbo".into(),
            timeout_secs: 60,
        }
    }
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }
}

/// OpenAI LLM provider
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a [String]>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    model: Option<String>,
    choices: Vec<Choice>,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

fn stop_sequences(options: &GenerationOptions) -> Option<&[String]> {
    (!options.stop_sequences.is_empty()).then_some(options.stop_sequences.as_slice())
}

impl OpenAiProvider {
    /// Create from configuration
    pub fn from_config(config: OpenAiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Config("OpenAI API key is missing".into()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Convert messages to the wire format
    fn convert_messages(messages: &[Message]) -> Vec<WireMessage<'_>> {
        messages
            .iter()
            .map(|m| WireMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .collect()
    }

    /// Map a non-success HTTP status to an error
    fn status_error(status: StatusCode, body: String) -> LlmError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Auth(body),
            StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited(body),
            s if s.is_server_error() => LlmError::ProviderUnavailable(format!("{s}: {body}")),
            s => LlmError::Provider(format!("{s}: {body}")),
        }
    }

    fn transport_error(err: &reqwest::Error) -> LlmError {
        if err.is_connect() || err.is_timeout() {
            LlmError::ProviderUnavailable(err.to_string())
        } else {
            LlmError::Provider(err.to_string())
        }
    }

    fn convert_completion(response: ChatResponse, requested_model: &str) -> Result<Completion> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Provider("response contained no choices".into()))?;

        Ok(Completion {
            content: choice.message.content.unwrap_or_default(),
            model: response.model.unwrap_or_else(|| requested_model.to_string()),
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.finish_reason.as_deref().map(FinishReason::from_wire),
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "OpenAI".into(),
            default_model: self.config.default_model.clone(),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        match self
            .client
            .get(self.endpoint("models"))
            .bearer_auth(&self.config.api_key)
            .send()
            .await
        {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(e) => {
                tracing::warn!("OpenAI health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let request = ChatRequest {
            model: &options.model,
            messages: Self::convert_messages(messages),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            top_p: options.top_p,
            stop: stop_sequences(options),
        };

        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error(status, body));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Provider(format!("malformed response: {e}")))?;

        Self::convert_completion(body, &options.model)
    }
}
