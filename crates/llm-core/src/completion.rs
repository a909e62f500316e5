//! Bounded Text Completion
//!
//! Single-prompt completion with a hard timeout. This is the seam the
//! recommendation, report and symbol stages talk to.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{LlmError, Result};
use crate::message::Message;
use crate::provider::{GenerationOptions, LlmProvider};

/// Prompt-in, text-out wrapper around an [`LlmProvider`]
#[derive(Clone)]
pub struct TextCompletion {
    provider: Arc<dyn LlmProvider>,
    model: String,
    timeout: Duration,
}

impl TextCompletion {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            provider,
            model: model.into(),
            timeout,
        }
    }

    /// Use the provider's default model
    pub fn with_default_model(provider: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        let model = provider.info().default_model;
        Self::new(provider, model, timeout)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    /// Complete `prompt`, returning trimmed, non-empty text.
    pub async fn complete(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String> {
        let options = GenerationOptions::for_model(self.model.clone())
            .with_max_tokens(max_tokens)
            .with_temperature(temperature);
        let messages = [Message::user(prompt)];

        tracing::debug!(
            model = %self.model,
            max_tokens,
            prompt_tokens = self.provider.estimate_tokens(prompt),
            "requesting completion"
        );

        let completion = tokio::time::timeout(self.timeout, self.provider.complete(&messages, &options))
            .await
            .map_err(|_| LlmError::Timeout { seconds: self.timeout.as_secs() })??;

        if completion.truncated() {
            tracing::warn!(model = %completion.model, max_tokens, "completion hit the token limit");
        }

        let text = completion.content.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

impl std::fmt::Debug for TextCompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextCompletion")
            .field("provider", &self.provider.info().name)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Completion, FinishReason, ProviderInfo};
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// Replies with a fixed text after an optional delay, recording options
    struct FixedProvider {
        reply: String,
        delay: Duration,
        seen: Mutex<Vec<GenerationOptions>>,
    }

    impl FixedProvider {
        fn new(reply: &str) -> Self {
            Self { reply: reply.into(), delay: Duration::ZERO, seen: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl LlmProvider for FixedProvider {
        fn info(&self) -> ProviderInfo {
            ProviderInfo { name: "Fixed".into(), default_model: "fixed-1".into() }
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        async fn complete(&self, _messages: &[Message], options: &GenerationOptions) -> Result<Completion> {
            self.seen.lock().await.push(options.clone());
            tokio::time::sleep(self.delay).await;
            Ok(Completion {
                content: self.reply.clone(),
                model: options.model.clone(),
                usage: None,
                finish_reason: Some(FinishReason::Stop),
            })
        }
    }

    #[tokio::test]
    async fn test_complete_trims_and_passes_bounds() {
        let provider = Arc::new(FixedProvider::new("  **Buy more AAPL**\n"));
        let service = TextCompletion::with_default_model(provider.clone(), Duration::from_secs(5));

        let text = service.complete("advise me", 400, 0.7).await.unwrap();
        assert_eq!(text, "**Buy more AAPL**");

        let seen = provider.seen.lock().await;
        assert_eq!(seen[0].max_tokens, 400);
        assert_eq!(seen[0].model, "fixed-1");
    }

    #[tokio::test]
    async fn test_blank_completion_is_an_error() {
        let service = TextCompletion::new(Arc::new(FixedProvider::new(" \n\t")), "m", Duration::from_secs(5));
        let err = service.complete("p", 10, 0.0).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let mut provider = FixedProvider::new("late");
        provider.delay = Duration::from_millis(200);
        let service = TextCompletion::new(Arc::new(provider), "m", Duration::from_millis(20));

        let err = service.complete("p", 10, 0.0).await.unwrap_err();
        assert!(matches!(err, LlmError::Timeout { .. }));
    }
}
