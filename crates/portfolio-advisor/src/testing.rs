//! Test doubles for the text service and the price oracle.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use llm_core::{Completion, FinishReason, GenerationOptions, LlmError, LlmProvider, Message, ProviderInfo, TextCompletion};
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::error::PriceLookupError;
use crate::oracle::PriceOracle;

/// Replies with queued texts in order, then fails
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    pub calls: Mutex<Vec<(String, GenerationOptions)>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Self::new(Vec::<String>::new())
    }

    pub async fn prompts(&self) -> Vec<String> {
        self.calls.lock().await.iter().map(|(p, _)| p.clone()).collect()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "Scripted".into(),
            default_model: "scripted-1".into(),
        }
    }

    async fn health_check(&self) -> llm_core::Result<bool> {
        Ok(true)
    }

    async fn complete(&self, messages: &[Message], options: &GenerationOptions) -> llm_core::Result<Completion> {
        let prompt = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        self.calls.lock().await.push((prompt, options.clone()));

        let reply = self
            .replies
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| LlmError::ProviderUnavailable("connection refused".into()))?;
        Ok(Completion {
            content: reply,
            model: options.model.clone(),
            usage: None,
            finish_reason: Some(FinishReason::Stop),
        })
    }
}

pub fn completion(provider: Arc<ScriptedProvider>) -> TextCompletion {
    TextCompletion::with_default_model(provider, Duration::from_secs(5))
}

/// Per-symbol prices with optional delays and failures
#[derive(Default)]
pub struct MockOracle {
    prices: HashMap<String, Decimal>,
    delays: HashMap<String, Duration>,
    fallback: Option<Decimal>,
    pub lookups: Mutex<Vec<String>>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, symbol: &str, price: Decimal) -> Self {
        self.prices.insert(symbol.to_string(), price);
        self
    }

    pub fn with_delay(mut self, symbol: &str, delay: Duration) -> Self {
        self.delays.insert(symbol.to_string(), delay);
        self
    }

    /// Price reported by `price_or_zero` when a lookup fails
    pub fn with_fallback(mut self, price: Decimal) -> Self {
        self.fallback = Some(price);
        self
    }
}

#[async_trait]
impl PriceOracle for MockOracle {
    async fn current_price(&self, symbol: &str) -> Result<Decimal, PriceLookupError> {
        self.lookups.lock().await.push(symbol.to_string());
        if let Some(delay) = self.delays.get(symbol) {
            tokio::time::sleep(*delay).await;
        }
        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| PriceLookupError::UnknownSymbol(symbol.to_string()))
    }

    async fn price_or_zero(&self, symbol: &str) -> Decimal {
        match self.current_price(symbol).await {
            Ok(price) => price,
            Err(_) => self.fallback.unwrap_or(Decimal::ZERO),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
