//! Configuration
//!
//! Process-wide settings, read once at startup and handed to components
//! through their constructors.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pipeline::{PipelineConfig, PricingPolicy};

/// Text-completion backend
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    #[default]
    OpenAi,
    Ollama,
}

/// Market data backend
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleKind {
    #[default]
    Yahoo,
    Static,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: LlmProviderKind,
    pub api_key: Option<String>,
    /// Overrides the provider's default model
    pub model: Option<String>,
    /// OpenAI-compatible endpoint
    pub base_url: Option<String>,
    pub ollama_host: String,
    pub ollama_port: u16,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProviderKind::OpenAi,
            api_key: None,
            model: None,
            base_url: None,
            ollama_host: "http://localhost".into(),
            ollama_port: 11434,
            timeout_secs: 60,
        }
    }
}

impl LlmSettings {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceSettings {
    pub oracle: OracleKind,
    pub timeout_secs: u64,
    pub concurrency: usize,
    pub policy: PricingPolicy,
}

impl Default for PriceSettings {
    fn default() -> Self {
        Self {
            oracle: OracleKind::Yahoo,
            timeout_secs: 5,
            concurrency: 4,
            policy: PricingPolicy::Degrade,
        }
    }
}

impl PriceSettings {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub const fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            pricing_policy: self.policy,
            price_timeout: self.timeout(),
            max_concurrent_lookups: self.concurrency,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub llm: LlmSettings,
    pub prices: PriceSettings,
    pub server: ServerSettings,
}

impl AdvisorConfig {
    /// Load from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup; unset or blank keys keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(value) = get("LLM_PROVIDER") {
            config.llm.provider = match value.to_ascii_lowercase().as_str() {
                "openai" => LlmProviderKind::OpenAi,
                "ollama" => LlmProviderKind::Ollama,
                _ => return Err(invalid("LLM_PROVIDER", value)),
            };
        }
        config.llm.api_key = get("OPENAI_API_KEY");
        config.llm.base_url = get("OPENAI_BASE_URL");
        config.llm.model = get("LLM_MODEL");
        if let Some(host) = get("OLLAMA_HOST") {
            config.llm.ollama_host = host;
        }
        if let Some(value) = get("OLLAMA_PORT") {
            config.llm.ollama_port = parse("OLLAMA_PORT", value)?;
        }
        if let Some(value) = get("LLM_TIMEOUT_SECS") {
            config.llm.timeout_secs = parse("LLM_TIMEOUT_SECS", value)?;
        }

        if let Some(value) = get("PRICE_ORACLE") {
            config.prices.oracle = match value.to_ascii_lowercase().as_str() {
                "yahoo" => OracleKind::Yahoo,
                "static" => OracleKind::Static,
                _ => return Err(invalid("PRICE_ORACLE", value)),
            };
        }
        if let Some(value) = get("PRICE_TIMEOUT_SECS") {
            config.prices.timeout_secs = parse("PRICE_TIMEOUT_SECS", value)?;
        }
        if let Some(value) = get("PRICE_CONCURRENCY") {
            config.prices.concurrency = parse("PRICE_CONCURRENCY", value)?;
        }
        if let Some(value) = get("PRICE_POLICY") {
            config.prices.policy = PricingPolicy::parse(&value).ok_or_else(|| invalid("PRICE_POLICY", value))?;
        }

        if let Some(addr) = get("BIND_ADDR") {
            config.server.bind_addr = addr;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let has_key = self.llm.api_key.as_deref().is_some_and(|k| !k.trim().is_empty());
        if self.llm.provider == LlmProviderKind::OpenAi && !has_key {
            return Err(ConfigError::Missing("OPENAI_API_KEY"));
        }
        if self.llm.timeout_secs == 0 {
            return Err(invalid("LLM_TIMEOUT_SECS", "0"));
        }
        if self.prices.timeout_secs == 0 {
            return Err(invalid("PRICE_TIMEOUT_SECS", "0"));
        }
        if self.prices.concurrency == 0 {
            return Err(invalid("PRICE_CONCURRENCY", "0"));
        }
        Ok(())
    }
}

fn invalid(key: &'static str, value: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.into(),
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| invalid(key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AdvisorConfig, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        AdvisorConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_api_key() {
        let config = load(&[("OPENAI_API_KEY", "sk-test")]).unwrap();
        assert_eq!(config.llm.provider, LlmProviderKind::OpenAi);
        assert_eq!(config.llm.timeout(), Duration::from_secs(60));
        assert_eq!(config.prices.oracle, OracleKind::Yahoo);
        assert_eq!(config.prices.pipeline_config(), PipelineConfig::default());
        assert_eq!(config.server.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_openai_requires_key() {
        assert_eq!(load(&[]), Err(ConfigError::Missing("OPENAI_API_KEY")));
        assert_eq!(load(&[("OPENAI_API_KEY", "   ")]), Err(ConfigError::Missing("OPENAI_API_KEY")));
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let config = load(&[
            ("LLM_PROVIDER", "Ollama"),
            ("OLLAMA_HOST", "http://gpu-box"),
            ("OLLAMA_PORT", "8080"),
            ("LLM_MODEL", "llama3.1"),
        ])
        .unwrap();
        assert_eq!(config.llm.provider, LlmProviderKind::Ollama);
        assert_eq!(config.llm.ollama_host, "http://gpu-box");
        assert_eq!(config.llm.ollama_port, 8080);
        assert_eq!(config.llm.model.as_deref(), Some("llama3.1"));
    }

    #[test]
    fn test_price_settings() {
        let config = load(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("PRICE_ORACLE", "static"),
            ("PRICE_TIMEOUT_SECS", "2"),
            ("PRICE_CONCURRENCY", "8"),
            ("PRICE_POLICY", "fail-fast"),
        ])
        .unwrap();
        let pipeline = config.prices.pipeline_config();
        assert_eq!(config.prices.oracle, OracleKind::Static);
        assert_eq!(pipeline.pricing_policy, PricingPolicy::FailFast);
        assert_eq!(pipeline.price_timeout, Duration::from_secs(2));
        assert_eq!(pipeline.max_concurrent_lookups, 8);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = load(&[("OPENAI_API_KEY", "k"), ("PRICE_CONCURRENCY", "many")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "PRICE_CONCURRENCY",
                value: "many".into()
            }
        );
        assert!(load(&[("OPENAI_API_KEY", "k"), ("PRICE_CONCURRENCY", "0")]).is_err());
        assert!(load(&[("OPENAI_API_KEY", "k"), ("LLM_TIMEOUT_SECS", "0")]).is_err());
        assert!(load(&[("LLM_PROVIDER", "anthropic")]).is_err());
        assert!(load(&[("OPENAI_API_KEY", "k"), ("PRICE_POLICY", "maybe")]).is_err());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: AdvisorConfig =
            serde_json::from_str(r#"{"llm": {"provider": "ollama"}, "prices": {"policy": "fail-fast"}}"#).unwrap();
        assert_eq!(config.llm.provider, LlmProviderKind::Ollama);
        assert_eq!(config.llm.ollama_port, 11434);
        assert_eq!(config.prices.policy, PricingPolicy::FailFast);
        assert!(config.validate().is_ok());
    }
}
