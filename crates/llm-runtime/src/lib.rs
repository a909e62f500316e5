//! # llm-runtime
//!
//! Runtime providers for the portfolio advisor.
//!
//! ## Providers
//!
//! - **OpenAI**: chat-completions API (any OpenAI-compatible endpoint)
//! - **Ollama** (feature `ollama`, on by default): local inference
//!
//! ## Usage
//!
//! ```rust,ignore
//! use llm_runtime::{OpenAiConfig, OpenAiProvider};
//!
//! let provider = OpenAiProvider::from_config(OpenAiConfig::new(api_key))?;
//! let service = TextCompletion::with_default_model(Arc::new(provider), timeout);
//! ```

pub mod openai;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};
pub use openai::{OpenAiConfig, OpenAiProvider};

// Re-export core types for convenience
pub use llm_core::{LlmError, LlmProvider, Message, Result, Role, TextCompletion};
