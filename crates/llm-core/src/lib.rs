//! # llm-core
//!
//! Provider-agnostic text generation for the portfolio advisor.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Recommender / ReportComposer / SymbolResolver               │
//! │                 │                                            │
//! │         ┌───────▼────────┐       ┌─────────────────────┐     │
//! │         │ TextCompletion │──────▶│   LlmProvider       │     │
//! │         │ (timeout, trim)│       │   (Strategy)        │     │
//! │         └────────────────┘       └─────────────────────┘     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait enables swapping between OpenAI, Ollama,
//! or any other backend without touching the pipeline.

pub mod completion;
pub mod error;
pub mod message;
pub mod provider;

pub use completion::TextCompletion;
pub use error::{LlmError, Result};
pub use message::{Message, Role};
pub use provider::{Completion, FinishReason, GenerationOptions, LlmProvider, ProviderInfo, TokenUsage};
