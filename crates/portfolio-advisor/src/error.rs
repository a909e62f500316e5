//! Error Types for the Portfolio Advisor
//!
//! One error type per pipeline stage, folded into [`PipelineError`] for callers.

use llm_core::LlmError;
use thiserror::Error;

/// Malformed holding input, rejected before the pipeline starts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {field}{}: {reason}", at_index(.index))]
pub struct ValidationError {
    /// Offending field (`symbol`, `quantity`, `purchase_price`, `current_price`)
    pub field: &'static str,

    pub reason: String,

    /// Position of the offending holding in the submitted list
    pub index: Option<usize>,
}

fn at_index(index: &Option<usize>) -> String {
    index.map_or_else(String::new, |i| format!(" (holding #{i})"))
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
            index: None,
        }
    }

    #[must_use]
    pub const fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

/// Per-symbol market data failure
#[derive(Error, Debug)]
pub enum PriceLookupError {
    #[error("no price available for {0}")]
    Unavailable(String),

    #[error("unknown symbol {0}")]
    UnknownSymbol(String),

    #[error("price lookup for {symbol} timed out after {millis}ms")]
    Timeout { symbol: String, millis: u128 },

    #[error("invalid price {price} reported for {symbol}")]
    InvalidPrice { symbol: String, price: String },

    #[error("network error looking up {symbol}: {source}")]
    Network {
        symbol: String,
        #[source]
        source: reqwest::Error,
    },
}

impl PriceLookupError {
    pub fn symbol(&self) -> &str {
        match self {
            Self::Unavailable(s) | Self::UnknownSymbol(s) => s,
            Self::Timeout { symbol, .. }
            | Self::InvalidPrice { symbol, .. }
            | Self::Network { symbol, .. } => symbol,
        }
    }
}

/// The text service could not produce optimization advice
#[derive(Error, Debug)]
pub enum RecommendationError {
    #[error("recommendation service failed: {0}")]
    Completion(#[from] LlmError),

    #[error("could not serialize analysis for prompt: {0}")]
    Prompt(#[from] serde_json::Error),
}

/// The text service could not produce the report narrative
#[derive(Error, Debug)]
pub enum ReportGenerationError {
    #[error("report narrative service failed: {0}")]
    Completion(#[from] LlmError),

    #[error("could not serialize analysis for prompt: {0}")]
    Prompt(#[from] serde_json::Error),
}

/// Document layout failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("invalid page layout: {0}")]
    Layout(String),

    #[error("document too large: {0}")]
    Overflow(String),
}

/// Company-name to ticker resolution failure
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("company name is empty")]
    EmptyName,

    #[error("could not read a ticker symbol from {0:?}")]
    Unrecognized(String),

    #[error("symbol service failed: {0}")]
    Completion(#[from] LlmError),
}

/// Invalid process configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// A failed pipeline run, tagged with the stage that failed
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    PriceLookup(#[from] PriceLookupError),

    #[error(transparent)]
    Recommendation(#[from] RecommendationError),

    #[error(transparent)]
    ReportGeneration(#[from] ReportGenerationError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl PipelineError {
    /// Stable tag for the failed stage
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::PriceLookup(_) => "price_lookup",
            Self::Recommendation(_) => "recommendation",
            Self::ReportGeneration(_) => "report_generation",
            Self::Render(_) => "render",
        }
    }

    /// Whether a caller-side retry could succeed
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::PriceLookup(PriceLookupError::Timeout { .. } | PriceLookupError::Network { .. }) => true,
            Self::Recommendation(RecommendationError::Completion(e))
            | Self::ReportGeneration(ReportGenerationError::Completion(e)) => e.is_retryable(),
            _ => false,
        }
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => format!("Invalid holdings: {e}"),
            Self::PriceLookup(e) => format!("Could not fetch a current price for {}.", e.symbol()),
            Self::Recommendation(RecommendationError::Completion(e))
            | Self::ReportGeneration(ReportGenerationError::Completion(e)) => e.user_message(),
            Self::Recommendation(_) | Self::ReportGeneration(_) | Self::Render(_) => {
                "The report could not be generated.".into()
            }
        }
    }
}
