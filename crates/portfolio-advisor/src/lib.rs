//! # portfolio-advisor
//!
//! Holdings in, PDF report out: prices each holding, computes profit/loss and
//! allocation metrics, asks a language model for optimization advice, and
//! renders the narrative onto letter-size pages.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────┐   ┌─────────┐   ┌───────────┐   ┌──────────────────┐
//! │  PRICE   │──▶│ ANALYZE │──▶│ RECOMMEND │──▶│ COMPOSE + RENDER │──▶ PDF bytes
//! │ (oracle) │   │ (pure)  │   │   (LLM)   │   │  (LLM, pdf)      │
//! └──────────┘   └─────────┘   └───────────┘   └──────────────────┘
//! ```
//!
//! - **Exact money math** - `rust_decimal` throughout, so totals equal the sum
//!   of their parts
//! - **Explicit price policy** - a failed lookup either prices at zero or
//!   aborts the run, as configured
//! - **Tolerant markup** - unmatched `*` markers from the model stay literal
//!
//! ## Example
//!
//! ```rust,ignore
//! let pipeline = ReportPipeline::new(oracle, recommender, composer, config.prices.pipeline_config());
//! let pdf = pipeline.run_to_pdf(&holdings, &RiskTolerance::parse("moderate")).await?;
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod model;
pub mod oracle;
pub mod pipeline;
pub mod report;
pub mod svckit;

#[cfg(test)]
mod testing;

pub use analysis::analyze;
pub use config::{AdvisorConfig, LlmProviderKind, LlmSettings, OracleKind, PriceSettings, ServerSettings};
pub use error::{
    ConfigError, PipelineError, PriceLookupError, RecommendationError, RenderError, ReportGenerationError,
    ResolveError, Result, ValidationError,
};
pub use model::{
    Holding, HoldingAnalysis, PortfolioAnalysis, PricedHolding, Recommendation, RiskTolerance, validate_holdings,
};
pub use oracle::{PriceOracle, StaticPriceOracle, YahooPriceOracle};
pub use pipeline::{PipelineConfig, PipelineOutput, PricingPolicy, ReportPipeline, report_filename};
pub use report::{PageLayout, Paragraph, Report, Span, SpanStyle};
pub use svckit::{Recommender, ReportComposer, SymbolResolver};
