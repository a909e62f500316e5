//! Application State

use std::sync::Arc;

use llm_core::LlmProvider;
use portfolio_advisor::{ReportPipeline, SymbolResolver};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Text-completion backend, kept for health checks
    pub provider: Arc<dyn LlmProvider>,

    /// Price → analyze → recommend → report
    pub pipeline: Arc<ReportPipeline>,

    /// Company name to ticker lookup
    pub resolver: Arc<SymbolResolver>,
}
