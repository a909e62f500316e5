//! Service Kit
//!
//! Components that talk to the text-completion service.

mod recommendation;
mod report_composer;
mod symbol_resolver;

pub use recommendation::{RECOMMENDATION_MAX_TOKENS, RECOMMENDATION_TEMPERATURE, Recommender};
pub use report_composer::{REPORT_MAX_TOKENS, REPORT_TEMPERATURE, ReportComposer};
pub use symbol_resolver::{SymbolResolver, normalize_symbol};
