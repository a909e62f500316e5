//! Symbol Resolver
//!
//! Company name to ticker lookup through the text service. Independent of the
//! report pipeline.

use llm_core::TextCompletion;
use tracing::debug;

use crate::error::ResolveError;

const RESOLVE_MAX_TOKENS: u32 = 12;
const RESOLVE_TEMPERATURE: f32 = 0.2;
const MAX_SYMBOL_LEN: usize = 10;

#[derive(Clone, Debug)]
pub struct SymbolResolver {
    completion: TextCompletion,
}

impl SymbolResolver {
    pub const fn new(completion: TextCompletion) -> Self {
        Self { completion }
    }

    /// Resolve `company_name` to an uppercase ticker such as `AAPL`
    pub async fn resolve(&self, company_name: &str) -> Result<String, ResolveError> {
        let name = company_name.trim();
        if name.is_empty() {
            return Err(ResolveError::EmptyName);
        }

        let prompt = format!(
            "Given the company name '{name}', what is its ticker symbol on the US stock market? \
             Answer only with the ticker symbol in uppercase letters."
        );
        let answer = self
            .completion
            .complete(&prompt, RESOLVE_MAX_TOKENS, RESOLVE_TEMPERATURE)
            .await?;

        let symbol = normalize_symbol(&answer).ok_or_else(|| ResolveError::Unrecognized(answer.clone()))?;
        debug!(company = name, %symbol, "Resolved ticker");
        Ok(symbol)
    }
}

/// Pull a ticker out of a short free-text answer
pub fn normalize_symbol(answer: &str) -> Option<String> {
    let token = answer.split_whitespace().next()?;
    let symbol = token
        .trim_matches(|c: char| !c.is_ascii_alphanumeric())
        .to_ascii_uppercase();

    let valid = !symbol.is_empty()
        && symbol.len() <= MAX_SYMBOL_LEN
        && symbol.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    valid.then_some(symbol)
}
