//! Recommendation Generator
//!
//! Asks the text service for risk-adjusted optimization advice.

use llm_core::TextCompletion;
use tracing::{debug, info};

use crate::error::RecommendationError;
use crate::model::{PortfolioAnalysis, Recommendation, RiskTolerance};
use crate::report::balance_emphasis;

pub const RECOMMENDATION_MAX_TOKENS: u32 = 400;
pub const RECOMMENDATION_TEMPERATURE: f32 = 0.7;

/// Produces [`Recommendation`]s from a portfolio analysis
#[derive(Clone, Debug)]
pub struct Recommender {
    completion: TextCompletion,
}

impl Recommender {
    pub const fn new(completion: TextCompletion) -> Self {
        Self { completion }
    }

    pub fn prompt(analysis: &PortfolioAnalysis, risk_tolerance: &RiskTolerance) -> Result<String, serde_json::Error> {
        let analysis = analysis.to_prompt_json()?;
        Ok(format!(
            "Please analyze the following portfolio analysis data:\n\n{analysis}\n\n\
             Given a risk tolerance of '{risk_tolerance}', provide a detailed, risk-adjusted \
             portfolio optimization strategy with recommendations for improving diversification \
             and returns. Highlight key suggestions in **bold** where applicable."
        ))
    }

    /// Generate advice. Stray emphasis markers in the reply are escaped.
    pub async fn recommend(
        &self,
        analysis: &PortfolioAnalysis,
        risk_tolerance: &RiskTolerance,
    ) -> Result<Recommendation, RecommendationError> {
        let prompt = Self::prompt(analysis, risk_tolerance)?;
        debug!(risk = %risk_tolerance, holdings = analysis.details.len(), "Requesting recommendation");

        let text = self
            .completion
            .complete(&prompt, RECOMMENDATION_MAX_TOKENS, RECOMMENDATION_TEMPERATURE)
            .await?;

        let text = balance_emphasis(&text);
        info!(chars = text.len(), "Recommendation generated");
        Ok(Recommendation { text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedProvider, completion};
    use llm_core::LlmError;

    #[tokio::test]
    async fn test_prompt_carries_analysis_and_risk() {
        let provider = ScriptedProvider::new(["**Diversify** into bonds"]);
        let recommender = Recommender::new(completion(provider.clone()));

        let rec = recommender
            .recommend(&PortfolioAnalysis::default(), &RiskTolerance::parse("conservative"))
            .await
            .unwrap();
        assert_eq!(rec.text, "**Diversify** into bonds");

        let calls = provider.calls.lock().await;
        let (prompt, options) = &calls[0];
        assert!(prompt.contains("risk tolerance of 'low'"));
        assert!(prompt.contains("\"total_invested\""));
        assert!(prompt.contains("**bold**"));
        assert_eq!(options.max_tokens, RECOMMENDATION_MAX_TOKENS);
        assert!((options.temperature - RECOMMENDATION_TEMPERATURE).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_unmatched_markers_are_escaped() {
        let provider = ScriptedProvider::new(["**Sell TSLA and hold"]);
        let recommender = Recommender::new(completion(provider));

        let rec = recommender
            .recommend(&PortfolioAnalysis::default(), &RiskTolerance::High)
            .await
            .unwrap();
        assert_eq!(rec.text, r"\*\*Sell TSLA and hold");
    }

    #[tokio::test]
    async fn test_service_failure_is_recommendation_error() {
        let recommender = Recommender::new(completion(ScriptedProvider::failing()));
        let err = recommender
            .recommend(&PortfolioAnalysis::default(), &RiskTolerance::Medium)
            .await
            .unwrap_err();
        assert!(matches!(err, RecommendationError::Completion(LlmError::ProviderUnavailable(_))));
    }

    #[tokio::test]
    async fn test_blank_reply_is_an_error() {
        let recommender = Recommender::new(completion(ScriptedProvider::new(["   "])));
        let err = recommender
            .recommend(&PortfolioAnalysis::default(), &RiskTolerance::Medium)
            .await
            .unwrap_err();
        assert!(matches!(err, RecommendationError::Completion(LlmError::EmptyResponse)));
    }
}
