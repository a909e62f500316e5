//! Pipeline Orchestrator
//!
//! PRICE → ANALYZE → RECOMMEND → COMPOSE+RENDER, each stage at most once per
//! run. Any stage failure aborts the run with a [`PipelineError`] naming the
//! stage; nothing is retried here.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::analysis::analyze;
use crate::error::{PriceLookupError, Result};
use crate::model::{Holding, PortfolioAnalysis, PricedHolding, Recommendation, RiskTolerance, validate_holdings};
use crate::oracle::PriceOracle;
use crate::svckit::{Recommender, ReportComposer};

/// What to do when a price lookup fails
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PricingPolicy {
    /// Log the failure and price the holding at zero
    #[default]
    Degrade,
    /// Abort the run
    FailFast,
}

impl PricingPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "degrade" => Some(Self::Degrade),
            "fail-fast" | "failfast" | "strict" => Some(Self::FailFast),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub pricing_policy: PricingPolicy,
    /// Upper bound on each price lookup
    pub price_timeout: Duration,
    pub max_concurrent_lookups: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pricing_policy: PricingPolicy::Degrade,
            price_timeout: Duration::from_secs(5),
            max_concurrent_lookups: 4,
        }
    }
}

/// Everything a successful run produced
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub pdf: Vec<u8>,
    pub analysis: PortfolioAnalysis,
    pub recommendation: Recommendation,
}

pub struct ReportPipeline {
    oracle: Arc<dyn PriceOracle>,
    recommender: Recommender,
    composer: ReportComposer,
    config: PipelineConfig,
}

impl ReportPipeline {
    pub fn new(
        oracle: Arc<dyn PriceOracle>,
        recommender: Recommender,
        composer: ReportComposer,
        config: PipelineConfig,
    ) -> Self {
        Self {
            oracle,
            recommender,
            composer,
            config,
        }
    }

    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn oracle(&self) -> &Arc<dyn PriceOracle> {
        &self.oracle
    }

    /// Validate and price holdings, preserving input order
    pub async fn price_holdings(&self, holdings: &[Holding]) -> Result<Vec<PricedHolding>> {
        validate_holdings(holdings)?;
        self.lookup_prices(holdings).await
    }

    /// PRICE and ANALYZE only; no text service involved
    pub async fn analyze_holdings(&self, holdings: &[Holding]) -> Result<PortfolioAnalysis> {
        let priced = self.price_holdings(holdings).await?;
        Ok(analyze(&priced)?)
    }

    /// Run all four stages
    pub async fn run(&self, holdings: &[Holding], risk_tolerance: &RiskTolerance) -> Result<PipelineOutput> {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline", %run_id, holdings = holdings.len(), risk = %risk_tolerance);

        self.run_stages(holdings, risk_tolerance).instrument(span).await
    }

    /// Run all stages and keep only the document bytes
    pub async fn run_to_pdf(&self, holdings: &[Holding], risk_tolerance: &RiskTolerance) -> Result<Vec<u8>> {
        self.run(holdings, risk_tolerance).await.map(|output| output.pdf)
    }

    async fn run_stages(&self, holdings: &[Holding], risk_tolerance: &RiskTolerance) -> Result<PipelineOutput> {
        validate_holdings(holdings)?;

        let priced = self.lookup_prices(holdings).instrument(info_span!("price")).await?;
        info!(stage = "price", priced = priced.len(), "Stage complete");

        let analysis = info_span!("analyze").in_scope(|| analyze(&priced))?;
        info!(
            stage = "analyze",
            total_value = %analysis.total_current_value,
            return_pct = %analysis.overall_return_percent,
            "Stage complete"
        );

        let recommendation = self
            .recommender
            .recommend(&analysis, risk_tolerance)
            .instrument(info_span!("recommend"))
            .await?;
        info!(stage = "recommend", "Stage complete");

        let report = self
            .composer
            .compose(&analysis, &recommendation)
            .instrument(info_span!("compose"))
            .await?;
        let pdf = info_span!("render").in_scope(|| self.composer.render(&report))?;
        info!(stage = "render", bytes = pdf.len(), "Stage complete");

        Ok(PipelineOutput {
            pdf,
            analysis,
            recommendation,
        })
    }

    async fn lookup_prices(&self, holdings: &[Holding]) -> Result<Vec<PricedHolding>> {
        let mut lookups = stream::iter(holdings)
            .map(|holding| async move { (holding, self.lookup(&holding.symbol).await) })
            .buffered(self.config.max_concurrent_lookups.max(1));

        let mut priced = Vec::with_capacity(holdings.len());
        while let Some((holding, result)) = lookups.next().await {
            let price = match result {
                Ok(price) => price,
                Err(err) if self.config.pricing_policy == PricingPolicy::FailFast => return Err(err.into()),
                Err(err) => {
                    warn!(symbol = %holding.symbol, error = %err, "Price lookup failed, using 0");
                    Decimal::ZERO
                }
            };
            priced.push(holding.clone().priced(price));
        }
        Ok(priced)
    }

    async fn lookup(&self, symbol: &str) -> std::result::Result<Decimal, PriceLookupError> {
        let timeout = self.config.price_timeout;
        let timed_out = |_: tokio::time::error::Elapsed| PriceLookupError::Timeout {
            symbol: symbol.to_string(),
            millis: timeout.as_millis(),
        };
        let price = match self.config.pricing_policy {
            // The oracle absorbs its own failures; a hung or negative lookup is still ours
            PricingPolicy::Degrade => tokio::time::timeout(timeout, self.oracle.price_or_zero(symbol))
                .await
                .map_err(timed_out)?,
            PricingPolicy::FailFast => tokio::time::timeout(timeout, self.oracle.current_price(symbol))
                .await
                .map_err(timed_out)??,
        };

        if price < Decimal::ZERO {
            return Err(PriceLookupError::InvalidPrice {
                symbol: symbol.to_string(),
                price: price.to_string(),
            });
        }
        debug!(symbol, %price, oracle = self.oracle.name(), "Priced holding");
        Ok(price)
    }
}

/// `{name}_Report_{YYYYMMDD}.pdf`, with the name reduced to filename-safe characters
pub fn report_filename(user_name: &str, date: NaiveDate) -> String {
    let name: String = user_name
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    let name = if name.is_empty() { "Portfolio" } else { name.as_str() };
    format!("{name}_Report_{}.pdf", date.format("%Y%m%d"))
}
