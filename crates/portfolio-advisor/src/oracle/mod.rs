//! Price Oracle
//!
//! Abstractions and implementations for current market prices.

mod fixed;
mod yahoo;

pub use fixed::StaticPriceOracle;
pub use yahoo::YahooPriceOracle;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::PriceLookupError;

/// Market data source (Strategy pattern)
///
/// Implement this for each data vendor: Yahoo, Polygon, a broker feed, etc.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Current price for a symbol
    async fn current_price(&self, symbol: &str) -> Result<Decimal, PriceLookupError>;

    /// Current price, or zero on any failure. Never fails.
    async fn price_or_zero(&self, symbol: &str) -> Decimal {
        match self.current_price(symbol).await {
            Ok(price) => price,
            Err(e) => {
                tracing::warn!(oracle = self.name(), "{}; using price 0", e);
                Decimal::ZERO
            }
        }
    }

    /// Check if the data source is reachable
    async fn health_check(&self) -> bool {
        true
    }

    /// Oracle name
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_price_or_zero_never_fails() {
        let oracle = StaticPriceOracle::new().with_price("AAPL", dec!(150));

        assert_eq!(oracle.price_or_zero("AAPL").await, dec!(150));
        assert_eq!(oracle.price_or_zero("NOTREAL").await, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_health_check_reports_unreachable_source() {
        let yahoo = YahooPriceOracle::with_base_url("http://127.0.0.1:1", std::time::Duration::from_millis(500)).unwrap();

        assert!(!yahoo.health_check().await);
        assert!(StaticPriceOracle::demo().health_check().await);
    }
}
