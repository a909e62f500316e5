//! Static Price Oracle
//!
//! For demos and tests. Serves prices from a fixed table.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::PriceOracle;
use crate::error::PriceLookupError;

/// Oracle backed by an in-memory symbol → price table
#[derive(Clone, Debug, Default)]
pub struct StaticPriceOracle {
    prices: HashMap<String, Decimal>,
}

impl StaticPriceOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handful of large caps at realistic prices
    pub fn demo() -> Self {
        [
            ("AAPL", dec!(189.84)),
            ("MSFT", dec!(415.50)),
            ("GOOGL", dec!(141.80)),
            ("AMZN", dec!(178.25)),
            ("TSLA", dec!(251.37)),
            ("NVDA", dec!(875.28)),
            ("META", dec!(496.10)),
            ("BRK.B", dec!(402.11)),
            ("JPM", dec!(196.62)),
            ("VTI", dec!(256.03)),
        ]
        .into_iter()
        .fold(Self::new(), |oracle, (symbol, price)| oracle.with_price(symbol, price))
    }

    #[must_use]
    pub fn with_price(mut self, symbol: &str, price: Decimal) -> Self {
        self.prices.insert(symbol.to_uppercase(), price);
        self
    }
}

#[async_trait]
impl PriceOracle for StaticPriceOracle {
    async fn current_price(&self, symbol: &str) -> Result<Decimal, PriceLookupError> {
        self.prices
            .get(&symbol.trim().to_uppercase())
            .copied()
            .ok_or_else(|| PriceLookupError::UnknownSymbol(symbol.to_string()))
    }

    fn name(&self) -> &str {
        "static"
    }
}
