//! Yahoo Finance Price Oracle
//!
//! Reads the regular market price from the v8 chart endpoint, falling back
//! to the last close of the day when the quote field is missing.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;

use super::PriceOracle;
use crate::error::PriceLookupError;

const CHART_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Yahoo Finance chart response
#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartData>>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: ChartMeta,
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Oracle backed by Yahoo Finance
#[derive(Clone, Debug)]
pub struct YahooPriceOracle {
    client: Client,
    base_url: String,
}

impl YahooPriceOracle {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Self::with_base_url(CHART_URL, timeout)
    }

    /// Point at a different chart endpoint (proxies, test servers)
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn chart_url(&self, symbol: &str) -> Result<Url, PriceLookupError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|_| PriceLookupError::Unavailable(symbol.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| PriceLookupError::Unavailable(symbol.to_string()))?
            .push(symbol);
        url.query_pairs_mut()
            .append_pair("range", "1d")
            .append_pair("interval", "1d");
        Ok(url)
    }
}

/// Regular market price first, else the last non-null close
fn extract_price(symbol: &str, envelope: ChartEnvelope) -> Result<Decimal, PriceLookupError> {
    let data = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| PriceLookupError::UnknownSymbol(symbol.to_string()))?;

    let last_close = || {
        data.indicators
            .as_ref()
            .and_then(|i| i.quote.first())
            .and_then(|q| q.close.iter().rev().find_map(|c| *c))
    };

    let raw = data
        .meta
        .regular_market_price
        .or_else(last_close)
        .ok_or_else(|| PriceLookupError::Unavailable(symbol.to_string()))?;

    to_price(symbol, raw)
}

fn to_price(symbol: &str, raw: f64) -> Result<Decimal, PriceLookupError> {
    if !raw.is_finite() || raw < 0.0 {
        return Err(PriceLookupError::InvalidPrice {
            symbol: symbol.to_string(),
            price: raw.to_string(),
        });
    }
    Decimal::from_f64(raw).ok_or_else(|| PriceLookupError::InvalidPrice {
        symbol: symbol.to_string(),
        price: raw.to_string(),
    })
}

#[async_trait]
impl PriceOracle for YahooPriceOracle {
    async fn current_price(&self, symbol: &str) -> Result<Decimal, PriceLookupError> {
        let symbol = symbol.trim();
        let network = |source| PriceLookupError::Network {
            symbol: symbol.to_string(),
            source,
        };

        let response = self
            .client
            .get(self.chart_url(symbol)?)
            .send()
            .await
            .map_err(network)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PriceLookupError::UnknownSymbol(symbol.to_string()));
        }

        let envelope: ChartEnvelope = response
            .error_for_status()
            .map_err(network)?
            .json()
            .await
            .map_err(network)?;

        let price = extract_price(symbol, envelope)?;
        tracing::debug!(symbol, %price, "yahoo price");
        Ok(price)
    }

    async fn health_check(&self) -> bool {
        self.current_price("SPY").await.is_ok()
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn parse(raw: &str) -> ChartEnvelope {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_regular_market_price_preferred() {
        let envelope = parse(
            r#"{"chart": {"result": [{"meta": {"regularMarketPrice": 189.84},
                "indicators": {"quote": [{"close": [180.0, 181.5]}]}}], "error": null}}"#,
        );
        assert_eq!(extract_price("AAPL", envelope).unwrap(), dec!(189.84));
    }

    #[test]
    fn test_falls_back_to_last_close() {
        let envelope = parse(
            r#"{"chart": {"result": [{"meta": {},
                "indicators": {"quote": [{"close": [180.0, 181.5, null]}]}}]}}"#,
        );
        assert_eq!(extract_price("AAPL", envelope).unwrap(), dec!(181.5));
    }

    #[test]
    fn test_no_price_at_all() {
        let envelope = parse(r#"{"chart": {"result": [{"meta": {}, "indicators": {"quote": []}}]}}"#);
        let err = extract_price("AAPL", envelope).unwrap_err();
        assert!(matches!(err, PriceLookupError::Unavailable(_)));

        let envelope = parse(r#"{"chart": {"result": null, "error": {"code": "Not Found"}}}"#);
        let err = extract_price("NOTREAL", envelope).unwrap_err();
        assert!(matches!(err, PriceLookupError::UnknownSymbol(_)));
    }

    #[test]
    fn test_negative_price_rejected() {
        let err = to_price("AAPL", -1.0).unwrap_err();
        assert!(matches!(err, PriceLookupError::InvalidPrice { .. }));
        assert!(to_price("AAPL", f64::NAN).is_err());
    }

    #[test]
    fn test_chart_url_escapes_symbol() {
        let oracle = YahooPriceOracle::new(Duration::from_secs(5)).unwrap();
        let url = oracle.chart_url("BRK/B").unwrap();
        assert_eq!(
            url.as_str(),
            "https://query2.finance.yahoo.com/v8/finance/chart/BRK%2FB?range=1d&interval=1d"
        );
    }
}
