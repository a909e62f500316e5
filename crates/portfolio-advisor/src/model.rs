//! Domain Models
//!
//! Holdings submitted by the user and the metrics derived from them.
//! Uses `rust_decimal` for all monetary values - never use f64 for money!

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A position as submitted by the user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker symbol (e.g., "AAPL")
    pub symbol: String,

    /// Units held
    pub quantity: Decimal,

    /// Price paid per unit
    pub purchase_price: Decimal,
}

impl Holding {
    pub fn new(symbol: impl Into<String>, quantity: Decimal, purchase_price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            purchase_price,
        }
    }

    /// First violated precondition, naming the field
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.symbol.trim().is_empty() {
            return Err(ValidationError::new("symbol", "must not be empty"));
        }
        if self.quantity < Decimal::ZERO {
            return Err(ValidationError::new("quantity", format!("{} is negative", self.quantity)));
        }
        if self.purchase_price < Decimal::ZERO {
            return Err(ValidationError::new(
                "purchase_price",
                format!("{} is negative", self.purchase_price),
            ));
        }
        Ok(())
    }

    /// Attach a market price
    pub fn priced(self, current_price: Decimal) -> PricedHolding {
        PricedHolding {
            holding: self,
            current_price,
        }
    }
}

/// Validate a whole submission, reporting the index of the first bad holding
pub fn validate_holdings(holdings: &[Holding]) -> Result<(), ValidationError> {
    holdings
        .iter()
        .enumerate()
        .try_for_each(|(index, holding)| holding.validate().map_err(|e| e.at(index)))
}

/// A holding with its current market price (0 when the oracle failed)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedHolding {
    #[serde(flatten)]
    pub holding: Holding,

    pub current_price: Decimal,
}

impl PricedHolding {
    pub fn new(
        symbol: impl Into<String>,
        quantity: Decimal,
        purchase_price: Decimal,
        current_price: Decimal,
    ) -> Self {
        Holding::new(symbol, quantity, purchase_price).priced(current_price)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.holding.validate()?;
        if self.current_price < Decimal::ZERO {
            return Err(ValidationError::new(
                "current_price",
                format!("{} is negative", self.current_price),
            ));
        }
        Ok(())
    }
}

/// Derived metrics for one holding
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingAnalysis {
    pub symbol: String,
    pub quantity: Decimal,
    pub purchase_price: Decimal,
    pub current_price: Decimal,

    /// purchase_price × quantity
    pub invested: Decimal,

    /// current_price × quantity
    pub current_value: Decimal,

    /// current_value − invested
    pub profit_loss: Decimal,

    /// Zero when purchase_price is zero
    pub profit_loss_percent: Decimal,

    /// Share of total current value; zero when the portfolio is worth nothing
    pub allocation_percentage: Decimal,
}

/// Aggregate metrics for the whole portfolio
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioAnalysis {
    pub total_invested: Decimal,
    pub total_current_value: Decimal,
    pub total_profit_loss: Decimal,

    /// Zero when nothing was invested
    pub overall_return_percent: Decimal,

    /// One entry per input holding, in submission order
    pub details: Vec<HoldingAnalysis>,
}

impl PortfolioAnalysis {
    /// Pretty JSON embedded into LLM prompts
    pub fn to_prompt_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }
}

/// LLM-generated optimization advice
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Free text using `**bold**` / `*italic*` emphasis
    pub text: String,
}

/// How much risk the user is willing to take
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskTolerance {
    Low,
    #[default]
    Medium,
    High,
    /// Any other label, passed to the model verbatim
    Custom(String),
}

impl RiskTolerance {
    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        match trimmed.to_lowercase().as_str() {
            "" | "medium" | "moderate" => Self::Medium,
            "low" | "conservative" => Self::Low,
            "high" | "aggressive" => Self::High,
            _ => Self::Custom(trimmed.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Custom(label) => label,
        }
    }
}

impl std::fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for RiskTolerance {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for RiskTolerance {
    fn from(label: String) -> Self {
        Self::parse(&label)
    }
}

impl From<RiskTolerance> for String {
    fn from(risk: RiskTolerance) -> Self {
        risk.label().to_string()
    }
}
