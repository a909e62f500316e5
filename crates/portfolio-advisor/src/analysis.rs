//! Portfolio Analyzer
//!
//! Pure computation: priced holdings in, per-holding and aggregate metrics out.
//! Two passes, since allocations need the portfolio total.

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::model::{HoldingAnalysis, PortfolioAnalysis, PricedHolding};

/// Analyze priced holdings. `details` keeps the input order.
pub fn analyze(holdings: &[PricedHolding]) -> Result<PortfolioAnalysis, ValidationError> {
    let mut details = Vec::with_capacity(holdings.len());
    let mut total_invested = Decimal::ZERO;
    let mut total_current_value = Decimal::ZERO;

    for (index, priced) in holdings.iter().enumerate() {
        priced.validate().map_err(|e| e.at(index))?;
        let detail = analyze_holding(priced).map_err(|e| e.at(index))?;

        total_invested = total_invested
            .checked_add(detail.invested)
            .ok_or_else(|| overflow("purchase_price").at(index))?;
        total_current_value = total_current_value
            .checked_add(detail.current_value)
            .ok_or_else(|| overflow("current_price").at(index))?;

        details.push(detail);
    }

    for detail in &mut details {
        detail.allocation_percentage = percent_of(detail.current_value, total_current_value)
            .ok_or_else(|| overflow("current_price"))?;
    }

    let total_profit_loss = total_current_value - total_invested;
    let overall_return_percent = percent_of(total_profit_loss, total_invested)
        .ok_or_else(|| overflow("purchase_price"))?;

    tracing::debug!(
        holdings = details.len(),
        %total_invested,
        %total_current_value,
        "portfolio analyzed"
    );

    Ok(PortfolioAnalysis {
        total_invested,
        total_current_value,
        total_profit_loss,
        overall_return_percent,
        details,
    })
}

/// First-pass metrics; allocation is filled in once totals are known
fn analyze_holding(priced: &PricedHolding) -> Result<HoldingAnalysis, ValidationError> {
    let holding = &priced.holding;

    let invested = holding
        .purchase_price
        .checked_mul(holding.quantity)
        .ok_or_else(|| overflow("purchase_price"))?;
    let current_value = priced
        .current_price
        .checked_mul(holding.quantity)
        .ok_or_else(|| overflow("current_price"))?;
    let profit_loss = current_value - invested;

    // Guarded explicitly: a free position has no meaningful return
    let profit_loss_percent = if holding.purchase_price.is_zero() {
        Decimal::ZERO
    } else {
        (priced.current_price - holding.purchase_price)
            .checked_div(holding.purchase_price)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| overflow("current_price"))?
    };

    Ok(HoldingAnalysis {
        symbol: holding.symbol.clone(),
        quantity: holding.quantity,
        purchase_price: holding.purchase_price,
        current_price: priced.current_price,
        invested,
        current_value,
        profit_loss,
        profit_loss_percent,
        allocation_percentage: Decimal::ZERO,
    })
}

/// `part / whole × 100`, zero when `whole` is zero. `None` on overflow.
fn percent_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole.is_zero() {
        return Some(Decimal::ZERO);
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
}

fn overflow(field: &'static str) -> ValidationError {
    ValidationError::new(field, "value too large to compute")
}
