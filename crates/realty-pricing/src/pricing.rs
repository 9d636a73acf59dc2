//! Margin-tier price ladder per unit typology.

use realty_core::{Competitor, MarginTiers};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::rate;

/// Sell price of one unit at one margin tier, VAT included.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TierPrice {
    pub tier: String,
    pub margin_pct: Decimal,
    pub price: Decimal,
}

/// Price at one tier: margin applies to the pre-tax cost, then VAT is added
/// on the margin-inclusive amount.
///
/// Example:
/// price_for_tier(24 600 000, 60, 18) == 24 600 000 × 1.60 × 1.18 == 46 444 800
pub fn price_for_tier(cost_before_tax: Decimal, margin_pct: Decimal, vat_pct: Decimal) -> Decimal {
    cost_before_tax * (Decimal::ONE + rate(margin_pct)) * (Decimal::ONE + rate(vat_pct))
}

/// Prices for every tier, in tier order.
pub fn price_ladder(cost_before_tax: Decimal, tiers: &MarginTiers, vat_pct: Decimal) -> Vec<TierPrice> {
    tiers
        .iter()
        .map(|t| TierPrice {
            tier: t.id.clone(),
            margin_pct: t.margin_pct,
            price: price_for_tier(cost_before_tax, t.margin_pct, vat_pct),
        })
        .collect()
}

/// Market-based unit price: built area × mean competitor price per m² ×
/// the project's location coefficient. `None` without competitors.
pub fn benchmark_price(
    built_area: Decimal,
    competitors: &[Competitor],
    location_coefficient: Decimal,
) -> Option<Decimal> {
    if competitors.is_empty() {
        return None;
    }
    let total: Decimal = competitors.iter().map(|c| c.avg_price_per_area).sum();
    let mean = total / Decimal::from(competitors.len());
    Some(built_area * mean * location_coefficient)
}
