//! Revenue, net margin and ROI per margin tier.

use realty_core::MarginTiers;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::TypologyResult;

/// Whole-project figures when every unit sells at one tier.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TierRevenue {
    pub tier: String,
    pub margin_pct: Decimal,
    pub revenue: Decimal,
    /// Revenue minus aggregate investment.
    pub net_margin: Decimal,
    /// Net margin over investment, in percent. Zero when nothing is invested.
    pub roi_pct: Decimal,
}

/// ROI in percent; defined as zero for a non-positive investment.
pub fn roi(net_margin: Decimal, investment: Decimal) -> Decimal {
    if investment > Decimal::ZERO {
        net_margin / investment * dec!(100)
    } else {
        Decimal::ZERO
    }
}

/// Aggregate each tier's revenue over all typologies. `types` carry their
/// price ladders in the same order as `tiers`.
pub fn aggregate(tiers: &MarginTiers, types: &[TypologyResult], investment: Decimal) -> Vec<TierRevenue> {
    tiers
        .iter()
        .enumerate()
        .map(|(i, tier)| {
            let revenue: Decimal = types
                .iter()
                .map(|t| {
                    let price = t.prices.get(i).map(|p| p.price).unwrap_or_default();
                    price * Decimal::from(t.quantity)
                })
                .sum();
            let net_margin = revenue - investment;
            TierRevenue {
                tier: tier.id.clone(),
                margin_pct: tier.margin_pct,
                revenue,
                net_margin,
                roi_pct: roi(net_margin, investment),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roi_zero_investment_is_zero() {
        assert_eq!(roi(dec!(1000), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(roi(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(roi(dec!(-5), dec!(-10)), Decimal::ZERO);
    }

    #[test]
    fn roi_basic() {
        assert_eq!(roi(dec!(348_336_000), dec!(580_560_000)), dec!(60));
        assert_eq!(roi(dec!(-50), dec!(200)), dec!(-25));
    }
}
