//! Competitor benchmark: project price per m² against market price points.

use realty_core::Competitor;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::TypologyResult;

/// Qualitative position of a price relative to the market.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositioningBand {
    Aggressive,
    Competitive,
    AtMarket,
    Premium,
    Luxury,
}

impl PositioningBand {
    /// Classify `project / market`. Bounds are exclusive upper bounds,
    /// checked in ascending order.
    pub fn classify(ratio: Decimal) -> Self {
        if ratio < dec!(0.85) {
            PositioningBand::Aggressive
        } else if ratio < dec!(0.95) {
            PositioningBand::Competitive
        } else if ratio < dec!(1.05) {
            PositioningBand::AtMarket
        } else if ratio < dec!(1.15) {
            PositioningBand::Premium
        } else {
            PositioningBand::Luxury
        }
    }

    /// Band of `project` against `market`; `None` when the market price is zero.
    pub fn of(project: Decimal, market: Decimal) -> Option<Self> {
        if market.is_zero() {
            return None;
        }
        Some(Self::classify(project / market))
    }
}

/// Project price against one competitor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompetitorComparison {
    pub name: String,
    pub location: String,
    pub competitor_price_per_area: Decimal,
    pub project_price_per_area: Decimal,
    /// (project − competitor) / competitor × 100. `None` for a zero competitor price.
    pub delta_pct: Option<Decimal>,
    pub band: Option<PositioningBand>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Unweighted mean of target price / built area over typologies.
    pub project_price_per_area: Option<Decimal>,
    /// Mean competitor price per m².
    pub market_price_per_area: Option<Decimal>,
    pub market_band: Option<PositioningBand>,
    pub comparisons: Vec<CompetitorComparison>,
}

/// Mean target price per built m². Typologies without built area are left out.
pub fn project_price_per_area(types: &[TypologyResult]) -> Option<Decimal> {
    let per_area: Vec<Decimal> = types
        .iter()
        .filter(|t| t.built_area > Decimal::ZERO)
        .map(|t| t.target_price / t.built_area)
        .collect();
    if per_area.is_empty() {
        return None;
    }
    let total: Decimal = per_area.iter().sum();
    Some(total / Decimal::from(per_area.len()))
}

/// Mean of the competitors' average prices per m².
pub fn market_price_per_area(competitors: &[Competitor]) -> Option<Decimal> {
    if competitors.is_empty() {
        return None;
    }
    let total: Decimal = competitors.iter().map(|c| c.avg_price_per_area).sum();
    Some(total / Decimal::from(competitors.len()))
}

/// Compare the project against every competitor.
pub fn compare(types: &[TypologyResult], competitors: &[Competitor]) -> BenchmarkReport {
    let project = project_price_per_area(types);
    let market = market_price_per_area(competitors);
    let Some(project) = project else {
        return BenchmarkReport {
            project_price_per_area: None,
            market_price_per_area: market,
            market_band: None,
            comparisons: Vec::new(),
        };
    };

    let comparisons = competitors
        .iter()
        .map(|c| {
            let price = c.avg_price_per_area;
            let delta_pct = if price.is_zero() {
                None
            } else {
                Some((project - price) / price * dec!(100))
            };
            CompetitorComparison {
                name: c.name.clone(),
                location: c.location.clone(),
                competitor_price_per_area: price,
                project_price_per_area: project,
                delta_pct,
                band: PositioningBand::of(project, price),
            }
        })
        .collect();

    BenchmarkReport {
        project_price_per_area: Some(project),
        market_price_per_area: market,
        market_band: market.and_then(|m| PositioningBand::of(project, m)),
        comparisons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::CostBreakdown;
    use realty_core::CompetitorPositioning;

    fn unit_type(built_area: Decimal, target_price: Decimal) -> TypologyResult {
        TypologyResult {
            name: "T".to_string(),
            quantity: 1,
            built_area,
            cost: CostBreakdown::default(),
            prices: vec![],
            target_price,
            benchmark_price: None,
        }
    }

    fn competitor(name: &str, price: Decimal) -> Competitor {
        Competitor {
            name: name.to_string(),
            location: "Somewhere".to_string(),
            typology: None,
            avg_price_per_area: price,
            positioning: CompetitorPositioning::Standard,
            location_coefficient: Decimal::ONE,
        }
    }

    #[test]
    fn band_boundaries_are_exclusive() {
        assert_eq!(PositioningBand::classify(dec!(0.8499)), PositioningBand::Aggressive);
        assert_eq!(PositioningBand::classify(dec!(0.85)), PositioningBand::Competitive);
        assert_eq!(PositioningBand::classify(dec!(0.95)), PositioningBand::AtMarket);
        assert_eq!(PositioningBand::classify(dec!(1.00)), PositioningBand::AtMarket);
        assert_eq!(PositioningBand::classify(dec!(1.05)), PositioningBand::Premium);
        assert_eq!(PositioningBand::classify(dec!(1.15)), PositioningBand::Luxury);
    }

    #[test]
    fn ratio_of_exactly_085_is_competitive() {
        let report = compare(&[unit_type(dec!(1), dec!(850))], &[competitor("M", dec!(1000))]);
        assert_eq!(report.comparisons[0].band, Some(PositioningBand::Competitive));
        assert_eq!(report.comparisons[0].delta_pct, Some(dec!(-15)));
    }

    #[test]
    fn unweighted_mean_over_types() {
        let types = [unit_type(dec!(60), dec!(46_444_800)), unit_type(dec!(100), dec!(50_000_000))];
        // 774 080 and 500 000 per m².
        assert_eq!(project_price_per_area(&types), Some(dec!(637_040)));
    }

    #[test]
    fn deltas_against_each_competitor() {
        let types = [unit_type(dec!(60), dec!(46_444_800))];
        let comps = [competitor("Same", dec!(774_080)), competitor("Dear", dec!(967_600))];
        let report = compare(&types, &comps);
        assert_eq!(report.project_price_per_area, Some(dec!(774_080)));
        assert_eq!(report.comparisons[0].delta_pct, Some(Decimal::ZERO));
        assert_eq!(report.comparisons[0].band, Some(PositioningBand::AtMarket));
        assert_eq!(report.comparisons[1].delta_pct, Some(dec!(-20)));
        assert_eq!(report.comparisons[1].band, Some(PositioningBand::Aggressive));
        assert_eq!(report.market_price_per_area, Some(dec!(870_840)));
        assert_eq!(report.market_band, Some(PositioningBand::Competitive));
    }

    #[test]
    fn no_competitors_no_comparison() {
        let report = compare(&[unit_type(dec!(60), dec!(1000))], &[]);
        assert!(report.comparisons.is_empty());
        assert_eq!(report.market_price_per_area, None);
        assert_eq!(report.market_band, None);
        assert!(report.project_price_per_area.is_some());
    }

    #[test]
    fn zero_price_competitor_has_no_delta() {
        let report = compare(&[unit_type(dec!(10), dec!(1000))], &[competitor("Free", Decimal::ZERO)]);
        assert_eq!(report.comparisons[0].delta_pct, None);
        assert_eq!(report.comparisons[0].band, None);
        assert_eq!(report.market_band, None);
    }

    #[test]
    fn zero_built_area_is_left_out() {
        let types = [unit_type(Decimal::ZERO, dec!(1000)), unit_type(dec!(10), dec!(1000))];
        assert_eq!(project_price_per_area(&types), Some(dec!(100)));
        let report = compare(&[unit_type(Decimal::ZERO, dec!(1000))], &[competitor("C", dec!(5))]);
        assert_eq!(report.project_price_per_area, None);
        assert!(report.comparisons.is_empty());
    }
}
