//! Aggregate statistics over an owner's simulations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::SimulationStatus;

/// Headline figures of one stored simulation, as read for statistics.
#[derive(Clone, Debug, PartialEq)]
pub struct StatRow {
    pub status: SimulationStatus,
    pub investment: Decimal,
    pub revenue: Decimal,
    pub roi_pct: Decimal,
}

/// Totals and ROI spread. All zero when there are no simulations.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub total_simulations: u64,
    pub total_investment: Decimal,
    pub total_revenue: Decimal,
    pub average_roi_pct: Decimal,
    pub max_roi_pct: Decimal,
    pub min_roi_pct: Decimal,
    pub by_status: BTreeMap<SimulationStatus, u64>,
}

impl SimulationStats {
    /// Fold rows into statistics.
    pub fn fold(rows: impl IntoIterator<Item = StatRow>) -> Self {
        let mut stats = SimulationStats::default();
        let mut roi_sum = Decimal::ZERO;
        let mut spread: Option<(Decimal, Decimal)> = None;
        for row in rows {
            stats.total_simulations += 1;
            stats.total_investment += row.investment;
            stats.total_revenue += row.revenue;
            roi_sum += row.roi_pct;
            spread = Some(match spread {
                None => (row.roi_pct, row.roi_pct),
                Some((lo, hi)) => (lo.min(row.roi_pct), hi.max(row.roi_pct)),
            });
            *stats.by_status.entry(row.status).or_insert(0) += 1;
        }
        if let Some((lo, hi)) = spread {
            stats.min_roi_pct = lo;
            stats.max_roi_pct = hi;
            stats.average_roi_pct = roi_sum / Decimal::from(stats.total_simulations);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn row(status: SimulationStatus, investment: Decimal, revenue: Decimal, roi: Decimal) -> StatRow {
        StatRow {
            status,
            investment,
            revenue,
            roi_pct: roi,
        }
    }

    #[test]
    fn empty_is_all_zero() {
        let s = SimulationStats::fold(Vec::new());
        assert_eq!(s, SimulationStats::default());
        assert_eq!(s.average_roi_pct, Decimal::ZERO);
    }

    #[test]
    fn totals_and_spread() {
        let s = SimulationStats::fold(vec![
            row(SimulationStatus::Draft, dec!(100), dec!(160), dec!(60)),
            row(SimulationStatus::Validated, dec!(200), dec!(180), dec!(-10)),
            row(SimulationStatus::Draft, dec!(50), dec!(90), dec!(80)),
        ]);
        assert_eq!(s.total_simulations, 3);
        assert_eq!(s.total_investment, dec!(350));
        assert_eq!(s.total_revenue, dec!(430));
        assert_eq!(s.average_roi_pct, dec!(130) / dec!(3));
        assert_eq!(s.max_roi_pct, dec!(80));
        assert_eq!(s.min_roi_pct, dec!(-10));
        assert_eq!(s.by_status.get(&SimulationStatus::Draft), Some(&2));
        assert_eq!(s.by_status.get(&SimulationStatus::Archived), None);
    }

    proptest! {
        #[test]
        fn average_between_min_and_max(rois in proptest::collection::vec(-500i64..500, 1..50)) {
            let rows = rois
                .iter()
                .map(|r| row(SimulationStatus::Draft, dec!(1), dec!(1), Decimal::from(*r)));
            let s = SimulationStats::fold(rows);
            prop_assert!(s.min_roi_pct <= s.average_roi_pct);
            prop_assert!(s.average_roi_pct <= s.max_roi_pct);
            prop_assert_eq!(s.total_simulations, rois.len() as u64);
        }
    }
}
