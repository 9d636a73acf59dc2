//! Phased-sales allocation.
//!
//! Each typology's units are split over three sequential sales phases. Phase
//! 1 and 2 counts are rounded shares of the quantity; phase 3 takes whatever
//! is left so the three counts always add up to the quantity. Phase 1 sells
//! at the target price, phases 2 and 3 at escalated prices.

use realty_core::PhasingPlan;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::revenue::roi;
use crate::{rate, TypologyResult};

/// Units of one typology sold in each phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseSplit {
    pub typology: String,
    pub units: [u32; 3],
}

/// Figures for one phase plus running totals up to and including it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseFigures {
    /// 1-based phase number.
    pub phase: u8,
    pub units: u64,
    pub revenue: Decimal,
    /// Units × investment per unit.
    pub cost: Decimal,
    pub cumulative_revenue: Decimal,
    pub cumulative_cost: Decimal,
    /// Cumulative revenue minus cumulative cost.
    pub cumulative_margin: Decimal,
    /// Cumulative margin over cumulative cost, in percent. Zero before any cost.
    pub cumulative_roi_pct: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PhasingReport {
    pub splits: Vec<PhaseSplit>,
    pub phases: Vec<PhaseFigures>,
    /// Aggregate investment divided by total units.
    pub cost_per_unit: Decimal,
    /// Sum of the stated phase percentages.
    pub stated_total_pct: Decimal,
}

fn rounded_share(quantity: u32, pct: Decimal) -> u32 {
    (Decimal::from(quantity) * rate(pct))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0)
}

/// Split `quantity` into phase counts.
///
/// Example:
/// quantity 7 at 30 % / 35 % gives [2, 2, 3]: phase 3 receives the remainder,
/// not its own rounded share.
pub fn split_units(quantity: u32, plan: &PhasingPlan) -> [u32; 3] {
    let phase1 = rounded_share(quantity, plan.phase1_pct).min(quantity);
    let phase2 = rounded_share(quantity, plan.phase2_pct).min(quantity - phase1);
    [phase1, phase2, quantity - phase1 - phase2]
}

/// Allocate every typology over the three phases and build the phase series.
pub fn allocate(plan: &PhasingPlan, types: &[TypologyResult], investment: Decimal) -> PhasingReport {
    let total_units: u64 = types.iter().map(|t| u64::from(t.quantity)).sum();
    let cost_per_unit = if total_units > 0 {
        investment / Decimal::from(total_units)
    } else {
        Decimal::ZERO
    };
    let escalation = [
        Decimal::ONE,
        Decimal::ONE + rate(plan.phase2_increase_pct),
        Decimal::ONE + rate(plan.phase3_increase_pct),
    ];

    let mut units = [0u64; 3];
    let mut revenue = [Decimal::ZERO; 3];
    let mut splits = Vec::with_capacity(types.len());
    for t in types {
        let split = split_units(t.quantity, plan);
        for phase in 0..3 {
            units[phase] += u64::from(split[phase]);
            revenue[phase] += Decimal::from(split[phase]) * t.target_price * escalation[phase];
        }
        splits.push(PhaseSplit {
            typology: t.name.clone(),
            units: split,
        });
    }

    let mut phases = Vec::with_capacity(3);
    let mut cumulative_revenue = Decimal::ZERO;
    let mut cumulative_cost = Decimal::ZERO;
    for phase in 0..3 {
        let cost = Decimal::from(units[phase]) * cost_per_unit;
        cumulative_revenue += revenue[phase];
        cumulative_cost += cost;
        let cumulative_margin = cumulative_revenue - cumulative_cost;
        phases.push(PhaseFigures {
            phase: phase as u8 + 1,
            units: units[phase],
            revenue: revenue[phase],
            cost,
            cumulative_revenue,
            cumulative_cost,
            cumulative_margin,
            cumulative_roi_pct: roi(cumulative_margin, cumulative_cost),
        });
    }

    PhasingReport {
        splits,
        phases,
        cost_per_unit,
        stated_total_pct: plan.total_pct(),
    }
}
