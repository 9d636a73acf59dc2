//! Cost build-up per unit typology.

use realty_core::{ProjectParams, UnitTypology};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::rate;

/// Per-unit and per-type cost of one typology.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Land area × land cost per m².
    pub land_cost: Decimal,
    /// Built area × construction cost per m².
    pub construction_cost: Decimal,
    pub base_cost: Decimal,
    /// Site development, studies and financing surcharges on the base cost.
    pub surcharge_amount: Decimal,
    pub cost_before_tax: Decimal,
    pub cost_after_tax: Decimal,
    /// Cost after tax × quantity.
    pub total_cost: Decimal,
}

/// Build the cost of one typology under the project's rates.
///
/// Example:
/// 100 m² of land at 25 000/m² plus 60 m² built at 300 000/m² with 20 %
/// surcharges and 18 % VAT gives a pre-tax unit cost of 24 600 000.
pub fn build_cost(project: &ProjectParams, typology: &UnitTypology) -> CostBreakdown {
    let land_cost = typology.land_area * project.land_cost_per_area;
    let construction_cost = typology.built_area * typology.construction_cost_per_area;
    let base_cost = land_cost + construction_cost;
    let surcharge_amount = base_cost * rate(project.surcharge_pct());
    let cost_before_tax = base_cost + surcharge_amount;
    let cost_after_tax = cost_before_tax * (Decimal::ONE + rate(project.vat_pct));
    CostBreakdown {
        land_cost,
        construction_cost,
        base_cost,
        surcharge_amount,
        cost_before_tax,
        cost_after_tax,
        total_cost: cost_after_tax * Decimal::from(typology.quantity),
    }
}

/// Aggregate investment: sum of every typology's total cost.
pub fn investment<'a>(costs: impl IntoIterator<Item = &'a CostBreakdown>) -> Decimal {
    costs.into_iter().map(|c| c.total_cost).sum()
}
