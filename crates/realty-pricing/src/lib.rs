#![deny(warnings)]

//! Pricing engine for real-estate development projects.
//!
//! This crate is the single place where the financial formulas live. It
//! provides pure, deterministic helpers for:
//! - Cost build-up per unit typology (land, construction, surcharges, VAT)
//! - Margin-tier price ladders
//! - Revenue, net margin and ROI per tier
//! - Phased-sales allocation with price escalation
//! - Competitor benchmarking and qualitative analysis
//!
//! [`compute`] runs the whole pipeline over one input snapshot.

use realty_core::{validate_input, SimulationInput, ValidationError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub mod analysis;
pub mod benchmark;
pub mod cost;
pub mod phasing;
pub mod pricing;
pub mod revenue;

pub use analysis::{
    Advantage, CompetitiveAnalysis, LaunchPace, MarginOutlook, PriceStance, Weakness,
};
pub use benchmark::{BenchmarkReport, CompetitorComparison, PositioningBand};
pub use cost::CostBreakdown;
pub use phasing::{PhaseFigures, PhaseSplit, PhasingReport};
pub use pricing::TierPrice;
pub use revenue::TierRevenue;

/// Convert a percentage to a fraction.
pub(crate) fn rate(pct: Decimal) -> Decimal {
    pct / dec!(100)
}

/// Cost and price figures of one typology.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypologyResult {
    pub name: String,
    pub quantity: u32,
    pub built_area: Decimal,
    pub cost: CostBreakdown,
    /// One price per margin tier, in tier order.
    pub prices: Vec<TierPrice>,
    /// Price at the target tier; zero without tiers.
    pub target_price: Decimal,
    /// Market-based price, `None` without competitors.
    pub benchmark_price: Option<Decimal>,
}

/// Non-fatal findings about the input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Warning {
    /// Phase shares do not add up to 100 %; phase 3 still gets the remainder.
    PhasingUnreconciled { total_pct: Decimal },
    /// Typology left out of the price-per-m² benchmark.
    ZeroBuiltArea { typology: String },
}

/// Everything derived from one input snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationResults {
    pub typologies: Vec<TypologyResult>,
    /// Sum of every typology's total cost after tax.
    pub investment: Decimal,
    pub total_units: u64,
    pub tiers: Vec<TierRevenue>,
    /// Figures at the target tier.
    pub headline: TierRevenue,
    pub phasing: PhasingReport,
    pub benchmark: BenchmarkReport,
    pub analysis: CompetitiveAnalysis,
    pub warnings: Vec<Warning>,
}

/// Run the pricing pipeline. The input is assumed valid; numeric edge cases
/// (zero cost, zero investment, no competitors) never fail.
pub fn compute(input: &SimulationInput) -> SimulationResults {
    let project = &input.project;
    let target = input.margin_tiers.target_index();

    let typologies: Vec<TypologyResult> = input
        .typologies
        .iter()
        .map(|t| {
            let cost = cost::build_cost(project, t);
            let prices = pricing::price_ladder(cost.cost_before_tax, &input.margin_tiers, project.vat_pct);
            let target_price = target
                .and_then(|i| prices.get(i))
                .map(|p| p.price)
                .unwrap_or_default();
            TypologyResult {
                name: t.name.clone(),
                quantity: t.quantity,
                built_area: t.built_area,
                benchmark_price: pricing::benchmark_price(
                    t.built_area,
                    &input.competitors,
                    project.location_coefficient,
                ),
                cost,
                prices,
                target_price,
            }
        })
        .collect();

    let investment = cost::investment(typologies.iter().map(|t| &t.cost));
    let tiers = revenue::aggregate(&input.margin_tiers, &typologies, investment);
    let headline = target
        .and_then(|i| tiers.get(i))
        .cloned()
        .unwrap_or_default();

    let mut warnings = Vec::new();
    if !input.phasing.is_reconciled() {
        let total_pct = input.phasing.total_pct();
        warn!(%total_pct, "phase shares do not add up to 100; phase 3 takes the remainder");
        warnings.push(Warning::PhasingUnreconciled { total_pct });
    }
    for t in typologies.iter().filter(|t| t.built_area.is_zero()) {
        warnings.push(Warning::ZeroBuiltArea {
            typology: t.name.clone(),
        });
    }

    let phasing = phasing::allocate(&input.phasing, &typologies, investment);
    let benchmark = benchmark::compare(&typologies, &input.competitors);
    let analysis = analysis::analyze(input, &benchmark, headline.roi_pct);

    debug!(
        %investment,
        revenue = %headline.revenue,
        roi = %headline.roi_pct,
        types = typologies.len(),
        "simulation computed"
    );

    SimulationResults {
        total_units: input.total_units(),
        typologies,
        investment,
        tiers,
        headline,
        phasing,
        benchmark,
        analysis,
        warnings,
    }
}

/// Validate `input`, then [`compute`] it.
pub fn compute_checked(input: &SimulationInput) -> Result<SimulationResults, ValidationError> {
    validate_input(input)?;
    Ok(compute(input))
}
