//! Qualitative competitive analysis derived from the benchmark.

use realty_core::{LandTitle, SimulationInput, ZoneCategory};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::benchmark::BenchmarkReport;

/// Where the project price sits against the mean market price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceStance {
    /// Below 90 % of the market price.
    Discount,
    InLine,
    /// Above 110 % of the market price.
    Premium,
    /// No market or project price available.
    Unknown,
}

/// Margin health read from the headline ROI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginOutlook {
    /// ROI above 80 %.
    Exceptional,
    /// ROI above 50 %.
    Solid,
    NeedsReview,
}

impl MarginOutlook {
    pub fn from_roi(roi_pct: Decimal) -> Self {
        if roi_pct > dec!(80) {
            MarginOutlook::Exceptional
        } else if roi_pct > dec!(50) {
            MarginOutlook::Solid
        } else {
            MarginOutlook::NeedsReview
        }
    }
}

/// How hard the first sales phase pushes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchPace {
    /// At most 30 % of the units in phase 1.
    Prudent,
    Ambitious,
}

impl LaunchPace {
    pub fn from_phase1_pct(phase1_pct: Decimal) -> Self {
        if phase1_pct <= dec!(30) {
            LaunchPace::Prudent
        } else {
            LaunchPace::Ambitious
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Advantage {
    StrategicZone,
    SecureLandTitle { title: LandTitle },
    PriceAdvantage { discount_pct: Decimal },
    HighLocationCoefficient { coefficient: Decimal },
    /// No competitor sells a typology named like one of ours.
    DistinctTypology,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Weakness {
    /// More than 30 % above the market price.
    PriceAboveMarket { premium_pct: Decimal },
    LowAttractivenessZone { coefficient: Decimal },
    BetterLocatedCompetitors { names: Vec<String> },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompetitiveAnalysis {
    pub stance: PriceStance,
    pub margin_outlook: MarginOutlook,
    pub launch_pace: LaunchPace,
    pub advantages: Vec<Advantage>,
    pub weaknesses: Vec<Weakness>,
    /// Typology with the most units; first one wins a tie.
    pub dominant_typology: Option<String>,
}

/// Build the analysis for `input` given its benchmark and headline ROI.
pub fn analyze(
    input: &SimulationInput,
    benchmark: &BenchmarkReport,
    headline_roi_pct: Decimal,
) -> CompetitiveAnalysis {
    let project = &input.project;
    let prices = benchmark
        .project_price_per_area
        .zip(benchmark.market_price_per_area)
        .filter(|(_, market)| *market > Decimal::ZERO);

    let stance = match prices {
        Some((p, m)) if p < m * dec!(0.9) => PriceStance::Discount,
        Some((p, m)) if p > m * dec!(1.1) => PriceStance::Premium,
        Some(_) => PriceStance::InLine,
        None => PriceStance::Unknown,
    };

    let mut advantages = Vec::new();
    if project.zone == ZoneCategory::Strategic {
        advantages.push(Advantage::StrategicZone);
    }
    if project.land_title.is_secure() {
        advantages.push(Advantage::SecureLandTitle {
            title: project.land_title,
        });
    }
    if let (PriceStance::Discount, Some((p, m))) = (stance, prices) {
        advantages.push(Advantage::PriceAdvantage {
            discount_pct: (m - p) / m * dec!(100),
        });
    }
    if project.location_coefficient > dec!(1.2) {
        advantages.push(Advantage::HighLocationCoefficient {
            coefficient: project.location_coefficient,
        });
    }
    let declared: Vec<String> = input
        .competitors
        .iter()
        .filter_map(|c| c.typology.as_deref())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect();
    let overlaps = declared.iter().any(|theirs| {
        input
            .typologies
            .iter()
            .any(|ours| ours.name.to_lowercase().contains(theirs.as_str()))
    });
    if !declared.is_empty() && !overlaps {
        advantages.push(Advantage::DistinctTypology);
    }

    let mut weaknesses = Vec::new();
    if let Some((p, m)) = prices {
        if p > m * dec!(1.3) {
            weaknesses.push(Weakness::PriceAboveMarket {
                premium_pct: (p - m) / m * dec!(100),
            });
        }
    }
    if project.location_coefficient < Decimal::ONE {
        weaknesses.push(Weakness::LowAttractivenessZone {
            coefficient: project.location_coefficient,
        });
    }
    let better: Vec<String> = input
        .competitors
        .iter()
        .filter(|c| c.location_coefficient > project.location_coefficient)
        .map(|c| c.name.clone())
        .collect();
    if !better.is_empty() {
        weaknesses.push(Weakness::BetterLocatedCompetitors { names: better });
    }

    // max_by_key keeps the last maximum; scan in reverse so the first wins.
    let dominant_typology = input
        .typologies
        .iter()
        .rev()
        .max_by_key(|t| t.quantity)
        .map(|t| t.name.clone());

    CompetitiveAnalysis {
        stance,
        margin_outlook: MarginOutlook::from_roi(headline_roi_pct),
        launch_pace: LaunchPace::from_phase1_pct(input.phasing.phase1_pct),
        advantages,
        weaknesses,
        dominant_typology,
    }
}
