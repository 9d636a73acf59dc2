#![deny(warnings)]

//! Core domain models and invariants for the real-estate pricing simulator.
//!
//! This crate defines the serializable input snapshot consumed by the pricing
//! engine (project parameters, unit typologies, margin tiers, phasing plan and
//! competitors) together with validation helpers that guarantee the basic
//! invariants the engine relies on.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

pub mod edit;

pub use edit::{apply, EditError, FieldChange};

/// Id of the tier used for headline revenue, phasing and benchmarking.
pub const TARGET_TIER: &str = "target";

/// Zone category of the project site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneCategory {
    /// Major infrastructure nearby.
    Strategic,
    /// High-attractiveness neighbourhood.
    Premium,
    /// Established urban area.
    #[default]
    Standard,
    /// Developing area.
    Economic,
}

impl ZoneCategory {
    /// Location coefficient applied when the zone is picked without an explicit value.
    pub fn default_coefficient(self) -> Decimal {
        match self {
            ZoneCategory::Strategic => dec!(1.5),
            ZoneCategory::Premium => dec!(1.25),
            ZoneCategory::Standard => dec!(1.0),
            ZoneCategory::Economic => dec!(0.8),
        }
    }
}

/// Legal status of the land. Informational only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandTitle {
    /// Definitive concession certificate.
    #[default]
    Acd,
    /// Occupancy permit.
    Permit,
    /// Long-term lease.
    Lease,
    /// Registered land title.
    Title,
}

impl LandTitle {
    /// Whether the title grants full, definitive ownership.
    pub fn is_secure(self) -> bool {
        matches!(self, LandTitle::Acd | LandTitle::Title)
    }
}

/// Project-level parameters, immutable for one calculation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectParams {
    /// Project name.
    pub name: String,
    /// Human-readable site location.
    pub location: String,
    /// Total land area in m².
    pub total_land_area: Decimal,
    /// Land cost per m².
    pub land_cost_per_area: Decimal,
    #[serde(default)]
    pub land_title: LandTitle,
    #[serde(default)]
    pub zone: ZoneCategory,
    /// Value multiplier of the site (> 0).
    #[serde(default = "default_coefficient")]
    pub location_coefficient: Decimal,
    /// Site development (roads, networks) surcharge in percent.
    #[serde(default = "default_site_development_pct")]
    pub site_development_pct: Decimal,
    /// Design and studies surcharge in percent.
    #[serde(default = "default_studies_pct")]
    pub studies_pct: Decimal,
    /// Financing surcharge in percent.
    #[serde(default = "default_financing_pct")]
    pub financing_pct: Decimal,
    /// VAT rate in percent.
    #[serde(default = "default_vat_pct")]
    pub vat_pct: Decimal,
}

fn default_coefficient() -> Decimal {
    Decimal::ONE
}

fn default_site_development_pct() -> Decimal {
    dec!(10)
}

fn default_studies_pct() -> Decimal {
    dec!(7)
}

fn default_financing_pct() -> Decimal {
    dec!(3)
}

fn default_vat_pct() -> Decimal {
    dec!(18)
}

impl ProjectParams {
    /// New project with default surcharges, VAT and the zone's default coefficient.
    pub fn new(name: impl Into<String>, location: impl Into<String>, zone: ZoneCategory) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            total_land_area: Decimal::ZERO,
            land_cost_per_area: Decimal::ZERO,
            land_title: LandTitle::default(),
            zone,
            location_coefficient: zone.default_coefficient(),
            site_development_pct: default_site_development_pct(),
            studies_pct: default_studies_pct(),
            financing_pct: default_financing_pct(),
            vat_pct: default_vat_pct(),
        }
    }

    /// Sum of the three surcharge percentages.
    pub fn surcharge_pct(&self) -> Decimal {
        self.site_development_pct + self.studies_pct + self.financing_pct
    }
}

/// A distinct unit design and the number of units built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitTypology {
    /// Display name, e.g. "Villa Duplex 4P".
    pub name: String,
    /// Land area per unit in m².
    pub land_area: Decimal,
    /// Built area per unit in m².
    pub built_area: Decimal,
    /// Construction cost per built m².
    pub construction_cost_per_area: Decimal,
    /// Units built (>= 1).
    pub quantity: u32,
}

/// A named margin bucket.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarginTier {
    pub id: String,
    /// Margin in percent applied to the pre-tax cost.
    pub margin_pct: Decimal,
}

impl MarginTier {
    pub fn new(id: impl Into<String>, margin_pct: Decimal) -> Self {
        Self {
            id: id.into(),
            margin_pct,
        }
    }
}

/// Ordered set of margin tiers. Insertion order is the reporting order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarginTiers(pub Vec<MarginTier>);

impl MarginTiers {
    /// Iterate tiers in reporting order.
    pub fn iter(&self) -> std::slice::Iter<'_, MarginTier> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a tier by id.
    pub fn get(&self, id: &str) -> Option<&MarginTier> {
        self.0.iter().find(|t| t.id == id)
    }

    /// Index of the target tier: the tier named `target`, else the second
    /// tier, else the first. `None` only for an empty set.
    pub fn target_index(&self) -> Option<usize> {
        if self.0.is_empty() {
            return None;
        }
        let by_id = self.0.iter().position(|t| t.id == TARGET_TIER);
        Some(by_id.unwrap_or(if self.0.len() > 1 { 1 } else { 0 }))
    }

    /// The target tier, see [`MarginTiers::target_index`].
    pub fn target(&self) -> Option<&MarginTier> {
        self.target_index().map(|i| &self.0[i])
    }

    /// Set the margin of an existing tier, or append a new tier.
    pub fn set(&mut self, id: &str, margin_pct: Decimal) {
        match self.0.iter_mut().find(|t| t.id == id) {
            Some(tier) => tier.margin_pct = margin_pct,
            None => self.0.push(MarginTier::new(id, margin_pct)),
        }
    }

    fn ladder(margins: [Decimal; 4]) -> Self {
        let ids = ["penetration", TARGET_TIER, "premium", "premium_plus"];
        Self(
            ids.iter()
                .zip(margins)
                .map(|(id, pct)| MarginTier::new(*id, pct))
                .collect(),
        )
    }
}

impl Default for MarginTiers {
    /// Penetration 30 %, target 60 %, premium 80 %, premium-plus 100 %.
    fn default() -> Self {
        Self::ladder([dec!(30), dec!(60), dec!(80), dec!(100)])
    }
}

/// Ready-made margin ladders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginPreset {
    Conservative,
    Balanced,
    Aggressive,
}

impl MarginPreset {
    pub fn tiers(self) -> MarginTiers {
        match self {
            MarginPreset::Conservative => {
                MarginTiers::ladder([dec!(15), dec!(25), dec!(35), dec!(45)])
            }
            MarginPreset::Balanced => MarginTiers::ladder([dec!(30), dec!(50), dec!(70), dec!(90)]),
            MarginPreset::Aggressive => {
                MarginTiers::ladder([dec!(40), dec!(60), dec!(80), dec!(100)])
            }
        }
    }
}

/// Split of unit sales into three sequential phases.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhasingPlan {
    /// Share of each typology's units sold in phase 1, in percent.
    pub phase1_pct: Decimal,
    pub phase2_pct: Decimal,
    /// Stated phase 3 share. Phase 3 actually receives the unit remainder.
    pub phase3_pct: Decimal,
    /// Price escalation over the target price in phase 2, in percent.
    pub phase2_increase_pct: Decimal,
    pub phase3_increase_pct: Decimal,
}

impl PhasingPlan {
    /// Sum of the three stated phase percentages.
    pub fn total_pct(&self) -> Decimal {
        self.phase1_pct + self.phase2_pct + self.phase3_pct
    }

    /// Whether the stated percentages add up to exactly 100.
    pub fn is_reconciled(&self) -> bool {
        self.total_pct() == dec!(100)
    }
}

impl Default for PhasingPlan {
    fn default() -> Self {
        Self {
            phase1_pct: dec!(30),
            phase2_pct: dec!(35),
            phase3_pct: dec!(35),
            phase2_increase_pct: dec!(5),
            phase3_increase_pct: dec!(10),
        }
    }
}

/// Qualitative market segment declared for a competitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitorPositioning {
    Economic,
    #[default]
    Standard,
    Premium,
}

/// A competing project used as a price reference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    pub location: String,
    /// Typologies the competitor sells, free text (e.g. "Villas Duplex 4-5P").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typology: Option<String>,
    /// Average selling price per built m².
    pub avg_price_per_area: Decimal,
    #[serde(default)]
    pub positioning: CompetitorPositioning,
    #[serde(default = "default_coefficient")]
    pub location_coefficient: Decimal,
}

/// Complete input snapshot for one engine run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationInput {
    pub project: ProjectParams,
    pub typologies: Vec<UnitTypology>,
    #[serde(default)]
    pub margin_tiers: MarginTiers,
    #[serde(default)]
    pub phasing: PhasingPlan,
    #[serde(default)]
    pub competitors: Vec<Competitor>,
}

impl SimulationInput {
    /// Sum of unit quantities over all typologies.
    pub fn total_units(&self) -> u64 {
        self.typologies.iter().map(|t| u64::from(t.quantity)).sum()
    }
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required text field is blank.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    /// At least one unit typology is required.
    #[error("at least one unit typology is required")]
    NoTypologies,
    /// Typology quantity must be at least one.
    #[error("typology '{0}' must have a quantity of at least 1")]
    ZeroQuantity(String),
    /// Amounts, areas and rates must be non-negative.
    #[error("{0} must not be negative")]
    Negative(&'static str),
    /// Location coefficients must be strictly positive.
    #[error("{0} must be > 0")]
    NonPositiveCoefficient(&'static str),
    /// A phase share is outside [0, 100].
    #[error("{0} must be within [0, 100]")]
    PercentOutOfRange(&'static str),
    /// At least one margin tier is required.
    #[error("at least one margin tier is required")]
    NoMarginTiers,
    /// Tier ids must be unique.
    #[error("duplicate margin tier: {0}")]
    DuplicateTier(String),
    /// A magnitude the engine cannot carry through its arithmetic.
    #[error("{0} is out of range")]
    OutOfRange(&'static str),
}

/// Largest land or built area of one unit, and of the whole project, in m².
pub const MAX_AREA: Decimal = dec!(1_000_000);
/// Smallest non-zero built area in m²; prices are divided by it.
pub const MIN_BUILT_AREA: Decimal = dec!(0.01);
/// Largest land, construction or competitor price per m².
pub const MAX_PRICE_PER_AREA: Decimal = dec!(10_000_000_000);
/// Smallest non-zero competitor price per m²; project prices are divided by it.
pub const MIN_COMPETITOR_PRICE: Decimal = Decimal::ONE;
/// Largest surcharge, VAT, margin or price increase, in percent.
pub const MAX_RATE_PCT: Decimal = dec!(1000);
/// Largest location coefficient.
pub const MAX_COEFFICIENT: Decimal = dec!(100);
/// Largest number of units over all typologies.
pub const MAX_TOTAL_UNITS: u64 = 1_000_000;
/// Largest number of competitors; bounds how far zero prices can pull the market mean down.
pub const MAX_COMPETITORS: usize = 1_000;

fn non_negative(value: Decimal, field: &'static str) -> Result<(), ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::Negative(field));
    }
    Ok(())
}

/// Non-negative and at most `max`.
fn bounded(value: Decimal, max: Decimal, field: &'static str) -> Result<(), ValidationError> {
    non_negative(value, field)?;
    if value > max {
        return Err(ValidationError::OutOfRange(field));
    }
    Ok(())
}

/// Zero, or within `[min, max]`.
fn zero_or_within(
    value: Decimal,
    min: Decimal,
    max: Decimal,
    field: &'static str,
) -> Result<(), ValidationError> {
    bounded(value, max, field)?;
    if !value.is_zero() && value < min {
        return Err(ValidationError::OutOfRange(field));
    }
    Ok(())
}

fn coefficient(value: Decimal, field: &'static str) -> Result<(), ValidationError> {
    if value <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveCoefficient(field));
    }
    if value > MAX_COEFFICIENT {
        return Err(ValidationError::OutOfRange(field));
    }
    Ok(())
}

fn percent(value: Decimal, field: &'static str) -> Result<(), ValidationError> {
    if value < Decimal::ZERO || value > dec!(100) {
        return Err(ValidationError::PercentOutOfRange(field));
    }
    Ok(())
}

/// Validate project parameters.
pub fn validate_project(p: &ProjectParams) -> Result<(), ValidationError> {
    if p.name.trim().is_empty() {
        return Err(ValidationError::EmptyField("project name"));
    }
    if p.location.trim().is_empty() {
        return Err(ValidationError::EmptyField("project location"));
    }
    bounded(p.total_land_area, MAX_AREA, "total land area")?;
    bounded(p.land_cost_per_area, MAX_PRICE_PER_AREA, "land cost per area")?;
    bounded(p.site_development_pct, MAX_RATE_PCT, "site development surcharge")?;
    bounded(p.studies_pct, MAX_RATE_PCT, "studies surcharge")?;
    bounded(p.financing_pct, MAX_RATE_PCT, "financing surcharge")?;
    bounded(p.vat_pct, MAX_RATE_PCT, "VAT rate")?;
    coefficient(p.location_coefficient, "location coefficient")
}

/// Validate one unit typology.
pub fn validate_typology(t: &UnitTypology) -> Result<(), ValidationError> {
    if t.name.trim().is_empty() {
        return Err(ValidationError::EmptyField("typology name"));
    }
    if t.quantity == 0 {
        return Err(ValidationError::ZeroQuantity(t.name.clone()));
    }
    bounded(t.land_area, MAX_AREA, "typology land area")?;
    zero_or_within(t.built_area, MIN_BUILT_AREA, MAX_AREA, "typology built area")?;
    bounded(
        t.construction_cost_per_area,
        MAX_PRICE_PER_AREA,
        "construction cost per area",
    )?;
    Ok(())
}

/// Validate the margin tier set.
pub fn validate_margin_tiers(tiers: &MarginTiers) -> Result<(), ValidationError> {
    if tiers.is_empty() {
        return Err(ValidationError::NoMarginTiers);
    }
    let mut seen = BTreeSet::new();
    for tier in tiers.iter() {
        if tier.id.trim().is_empty() {
            return Err(ValidationError::EmptyField("margin tier id"));
        }
        if !seen.insert(tier.id.as_str()) {
            return Err(ValidationError::DuplicateTier(tier.id.clone()));
        }
        bounded(tier.margin_pct, MAX_RATE_PCT, "margin percentage")?;
    }
    Ok(())
}

/// Validate a phasing plan. The sum of the shares is not checked here;
/// the engine reports a mismatch as a warning.
pub fn validate_phasing(p: &PhasingPlan) -> Result<(), ValidationError> {
    percent(p.phase1_pct, "phase 1 share")?;
    percent(p.phase2_pct, "phase 2 share")?;
    percent(p.phase3_pct, "phase 3 share")?;
    bounded(p.phase2_increase_pct, MAX_RATE_PCT, "phase 2 price increase")?;
    bounded(p.phase3_increase_pct, MAX_RATE_PCT, "phase 3 price increase")?;
    Ok(())
}

/// Validate a competitor entry.
pub fn validate_competitor(c: &Competitor) -> Result<(), ValidationError> {
    if c.name.trim().is_empty() {
        return Err(ValidationError::EmptyField("competitor name"));
    }
    zero_or_within(
        c.avg_price_per_area,
        MIN_COMPETITOR_PRICE,
        MAX_PRICE_PER_AREA,
        "competitor price per area",
    )?;
    coefficient(c.location_coefficient, "competitor location coefficient")
}

/// Validate a full input snapshot.
pub fn validate_input(input: &SimulationInput) -> Result<(), ValidationError> {
    validate_project(&input.project)?;
    if input.typologies.is_empty() {
        return Err(ValidationError::NoTypologies);
    }
    for t in &input.typologies {
        validate_typology(t)?;
    }
    if input.total_units() > MAX_TOTAL_UNITS {
        return Err(ValidationError::OutOfRange("total unit count"));
    }
    validate_margin_tiers(&input.margin_tiers)?;
    validate_phasing(&input.phasing)?;
    if input.competitors.len() > MAX_COMPETITORS {
        return Err(ValidationError::OutOfRange("competitor count"));
    }
    for c in &input.competitors {
        validate_competitor(c)?;
    }
    Ok(())
}

/// Built-in demonstration scenario: five villa typologies on a strategic site
/// benchmarked against three competitors.
pub fn demo_input() -> SimulationInput {
    let villa = |name: &str, land: Decimal, built: Decimal, cost: Decimal, quantity: u32| {
        UnitTypology {
            name: name.to_string(),
            land_area: land,
            built_area: built,
            construction_cost_per_area: cost,
            quantity,
        }
    };
    let mut project = ProjectParams::new("Riverside Villas", "Lagoon East", ZoneCategory::Strategic);
    project.total_land_area = dec!(10000);
    project.land_cost_per_area = dec!(25000);

    SimulationInput {
        project,
        typologies: vec![
            villa("Villa 3P", dec!(100), dec!(60), dec!(300000), 20),
            villa("Villa 4P", dec!(150), dec!(80), dec!(300000), 30),
            villa("Villa Duplex 4P", dec!(200), dec!(125), dec!(350000), 40),
            villa("Villa Duplex 5P", dec!(250), dec!(160), dec!(380000), 30),
            villa("Villa Triplex 8P", dec!(350), dec!(280), dec!(425000), 10),
        ],
        margin_tiers: MarginTiers::default(),
        phasing: PhasingPlan::default(),
        competitors: vec![
            Competitor {
                name: "Northgate Homes".to_string(),
                location: "PK24".to_string(),
                typology: Some("Villas 3-4P".to_string()),
                avg_price_per_area: dec!(463000),
                positioning: CompetitorPositioning::Economic,
                location_coefficient: dec!(1.0),
            },
            Competitor {
                name: "Coastline Builders".to_string(),
                location: "Old Harbour".to_string(),
                typology: Some("Duplex 4-5P".to_string()),
                avg_price_per_area: dec!(461500),
                positioning: CompetitorPositioning::Standard,
                location_coefficient: dec!(1.25),
            },
            Competitor {
                name: "Summit Estates".to_string(),
                location: "Old Harbour".to_string(),
                typology: Some("Triplex 6-8P".to_string()),
                avg_price_per_area: dec!(700000),
                positioning: CompetitorPositioning::Premium,
                location_coefficient: dec!(1.25),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn demo_input_is_valid() {
        validate_input(&demo_input()).unwrap();
        assert_eq!(demo_input().total_units(), 130);
    }

    #[test]
    fn zone_default_coefficients() {
        assert_eq!(ZoneCategory::Strategic.default_coefficient(), dec!(1.5));
        assert_eq!(ZoneCategory::Premium.default_coefficient(), dec!(1.25));
        assert_eq!(ZoneCategory::Standard.default_coefficient(), dec!(1));
        assert_eq!(ZoneCategory::Economic.default_coefficient(), dec!(0.8));
    }

    #[test]
    fn target_tier_lookup() {
        let tiers = MarginTiers::default();
        assert_eq!(tiers.target_index(), Some(1));
        assert_eq!(tiers.target().unwrap().margin_pct, dec!(60));

        // Without a "target" id the second tier stands in.
        let levels = MarginTiers(vec![
            MarginTier::new("level1", dec!(20)),
            MarginTier::new("level2", dec!(45)),
            MarginTier::new("level3", dec!(70)),
        ]);
        assert_eq!(levels.target().unwrap().id, "level2");

        let single = MarginTiers(vec![MarginTier::new("only", dec!(10))]);
        assert_eq!(single.target_index(), Some(0));
        assert_eq!(MarginTiers(vec![]).target_index(), None);
    }

    #[test]
    fn tier_set_updates_or_appends() {
        let mut tiers = MarginTiers::default();
        tiers.set(TARGET_TIER, dec!(55));
        assert_eq!(tiers.get(TARGET_TIER).unwrap().margin_pct, dec!(55));
        tiers.set("ultra", dec!(150));
        assert_eq!(tiers.len(), 5);
        assert_eq!(tiers.0.last().unwrap().id, "ultra");
    }

    #[test]
    fn presets_keep_target_second() {
        let t = MarginPreset::Conservative.tiers();
        assert_eq!(t.target().unwrap().margin_pct, dec!(25));
        assert_eq!(MarginPreset::Balanced.tiers().get("premium_plus").unwrap().margin_pct, dec!(90));
        assert_eq!(MarginPreset::Aggressive.tiers().get("penetration").unwrap().margin_pct, dec!(40));
    }

    #[test]
    fn rejects_structural_problems() {
        let mut input = demo_input();
        input.typologies.clear();
        assert_eq!(validate_input(&input), Err(ValidationError::NoTypologies));

        let mut input = demo_input();
        input.typologies[2].quantity = 0;
        assert_eq!(
            validate_input(&input),
            Err(ValidationError::ZeroQuantity("Villa Duplex 4P".to_string()))
        );

        let mut input = demo_input();
        input.project.name = "  ".to_string();
        assert_eq!(
            validate_input(&input),
            Err(ValidationError::EmptyField("project name"))
        );

        let mut input = demo_input();
        input.project.vat_pct = dec!(-1);
        assert_eq!(validate_input(&input), Err(ValidationError::Negative("VAT rate")));

        let mut input = demo_input();
        input.margin_tiers.0.push(MarginTier::new("premium", dec!(90)));
        assert_eq!(
            validate_input(&input),
            Err(ValidationError::DuplicateTier("premium".to_string()))
        );

        let mut input = demo_input();
        input.phasing.phase2_pct = dec!(120);
        assert_eq!(
            validate_input(&input),
            Err(ValidationError::PercentOutOfRange("phase 2 share"))
        );

        let mut input = demo_input();
        input.competitors[0].location_coefficient = Decimal::ZERO;
        assert!(matches!(
            validate_input(&input),
            Err(ValidationError::NonPositiveCoefficient(_))
        ));
    }

    #[test]
    fn unreconciled_phasing_is_still_valid() {
        let mut input = demo_input();
        input.phasing.phase3_pct = dec!(50);
        assert!(!input.phasing.is_reconciled());
        assert_eq!(input.phasing.total_pct(), dec!(115));
        validate_input(&input).unwrap();
    }

    #[test]
    fn empty_competitor_list_is_valid() {
        let mut input = demo_input();
        input.competitors.clear();
        validate_input(&input).unwrap();
    }

    #[test]
    fn rejects_magnitudes_beyond_engine_range() {
        let mut input = demo_input();
        input.typologies[0].construction_cost_per_area = Decimal::from_i128_with_scale(10i128.pow(28), 0);
        input.typologies[0].built_area = dec!(1000);
        assert_eq!(
            validate_input(&input),
            Err(ValidationError::OutOfRange("construction cost per area"))
        );

        let mut input = demo_input();
        input.typologies[0].built_area = dec!(0.001);
        assert_eq!(
            validate_input(&input),
            Err(ValidationError::OutOfRange("typology built area"))
        );

        let mut input = demo_input();
        input.competitors[0].avg_price_per_area = dec!(0.5);
        assert_eq!(
            validate_input(&input),
            Err(ValidationError::OutOfRange("competitor price per area"))
        );

        let mut input = demo_input();
        input.project.location_coefficient = dec!(101);
        assert_eq!(
            validate_input(&input),
            Err(ValidationError::OutOfRange("location coefficient"))
        );

        let mut input = demo_input();
        input.margin_tiers.set(TARGET_TIER, dec!(1001));
        assert_eq!(
            validate_input(&input),
            Err(ValidationError::OutOfRange("margin percentage"))
        );

        let mut input = demo_input();
        input.typologies[0].quantity = 999_990;
        assert_eq!(
            validate_input(&input),
            Err(ValidationError::OutOfRange("total unit count"))
        );

        let mut input = demo_input();
        let extra = input.competitors[0].clone();
        input.competitors.resize(MAX_COMPETITORS + 1, extra);
        assert_eq!(
            validate_input(&input),
            Err(ValidationError::OutOfRange("competitor count"))
        );
    }

    #[test]
    fn limits_themselves_are_valid() {
        let mut input = demo_input();
        input.project.land_cost_per_area = MAX_PRICE_PER_AREA;
        input.project.vat_pct = MAX_RATE_PCT;
        input.project.location_coefficient = MAX_COEFFICIENT;
        input.typologies[0].built_area = MIN_BUILT_AREA;
        input.typologies[1].land_area = MAX_AREA;
        input.competitors[0].avg_price_per_area = MIN_COMPETITOR_PRICE;
        input.competitors[1].avg_price_per_area = Decimal::ZERO;
        validate_input(&input).unwrap();
    }

    #[test]
    fn yaml_snapshot_uses_defaults() {
        let yaml = r#"
project:
  name: Hillside
  location: North Ridge
  total_land_area: 5000
  land_cost_per_area: 20000
  zone: premium
typologies:
  - name: Villa 4P
    land_area: 150
    built_area: 80
    construction_cost_per_area: 300000
    quantity: 12
"#;
        let input: SimulationInput = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(input.project.zone, ZoneCategory::Premium);
        assert_eq!(input.project.vat_pct, dec!(18));
        assert_eq!(input.project.surcharge_pct(), dec!(20));
        assert_eq!(input.project.land_title, LandTitle::Acd);
        assert_eq!(input.margin_tiers, MarginTiers::default());
        assert_eq!(input.phasing, PhasingPlan::default());
        assert!(input.competitors.is_empty());
        validate_input(&input).unwrap();
    }

    #[test]
    fn json_snapshot_roundtrip() {
        let input = demo_input();
        let s = serde_json::to_string(&input).unwrap();
        let back: SimulationInput = serde_json::from_str(&s).unwrap();
        assert_eq!(back, input);
    }

    proptest! {
        #[test]
        fn typology_with_positive_quantity_is_valid(
            land in 0u32..10_000,
            built in 0u32..10_000,
            cost in 0u64..5_000_000,
            quantity in 1u32..10_000,
        ) {
            let t = UnitTypology {
                name: "Unit".to_string(),
                land_area: Decimal::from(land),
                built_area: Decimal::from(built),
                construction_cost_per_area: Decimal::from(cost),
                quantity,
            };
            prop_assert!(validate_typology(&t).is_ok());
        }

        #[test]
        fn phase_shares_in_range_are_valid(p1 in 0u32..=100, p2 in 0u32..=100, p3 in 0u32..=100) {
            let plan = PhasingPlan {
                phase1_pct: Decimal::from(p1),
                phase2_pct: Decimal::from(p2),
                phase3_pct: Decimal::from(p3),
                ..PhasingPlan::default()
            };
            prop_assert!(validate_phasing(&plan).is_ok());
        }
    }
}
