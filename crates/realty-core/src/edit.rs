//! Pure reducer over input snapshots.
//!
//! Interactive front-ends feed one [`FieldChange`] at a time and get a new
//! snapshot back; recomputation is left to the caller.

use crate::{
    Competitor, LandTitle, MarginPreset, SimulationInput, UnitTypology, ZoneCategory,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// A single edit to an input snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "field", content = "value")]
pub enum FieldChange {
    ProjectName(String),
    Location(String),
    /// Changes the zone and resets the location coefficient to the zone default.
    Zone(ZoneCategory),
    LocationCoefficient(Decimal),
    TotalLandArea(Decimal),
    LandCostPerArea(Decimal),
    LandTitle(LandTitle),
    SiteDevelopmentPct(Decimal),
    StudiesPct(Decimal),
    FinancingPct(Decimal),
    VatPct(Decimal),
    /// Sets one tier's margin; unknown ids are appended.
    MarginTier { id: String, margin_pct: Decimal },
    /// Replaces the whole tier set.
    MarginPreset(MarginPreset),
    Phase1Pct(Decimal),
    Phase2Pct(Decimal),
    Phase3Pct(Decimal),
    Phase2IncreasePct(Decimal),
    Phase3IncreasePct(Decimal),
    AddTypology(UnitTypology),
    UpdateTypology { index: usize, typology: UnitTypology },
    RemoveTypology(usize),
    AddCompetitor(Competitor),
    UpdateCompetitor { index: usize, competitor: Competitor },
    RemoveCompetitor(usize),
}

/// Edits the reducer refuses to apply.
#[derive(Debug, Error, PartialEq)]
pub enum EditError {
    #[error("no typology at index {0}")]
    TypologyIndex(usize),
    #[error("no competitor at index {0}")]
    CompetitorIndex(usize),
    /// A project keeps at least one typology.
    #[error("cannot remove the last typology")]
    LastTypology,
}

/// Apply `change` to `prev`, returning the next snapshot. `prev` is untouched.
pub fn apply(prev: &SimulationInput, change: FieldChange) -> Result<SimulationInput, EditError> {
    debug!(?change, "applying field change");
    let mut next = prev.clone();
    let project = &mut next.project;
    let phasing = &mut next.phasing;
    match change {
        FieldChange::ProjectName(v) => project.name = v,
        FieldChange::Location(v) => project.location = v,
        FieldChange::Zone(zone) => {
            project.zone = zone;
            project.location_coefficient = zone.default_coefficient();
        }
        FieldChange::LocationCoefficient(v) => project.location_coefficient = v,
        FieldChange::TotalLandArea(v) => project.total_land_area = v,
        FieldChange::LandCostPerArea(v) => project.land_cost_per_area = v,
        FieldChange::LandTitle(v) => project.land_title = v,
        FieldChange::SiteDevelopmentPct(v) => project.site_development_pct = v,
        FieldChange::StudiesPct(v) => project.studies_pct = v,
        FieldChange::FinancingPct(v) => project.financing_pct = v,
        FieldChange::VatPct(v) => project.vat_pct = v,
        FieldChange::MarginTier { id, margin_pct } => next.margin_tiers.set(&id, margin_pct),
        FieldChange::MarginPreset(preset) => next.margin_tiers = preset.tiers(),
        FieldChange::Phase1Pct(v) => phasing.phase1_pct = v,
        FieldChange::Phase2Pct(v) => phasing.phase2_pct = v,
        FieldChange::Phase3Pct(v) => phasing.phase3_pct = v,
        FieldChange::Phase2IncreasePct(v) => phasing.phase2_increase_pct = v,
        FieldChange::Phase3IncreasePct(v) => phasing.phase3_increase_pct = v,
        FieldChange::AddTypology(t) => next.typologies.push(t),
        FieldChange::UpdateTypology { index, typology } => {
            let slot = next
                .typologies
                .get_mut(index)
                .ok_or(EditError::TypologyIndex(index))?;
            *slot = typology;
        }
        FieldChange::RemoveTypology(index) => {
            if index >= next.typologies.len() {
                return Err(EditError::TypologyIndex(index));
            }
            if next.typologies.len() == 1 {
                return Err(EditError::LastTypology);
            }
            next.typologies.remove(index);
        }
        FieldChange::AddCompetitor(c) => next.competitors.push(c),
        FieldChange::UpdateCompetitor { index, competitor } => {
            let slot = next
                .competitors
                .get_mut(index)
                .ok_or(EditError::CompetitorIndex(index))?;
            *slot = competitor;
        }
        FieldChange::RemoveCompetitor(index) => {
            if index >= next.competitors.len() {
                return Err(EditError::CompetitorIndex(index));
            }
            next.competitors.remove(index);
        }
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{demo_input, TARGET_TIER};
    use rust_decimal_macros::dec;

    #[test]
    fn zone_change_resets_coefficient() {
        let prev = demo_input();
        assert_eq!(prev.project.location_coefficient, dec!(1.5));
        let next = apply(&prev, FieldChange::Zone(ZoneCategory::Economic)).unwrap();
        assert_eq!(next.project.zone, ZoneCategory::Economic);
        assert_eq!(next.project.location_coefficient, dec!(0.8));
        // Snapshot semantics: the previous value is unchanged.
        assert_eq!(prev.project.zone, ZoneCategory::Strategic);
    }

    #[test]
    fn coefficient_override_survives_until_next_zone_change() {
        let prev = demo_input();
        let next = apply(&prev, FieldChange::LocationCoefficient(dec!(1.35))).unwrap();
        assert_eq!(next.project.location_coefficient, dec!(1.35));
        assert_eq!(next.project.zone, ZoneCategory::Strategic);
    }

    #[test]
    fn scalar_fields() {
        let mut s = demo_input();
        for change in [
            FieldChange::VatPct(dec!(20)),
            FieldChange::FinancingPct(dec!(4)),
            FieldChange::Phase1Pct(dec!(40)),
            FieldChange::Phase3IncreasePct(dec!(12)),
            FieldChange::LandTitle(LandTitle::Lease),
        ] {
            s = apply(&s, change).unwrap();
        }
        assert_eq!(s.project.vat_pct, dec!(20));
        assert_eq!(s.project.surcharge_pct(), dec!(21));
        assert_eq!(s.phasing.phase1_pct, dec!(40));
        assert_eq!(s.phasing.phase3_increase_pct, dec!(12));
        assert_eq!(s.project.land_title, LandTitle::Lease);
    }

    #[test]
    fn margin_edits() {
        let s = apply(
            &demo_input(),
            FieldChange::MarginTier {
                id: TARGET_TIER.to_string(),
                margin_pct: dec!(65),
            },
        )
        .unwrap();
        assert_eq!(s.margin_tiers.target().unwrap().margin_pct, dec!(65));

        let s = apply(&s, FieldChange::MarginPreset(MarginPreset::Conservative)).unwrap();
        assert_eq!(s.margin_tiers.target().unwrap().margin_pct, dec!(25));
    }

    #[test]
    fn typology_list_edits() {
        let prev = demo_input();
        let mut extra = prev.typologies[0].clone();
        extra.name = "Studio".to_string();
        let s = apply(&prev, FieldChange::AddTypology(extra.clone())).unwrap();
        assert_eq!(s.typologies.len(), 6);

        extra.quantity = 3;
        let s = apply(
            &s,
            FieldChange::UpdateTypology {
                index: 5,
                typology: extra,
            },
        )
        .unwrap();
        assert_eq!(s.typologies[5].quantity, 3);

        let s = apply(&s, FieldChange::RemoveTypology(0)).unwrap();
        assert_eq!(s.typologies[0].name, "Villa 4P");

        assert_eq!(
            apply(&s, FieldChange::RemoveTypology(42)),
            Err(EditError::TypologyIndex(42))
        );
    }

    #[test]
    fn last_typology_cannot_be_removed() {
        let mut s = demo_input();
        s.typologies.truncate(1);
        assert_eq!(
            apply(&s, FieldChange::RemoveTypology(0)),
            Err(EditError::LastTypology)
        );
    }

    #[test]
    fn competitors_can_be_emptied() {
        let mut s = demo_input();
        for _ in 0..3 {
            s = apply(&s, FieldChange::RemoveCompetitor(0)).unwrap();
        }
        assert!(s.competitors.is_empty());
        assert_eq!(
            apply(&s, FieldChange::RemoveCompetitor(0)),
            Err(EditError::CompetitorIndex(0))
        );
    }

    #[test]
    fn change_is_serializable() {
        let change = FieldChange::Zone(ZoneCategory::Premium);
        let json = serde_json::to_string(&change).unwrap();
        assert_eq!(json, r#"{"field":"zone","value":"premium"}"#);
        let back: FieldChange = serde_json::from_str(&json).unwrap();
        assert_eq!(back, change);
    }
}
