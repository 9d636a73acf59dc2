//! Plain-text rendering of simulation results.

use realty_core::SimulationInput;
use realty_pricing::{
    Advantage, LaunchPace, MarginOutlook, PositioningBand, PriceStance, SimulationResults, Warning,
    Weakness,
};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

/// Whole currency units, half away from zero.
pub(crate) fn money(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

pub(crate) fn pct(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn band_label(band: PositioningBand) -> &'static str {
    match band {
        PositioningBand::Aggressive => "aggressive",
        PositioningBand::Competitive => "competitive",
        PositioningBand::AtMarket => "at market",
        PositioningBand::Premium => "premium",
        PositioningBand::Luxury => "luxury",
    }
}

fn stance_label(stance: PriceStance) -> &'static str {
    match stance {
        PriceStance::Discount => "below market",
        PriceStance::InLine => "in line with market",
        PriceStance::Premium => "above market",
        PriceStance::Unknown => "unknown (no market data)",
    }
}

fn outlook_label(outlook: MarginOutlook) -> &'static str {
    match outlook {
        MarginOutlook::Exceptional => "exceptional",
        MarginOutlook::Solid => "solid",
        MarginOutlook::NeedsReview => "needs review",
    }
}

fn pace_label(pace: LaunchPace) -> &'static str {
    match pace {
        LaunchPace::Prudent => "prudent",
        LaunchPace::Ambitious => "ambitious",
    }
}

fn advantage_line(a: &Advantage) -> String {
    match a {
        Advantage::StrategicZone => "strategic zone".to_string(),
        Advantage::SecureLandTitle { title } => format!("secure land title ({title:?})"),
        Advantage::PriceAdvantage { discount_pct } => {
            format!("{}% below market price", pct(*discount_pct))
        }
        Advantage::HighLocationCoefficient { coefficient } => {
            format!("high location coefficient ({coefficient})")
        }
        Advantage::DistinctTypology => "typologies not offered by competitors".to_string(),
    }
}

fn weakness_line(w: &Weakness) -> String {
    match w {
        Weakness::PriceAboveMarket { premium_pct } => {
            format!("{}% above market price", pct(*premium_pct))
        }
        Weakness::LowAttractivenessZone { coefficient } => {
            format!("low attractiveness zone ({coefficient})")
        }
        Weakness::BetterLocatedCompetitors { names } => {
            format!("better located competitors: {}", names.join(", "))
        }
    }
}

fn warning_line(w: &Warning) -> String {
    match w {
        Warning::PhasingUnreconciled { total_pct } => format!(
            "phase shares add up to {total_pct}%, phase 3 receives the remaining units"
        ),
        Warning::ZeroBuiltArea { typology } => {
            format!("{typology} has no built area and is left out of the benchmark")
        }
    }
}

/// Full report for one computed simulation.
pub struct Report<'a> {
    pub input: &'a SimulationInput,
    pub results: &'a SimulationResults,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (p, r) = (&self.input.project, self.results);
        writeln!(f, "{} | {} | zone {:?} (x{})", p.name, p.location, p.zone, p.location_coefficient)?;
        writeln!(
            f,
            "Units: {} | Investment: {} | Surcharges: {}% | VAT: {}%",
            r.total_units,
            money(r.investment),
            p.surcharge_pct(),
            p.vat_pct
        )?;

        writeln!(f, "\nTypologies")?;
        for t in &r.typologies {
            writeln!(
                f,
                "  {:<24} x{:<4} cost before tax {:>14} | total cost {:>16}",
                t.name,
                t.quantity,
                money(t.cost.cost_before_tax),
                money(t.cost.total_cost)
            )?;
            let ladder: Vec<String> = t
                .prices
                .iter()
                .map(|tp| format!("{} {}", tp.tier, money(tp.price)))
                .collect();
            writeln!(f, "    prices: {}", ladder.join(" | "))?;
            if let Some(b) = t.benchmark_price {
                writeln!(f, "    market-based price: {}", money(b))?;
            }
        }

        writeln!(f, "\nMargin tiers")?;
        for tier in &r.tiers {
            let mark = if tier.tier == r.headline.tier { "*" } else { " " };
            writeln!(
                f,
                " {mark}{:<14} {:>6}% revenue {:>16} net margin {:>16} ROI {:>8}%",
                tier.tier,
                tier.margin_pct,
                money(tier.revenue),
                money(tier.net_margin),
                pct(tier.roi_pct)
            )?;
        }

        writeln!(f, "\nPhasing (cost per unit {})", money(r.phasing.cost_per_unit))?;
        for ph in &r.phasing.phases {
            writeln!(
                f,
                "  phase {} units {:>5} revenue {:>16} cumulative margin {:>16} ROI {:>8}%",
                ph.phase,
                ph.units,
                money(ph.revenue),
                money(ph.cumulative_margin),
                pct(ph.cumulative_roi_pct)
            )?;
        }

        writeln!(f, "\nBenchmark")?;
        match (r.benchmark.project_price_per_area, r.benchmark.market_price_per_area) {
            (Some(project), Some(market)) => writeln!(
                f,
                "  project {}/m2 vs market {}/m2 ({})",
                money(project),
                money(market),
                r.benchmark.market_band.map(band_label).unwrap_or("n/a")
            )?,
            (Some(project), None) => writeln!(f, "  project {}/m2, no competitors", money(project))?,
            (None, _) => writeln!(f, "  no priced built area")?,
        }
        for c in &r.benchmark.comparisons {
            let delta = c
                .delta_pct
                .map(|d| format!("{:+}%", pct(d)))
                .unwrap_or_else(|| "n/a".to_string());
            writeln!(
                f,
                "  {:<24} {:>10}/m2 delta {:>9} {}",
                c.name,
                money(c.competitor_price_per_area),
                delta,
                c.band.map(band_label).unwrap_or("n/a")
            )?;
        }

        let a = &r.analysis;
        writeln!(f, "\nAnalysis: priced {}", stance_label(a.stance))?;
        writeln!(
            f,
            "  margins {} | {} launch ({}% in phase 1)",
            outlook_label(a.margin_outlook),
            pace_label(a.launch_pace),
            self.input.phasing.phase1_pct
        )?;
        if let Some(dominant) = &a.dominant_typology {
            writeln!(f, "  dominant typology: {dominant}")?;
        }
        for adv in &a.advantages {
            writeln!(f, "  + {}", advantage_line(adv))?;
        }
        for w in &a.weaknesses {
            writeln!(f, "  - {}", weakness_line(w))?;
        }

        if !r.warnings.is_empty() {
            writeln!(f, "\nWarnings")?;
            for w in &r.warnings {
                writeln!(f, "  ! {}", warning_line(w))?;
            }
        }
        Ok(())
    }
}
