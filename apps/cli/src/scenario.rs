//! Scenario files: a serialized `SimulationInput` in JSON or YAML.

use anyhow::{bail, Context, Result};
use realty_core::SimulationInput;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Format::Json),
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            _ => bail!(
                "unsupported scenario file {}: expected .json, .yaml or .yml",
                path.display()
            ),
        }
    }
}

pub fn parse(text: &str, format: Format) -> Result<SimulationInput> {
    let input = match format {
        Format::Json => serde_json::from_str(text)?,
        Format::Yaml => serde_yaml::from_str(text)?,
    };
    Ok(input)
}

pub fn load(path: &Path) -> Result<SimulationInput> {
    let format = Format::from_path(path)?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading scenario {}", path.display()))?;
    parse(&text, format).with_context(|| format!("parsing scenario {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use realty_core::{demo_input, ZoneCategory};
    use rust_decimal_macros::dec;

    #[test]
    fn format_by_extension() {
        assert_eq!(Format::from_path(Path::new("a.json")).unwrap(), Format::Json);
        assert_eq!(Format::from_path(Path::new("a.YML")).unwrap(), Format::Yaml);
        assert!(Format::from_path(Path::new("a.toml")).is_err());
        assert!(Format::from_path(Path::new("scenario")).is_err());
    }

    #[test]
    fn yaml_uses_defaults() {
        let text = r#"
project:
  name: Hillside
  location: North ridge
  zone: premium
  total_land_area: 5000
  land_cost_per_area: 25000
typologies:
  - name: Villa 3P
    land_area: 100
    built_area: 60
    construction_cost_per_area: 300000
    quantity: 20
"#;
        let input = parse(text, Format::Yaml).unwrap();
        assert_eq!(input.project.zone, ZoneCategory::Premium);
        assert_eq!(input.project.vat_pct, dec!(18));
        assert_eq!(input.margin_tiers.len(), 4);
        assert!(input.competitors.is_empty());
        assert_eq!(input.typologies[0].quantity, 20);
    }

    #[test]
    fn demo_survives_both_formats() {
        let demo = demo_input();
        let yaml = serde_yaml::to_string(&demo).unwrap();
        assert_eq!(parse(&yaml, Format::Yaml).unwrap(), demo);
        let json = serde_json::to_string(&demo).unwrap();
        assert_eq!(parse(&json, Format::Json).unwrap(), demo);
    }

    #[test]
    fn load_reports_path() {
        let err = load(Path::new("/nonexistent/realty.yaml")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/realty.yaml"));
    }
}
