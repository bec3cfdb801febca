use crate::cli::DesignArgs;
use crate::error::{CliError, Result};
use floodline::core::models::input::{BuildingInput, FoundationType, Material, MitigationFeature};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// A design file may leave out fields that are supplied by flags.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PartialBuildingInput {
    foundation_type: Option<FoundationType>,
    elevation_ft: Option<f64>,
    material: Option<Material>,
    mitigation_features: Option<BTreeSet<MitigationFeature>>,
    neighborhood: Option<String>,
}

impl PartialBuildingInput {
    fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading design from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            serde_json::from_str(&content).map_err(anyhow::Error::from)
        } else {
            toml::from_str(&content).map_err(anyhow::Error::from)
        };
        parsed.map_err(|source| CliError::FileParsing {
            path: path.to_path_buf(),
            source,
        })
    }

    fn merge_with_cli(self, args: &DesignArgs) -> Result<BuildingInput> {
        let missing = |field: &str, flag: &str| {
            CliError::Argument(format!(
                "Missing required field '{}'; set it in --input or pass {}.",
                field, flag
            ))
        };

        let mitigation_features = if args.features.is_empty() {
            self.mitigation_features.unwrap_or_default()
        } else {
            args.features.iter().copied().collect()
        };

        let input = BuildingInput {
            foundation_type: args
                .foundation
                .or(self.foundation_type)
                .ok_or_else(|| missing("foundationType", "--foundation"))?,
            elevation_ft: args
                .elevation
                .or(self.elevation_ft)
                .ok_or_else(|| missing("elevationFt", "--elevation"))?,
            material: args
                .material
                .or(self.material)
                .ok_or_else(|| missing("material", "--material"))?,
            mitigation_features,
            neighborhood: args
                .neighborhood
                .clone()
                .or(self.neighborhood)
                .ok_or_else(|| missing("neighborhood", "--neighborhood"))?,
        };

        validate(&input)?;
        Ok(input)
    }
}

/// Assembles the design from `--input` and the design flags, flags winning.
pub fn resolve_design(args: &DesignArgs) -> Result<BuildingInput> {
    let partial = match &args.input {
        Some(path) => PartialBuildingInput::from_file(path)?,
        None => PartialBuildingInput::default(),
    };
    partial.merge_with_cli(args)
}

/// Range checks the engine relies on the caller to perform.
pub fn validate(input: &BuildingInput) -> Result<()> {
    if !input.elevation_ft.is_finite() {
        return Err(CliError::Argument(format!(
            "Elevation must be a finite number of feet, got {}.",
            input.elevation_ft
        )));
    }
    if input.elevation_ft < 0.0 {
        return Err(CliError::Argument(format!(
            "Elevation must not be negative, got {} ft.",
            input.elevation_ft
        )));
    }
    if input.neighborhood.trim().is_empty() {
        return Err(CliError::Argument(
            "Neighborhood must not be empty.".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn flags_for_full_design() -> DesignArgs {
        DesignArgs {
            foundation: Some(FoundationType::Elevated),
            elevation: Some(16.0),
            material: Some(Material::Concrete),
            neighborhood: Some("Bywater".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn flags_alone_produce_a_design() {
        let input = resolve_design(&flags_for_full_design()).unwrap();
        assert_eq!(input.foundation_type, FoundationType::Elevated);
        assert_eq!(input.elevation_ft, 16.0);
        assert!(input.mitigation_features.is_empty());
        assert_eq!(input.neighborhood, "Bywater");
    }

    #[test]
    fn json_file_is_read_with_wire_field_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("design.json");
        fs::write(
            &path,
            r#"{
                "foundationType": "pier",
                "elevationFt": 9.5,
                "material": "metal",
                "mitigationFeatures": ["floodVents"],
                "neighborhood": "MidCity"
            }"#,
        )
        .unwrap();

        let args = DesignArgs {
            input: Some(path),
            ..Default::default()
        };
        let input = resolve_design(&args).unwrap();
        assert_eq!(input.foundation_type, FoundationType::Pier);
        assert_eq!(input.material, Material::Metal);
        assert_eq!(
            input.mitigation_features,
            BTreeSet::from([MitigationFeature::FloodVents])
        );
    }

    #[test]
    fn flags_override_toml_file_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("design.toml");
        fs::write(
            &path,
            r#"
            foundationType = "slab"
            elevationFt = 4.0
            material = "wood"
            mitigationFeatures = ["sumpPump"]
            neighborhood = "Lakeview"
            "#,
        )
        .unwrap();

        let args = DesignArgs {
            input: Some(path),
            elevation: Some(11.0),
            features: vec![MitigationFeature::BreakawayWalls],
            ..Default::default()
        };
        let input = resolve_design(&args).unwrap();
        assert_eq!(input.foundation_type, FoundationType::Slab);
        assert_eq!(input.elevation_ft, 11.0);
        assert_eq!(
            input.mitigation_features,
            BTreeSet::from([MitigationFeature::BreakawayWalls])
        );
        assert_eq!(input.neighborhood, "Lakeview");
    }

    #[test]
    fn missing_field_names_the_flag() {
        let args = DesignArgs {
            material: None,
            ..flags_for_full_design()
        };
        match resolve_design(&args) {
            Err(CliError::Argument(msg)) => {
                assert!(msg.contains("material"));
                assert!(msg.contains("--material"));
            }
            other => panic!("Expected argument error, got {:?}", other),
        }
    }

    #[test]
    fn negative_or_non_finite_elevation_is_rejected() {
        for elevation in [-0.5, f64::NAN, f64::INFINITY] {
            let args = DesignArgs {
                elevation: Some(elevation),
                ..flags_for_full_design()
            };
            assert!(matches!(resolve_design(&args), Err(CliError::Argument(_))));
        }
    }

    #[test]
    fn zero_elevation_is_accepted() {
        let args = DesignArgs {
            elevation: Some(0.0),
            ..flags_for_full_design()
        };
        assert!(resolve_design(&args).is_ok());
    }

    #[test]
    fn blank_neighborhood_is_rejected() {
        let args = DesignArgs {
            neighborhood: Some("  ".to_string()),
            ..flags_for_full_design()
        };
        assert!(matches!(resolve_design(&args), Err(CliError::Argument(_))));
    }

    #[test]
    fn malformed_file_reports_its_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, r#"{"foundationType": "basement"}"#).unwrap();

        let args = DesignArgs {
            input: Some(path.clone()),
            ..Default::default()
        };
        match resolve_design(&args) {
            Err(CliError::FileParsing { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("Expected file parsing error, got {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let args = DesignArgs {
            input: Some(PathBuf::from("/definitely/not/here/design.toml")),
            ..Default::default()
        };
        assert!(matches!(resolve_design(&args), Err(CliError::Io(_))));
    }
}
