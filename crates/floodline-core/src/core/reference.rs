use super::models::input::{FoundationType, Material, MitigationFeature, Tier};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.toml");
pub const BUILTIN_SCENARIOS: &str = include_str!("../../data/scenarios.csv");

const BUILTIN_CATALOG_ORIGIN: &str = "<builtin>/catalog.toml";
const BUILTIN_SCENARIOS_ORIGIN: &str = "<builtin>/scenarios.csv";

/// Largest score a single catalog entry may carry; the composite itself caps at 100.
pub const MAX_CATALOG_SCORE: u32 = 100;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MaterialProfile {
    pub score: u32,
    pub durability: Tier,
    pub description: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MitigationFeatureProfile {
    pub score: u32,
    pub effectiveness: Tier,
    pub description: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct NeighborhoodFloodProfile {
    pub base_flood_elevation_ft: f64,
    pub uncertainty_ft: f64,
}

/// A named sea-level-rise projection: year → projected rise in feet.
///
/// Storage order carries no meaning; consumers that need chronology must go
/// through [`SeaLevelScenario::sorted_projections`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeaLevelScenario {
    pub projections: HashMap<i32, f64>,
}

impl SeaLevelScenario {
    pub fn sorted_projections(&self) -> Vec<(i32, f64)> {
        let mut points: Vec<(i32, f64)> = self
            .projections
            .iter()
            .map(|(&year, &rise)| (year, rise))
            .collect();
        points.sort_by_key(|&(year, _)| year);
        points
    }

    pub fn last_year(&self) -> Option<i32> {
        self.projections.keys().copied().max()
    }

    pub fn max_rise_ft(&self) -> Option<f64> {
        self.projections.values().copied().reduce(f64::max)
    }
}

/// Immutable lookup tables consumed by every evaluation.
///
/// Built once at start-up and shared read-only between requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceData {
    pub foundations: BTreeMap<FoundationType, u32>,
    pub materials: BTreeMap<Material, MaterialProfile>,
    pub mitigation: BTreeMap<MitigationFeature, MitigationFeatureProfile>,
    pub neighborhoods: BTreeMap<String, NeighborhoodFloodProfile>,
    pub scenarios: BTreeMap<String, SeaLevelScenario>,
}

#[derive(Debug, Error)]
pub enum ReferenceLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Unknown {table} key '{key}' in '{path}'")]
    UnknownKey {
        path: String,
        table: &'static str,
        key: String,
    },
    #[error("Duplicate projection for scenario '{scenario}' year {year} in '{path}'")]
    DuplicateProjection {
        path: String,
        scenario: String,
        year: i32,
    },
    #[error("Invalid {table} value for '{key}' in '{path}': {reason}")]
    InvalidValue {
        path: String,
        table: &'static str,
        key: String,
        reason: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default)]
    foundations: BTreeMap<String, u32>,
    #[serde(default)]
    materials: BTreeMap<String, MaterialProfile>,
    #[serde(default)]
    mitigation: BTreeMap<String, MitigationFeatureProfile>,
    #[serde(default)]
    neighborhoods: BTreeMap<String, NeighborhoodFloodProfile>,
}

#[derive(Debug, Deserialize)]
struct ProjectionRow {
    scenario: String,
    year: i32,
    rise_ft: f64,
}

struct Catalog {
    foundations: BTreeMap<FoundationType, u32>,
    materials: BTreeMap<Material, MaterialProfile>,
    mitigation: BTreeMap<MitigationFeature, MitigationFeatureProfile>,
    neighborhoods: BTreeMap<String, NeighborhoodFloodProfile>,
}

impl ReferenceData {
    pub fn load(catalog_path: &Path, scenarios_path: &Path) -> Result<Self, ReferenceLoadError> {
        let catalog = Self::load_catalog(catalog_path)?;
        let scenarios = Self::load_scenarios(scenarios_path)?;
        Ok(Self::assemble(catalog, scenarios))
    }

    /// The dataset shipped with the library.
    pub fn builtin() -> Result<Self, ReferenceLoadError> {
        let catalog = Self::parse_catalog(BUILTIN_CATALOG, BUILTIN_CATALOG_ORIGIN)?;
        let scenarios = Self::parse_scenarios(
            csv::Reader::from_reader(BUILTIN_SCENARIOS.as_bytes()),
            BUILTIN_SCENARIOS_ORIGIN,
        )?;
        Ok(Self::assemble(catalog, scenarios))
    }

    pub fn foundation_score(&self, foundation: FoundationType) -> Option<u32> {
        self.foundations.get(&foundation).copied()
    }

    pub fn material(&self, material: Material) -> Option<&MaterialProfile> {
        self.materials.get(&material)
    }

    pub fn mitigation_feature(
        &self,
        feature: MitigationFeature,
    ) -> Option<&MitigationFeatureProfile> {
        self.mitigation.get(&feature)
    }

    pub fn neighborhood(&self, name: &str) -> Option<&NeighborhoodFloodProfile> {
        self.neighborhoods.get(name)
    }

    pub fn scenario(&self, name: &str) -> Option<&SeaLevelScenario> {
        self.scenarios.get(name)
    }

    pub fn max_base_flood_elevation_ft(&self) -> Option<f64> {
        self.neighborhoods
            .values()
            .map(|n| n.base_flood_elevation_ft)
            .reduce(f64::max)
    }

    pub fn neighborhood_names(&self) -> impl Iterator<Item = &str> {
        self.neighborhoods.keys().map(String::as_str)
    }

    pub fn scenario_names(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(String::as_str)
    }

    fn assemble(catalog: Catalog, scenarios: BTreeMap<String, SeaLevelScenario>) -> Self {
        Self {
            foundations: catalog.foundations,
            materials: catalog.materials,
            mitigation: catalog.mitigation,
            neighborhoods: catalog.neighborhoods,
            scenarios,
        }
    }

    fn load_catalog(path: &Path) -> Result<Catalog, ReferenceLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ReferenceLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::parse_catalog(&content, &path.to_string_lossy())
    }

    fn parse_catalog(content: &str, origin: &str) -> Result<Catalog, ReferenceLoadError> {
        let file: CatalogFile = toml::from_str(content).map_err(|e| ReferenceLoadError::Toml {
            path: origin.to_string(),
            source: e,
        })?;

        for (key, &score) in &file.foundations {
            check_score(score, "foundation", key, origin)?;
        }
        for (key, profile) in &file.materials {
            check_score(profile.score, "material", key, origin)?;
        }
        for (key, profile) in &file.mitigation {
            check_score(profile.score, "mitigation", key, origin)?;
        }
        for (key, profile) in &file.neighborhoods {
            check_finite(profile.base_flood_elevation_ft, "neighborhood", key, origin)?;
            check_finite(profile.uncertainty_ft, "neighborhood", key, origin)?;
            if profile.uncertainty_ft < 0.0 {
                return Err(invalid_value(
                    "neighborhood",
                    key,
                    origin,
                    format!("uncertainty {} ft is negative", profile.uncertainty_ft),
                ));
            }
        }

        Ok(Catalog {
            foundations: rekey(file.foundations, "foundation", origin)?,
            materials: rekey(file.materials, "material", origin)?,
            mitigation: rekey(file.mitigation, "mitigation", origin)?,
            neighborhoods: file.neighborhoods,
        })
    }

    fn load_scenarios(path: &Path) -> Result<BTreeMap<String, SeaLevelScenario>, ReferenceLoadError> {
        let reader = csv::Reader::from_path(path).map_err(|e| ReferenceLoadError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::parse_scenarios(reader, &path.to_string_lossy())
    }

    fn parse_scenarios<R: std::io::Read>(
        mut reader: csv::Reader<R>,
        origin: &str,
    ) -> Result<BTreeMap<String, SeaLevelScenario>, ReferenceLoadError> {
        let mut scenarios: BTreeMap<String, SeaLevelScenario> = BTreeMap::new();
        for result in reader.deserialize::<ProjectionRow>() {
            let row = result.map_err(|e| ReferenceLoadError::Csv {
                path: origin.to_string(),
                source: e,
            })?;
            check_finite(
                row.rise_ft,
                "scenario",
                &format!("{} {}", row.scenario, row.year),
                origin,
            )?;
            let scenario = scenarios.entry(row.scenario.clone()).or_default();
            if scenario.projections.insert(row.year, row.rise_ft).is_some() {
                return Err(ReferenceLoadError::DuplicateProjection {
                    path: origin.to_string(),
                    scenario: row.scenario,
                    year: row.year,
                });
            }
        }
        Ok(scenarios)
    }
}

fn invalid_value(
    table: &'static str,
    key: &str,
    origin: &str,
    reason: String,
) -> ReferenceLoadError {
    ReferenceLoadError::InvalidValue {
        path: origin.to_string(),
        table,
        key: key.to_string(),
        reason,
    }
}

fn check_score(
    score: u32,
    table: &'static str,
    key: &str,
    origin: &str,
) -> Result<(), ReferenceLoadError> {
    if score > MAX_CATALOG_SCORE {
        return Err(invalid_value(
            table,
            key,
            origin,
            format!("score {} exceeds {}", score, MAX_CATALOG_SCORE),
        ));
    }
    Ok(())
}

fn check_finite(
    value: f64,
    table: &'static str,
    key: &str,
    origin: &str,
) -> Result<(), ReferenceLoadError> {
    if !value.is_finite() {
        return Err(invalid_value(
            table,
            key,
            origin,
            format!("{} is not a finite number of feet", value),
        ));
    }
    Ok(())
}

fn rekey<K, V>(
    raw: BTreeMap<String, V>,
    table: &'static str,
    origin: &str,
) -> Result<BTreeMap<K, V>, ReferenceLoadError>
where
    K: FromStr + Ord,
{
    raw.into_iter()
        .map(|(key, value)| {
            key.parse::<K>()
                .map(|k| (k, value))
                .map_err(|_| ReferenceLoadError::UnknownKey {
                    path: origin.to_string(),
                    table,
                    key,
                })
        })
        .collect()
}
