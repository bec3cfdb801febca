use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FoundationType {
    Slab,
    Pier,
    Elevated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Material {
    Wood,
    Metal,
    Concrete,
    Composite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MitigationFeature {
    FloodVents,
    BreakawayWalls,
    SumpPump,
}

/// Qualitative rating used for material durability and feature effectiveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tier {
    Low,
    Medium,
    High,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid {kind} value: '{value}'")]
pub struct ParseOptionError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseOptionError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl FoundationType {
    pub const ALL: [FoundationType; 3] = [Self::Slab, Self::Pier, Self::Elevated];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slab => "slab",
            Self::Pier => "pier",
            Self::Elevated => "elevated",
        }
    }
}

impl FromStr for FoundationType {
    type Err = ParseOptionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "slab" => Ok(Self::Slab),
            "pier" => Ok(Self::Pier),
            "elevated" => Ok(Self::Elevated),
            _ => Err(ParseOptionError::new("foundation type", s)),
        }
    }
}

impl Material {
    pub const ALL: [Material; 4] = [Self::Wood, Self::Metal, Self::Concrete, Self::Composite];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wood => "wood",
            Self::Metal => "metal",
            Self::Concrete => "concrete",
            Self::Composite => "composite",
        }
    }
}

impl FromStr for Material {
    type Err = ParseOptionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wood" => Ok(Self::Wood),
            "metal" => Ok(Self::Metal),
            "concrete" => Ok(Self::Concrete),
            "composite" => Ok(Self::Composite),
            _ => Err(ParseOptionError::new("material", s)),
        }
    }
}

impl MitigationFeature {
    pub const ALL: [MitigationFeature; 3] =
        [Self::FloodVents, Self::BreakawayWalls, Self::SumpPump];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FloodVents => "floodVents",
            Self::BreakawayWalls => "breakawayWalls",
            Self::SumpPump => "sumpPump",
        }
    }
}

impl FromStr for MitigationFeature {
    type Err = ParseOptionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept both the camelCase wire names and kebab-case CLI spellings.
        match s.trim().to_lowercase().replace(['-', '_'], "").as_str() {
            "floodvents" => Ok(Self::FloodVents),
            "breakawaywalls" => Ok(Self::BreakawayWalls),
            "sumppump" => Ok(Self::SumpPump),
            _ => Err(ParseOptionError::new("mitigation feature", s)),
        }
    }
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for Tier {
    type Err = ParseOptionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseOptionError::new("tier", s)),
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

display_as_str!(FoundationType, Material, MitigationFeature, Tier);

/// A single design submitted for evaluation.
///
/// The value is assumed to be structurally valid by the time it reaches the
/// engine; range checks on `elevation_ft` belong to the caller-facing boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BuildingInput {
    pub foundation_type: FoundationType,
    pub elevation_ft: f64,
    pub material: Material,
    #[serde(default)]
    pub mitigation_features: BTreeSet<MitigationFeature>,
    pub neighborhood: String,
}
