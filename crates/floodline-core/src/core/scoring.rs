use super::models::input::{BuildingInput, Material};
use super::models::result::ScoreBreakdown;
use super::reference::ReferenceData;
use crate::engine::error::EngineError;
use tracing::debug;

/// Elevation tiers as `(minimum net elevation in ft, points)`, highest first.
const ELEVATION_TIERS: [(f64, u32); 3] = [(10.0, 30), (6.0, 20), (3.0, 10)];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringResult {
    pub breakdown: ScoreBreakdown,
    pub resilience_score: u32,
    pub net_elevation_ft: f64,
}

/// Points awarded for height above the neighborhood's base flood elevation.
///
/// Each tier's lower bound is inclusive: exactly 10.0 ft earns the top tier,
/// exactly 6.0 ft the middle one.
pub fn elevation_score(net_elevation_ft: f64) -> u32 {
    ELEVATION_TIERS
        .iter()
        .find(|&&(minimum, _)| net_elevation_ft >= minimum)
        .map_or(0, |&(_, points)| points)
}

/// The material's raw catalog score, reported as a durability proxy.
pub fn material_risk_score(material: Material, reference: &ReferenceData) -> u32 {
    reference.material(material).map_or(0, |profile| profile.score)
}

pub fn evaluate(
    input: &BuildingInput,
    reference: &ReferenceData,
) -> Result<ScoringResult, EngineError> {
    let neighborhood = reference
        .neighborhood(&input.neighborhood)
        .ok_or_else(|| EngineError::missing("neighborhood", input.neighborhood.as_str()))?;

    let foundation = reference
        .foundation_score(input.foundation_type)
        .ok_or_else(|| EngineError::missing("foundation", input.foundation_type.as_str()))?;

    let net_elevation_ft = input.elevation_ft - neighborhood.base_flood_elevation_ft;
    let elevation = elevation_score(net_elevation_ft);

    let material = match reference.material(input.material) {
        Some(profile) => profile.score,
        None => {
            debug!(
                "Material '{}' is not in the catalog; contributing 0.",
                input.material
            );
            0
        }
    };

    let mitigation = input
        .mitigation_features
        .iter()
        .map(|&feature| {
            reference
                .mitigation_feature(feature)
                .map_or(0, |profile| profile.score)
        })
        .fold(0, u32::saturating_add);

    let breakdown = ScoreBreakdown {
        foundation,
        elevation,
        material,
        mitigation,
    };
    debug!(
        net_elevation_ft,
        raw_total = breakdown.raw_total(),
        "Computed score breakdown: {:?}",
        breakdown
    );

    Ok(ScoringResult {
        breakdown,
        resilience_score: breakdown.composite(),
        net_elevation_ft,
    })
}
