use super::reference::ReferenceData;
use crate::engine::error::EngineError;
use tracing::debug;

/// First modeled year in which `base_flood_elevation_ft + rise` strictly
/// exceeds `total_elevation_ft`.
///
/// A structure level with the flood line is still considered safe for that
/// year. When no modeled year overtops the structure, the scenario's final
/// year is returned: the structure is reported safe through the model horizon.
pub fn project_cutoff_year(
    total_elevation_ft: f64,
    base_flood_elevation_ft: f64,
    scenario_name: &str,
    reference: &ReferenceData,
) -> Result<i32, EngineError> {
    let scenario = reference
        .scenario(scenario_name)
        .ok_or_else(|| EngineError::UnknownScenario(scenario_name.to_string()))?;

    let projections = scenario.sorted_projections();
    let last_year = projections
        .last()
        .map(|&(year, _)| year)
        .ok_or_else(|| EngineError::EmptyScenario(scenario_name.to_string()))?;

    let overtopped = projections.iter().find(|&&(_, rise_ft)| {
        let flood_line_ft = base_flood_elevation_ft + rise_ft;
        total_elevation_ft < flood_line_ft
    });

    match overtopped {
        Some(&(year, rise_ft)) => {
            debug!(
                year,
                flood_line_ft = base_flood_elevation_ft + rise_ft,
                "Structure overtopped under scenario '{}'.",
                scenario_name
            );
            Ok(year)
        }
        None => {
            debug!(
                "Structure stays above every modeled flood line under '{}'; safe through {}.",
                scenario_name, last_year
            );
            Ok(last_year)
        }
    }
}
