use crate::cli::{DataArgs, DataCommands, ReferenceArgs};
use crate::config::ReferenceSource;
use crate::data;
use crate::error::Result;
use floodline::core::reference::ReferenceData;
use std::path::Path;
use tracing::info;

pub async fn run(args: DataArgs) -> Result<()> {
    match args.command {
        DataCommands::List { reference } => {
            handle_list(&reference)?;
        }
        DataCommands::Export { dir, force } => {
            handle_export(&dir, force)?;
        }
    }
    Ok(())
}

fn handle_list(args: &ReferenceArgs) -> Result<()> {
    let source = match (&args.catalog, &args.scenarios) {
        (Some(catalog), Some(scenarios)) => ReferenceSource::Files {
            catalog: catalog.clone(),
            scenarios: scenarios.clone(),
        },
        _ => ReferenceSource::Builtin,
    };
    let reference = data::load_reference(&source)?;
    println!("{}", render_listing(&reference));
    Ok(())
}

fn handle_export(dir: &Path, force: bool) -> Result<()> {
    info!("Exporting built-in reference data to {:?}", dir);
    for path in data::export_builtin(dir, force)? {
        println!("✓ Wrote {}", path.display());
    }
    Ok(())
}

fn render_listing(reference: &ReferenceData) -> String {
    let mut sections = Vec::new();

    let neighborhoods = reference
        .neighborhoods
        .iter()
        .map(|(name, profile)| {
            format!(
                "  {:<16} BFE {} ft ±{} ft",
                name, profile.base_flood_elevation_ft, profile.uncertainty_ft
            )
        })
        .collect::<Vec<_>>();
    sections.push(format!("Neighborhoods:\n{}", neighborhoods.join("\n")));

    let foundations = reference
        .foundations
        .iter()
        .map(|(foundation, score)| format!("  {:<16} score {}", foundation, score))
        .collect::<Vec<_>>();
    sections.push(format!("Foundations:\n{}", foundations.join("\n")));

    let materials = reference
        .materials
        .iter()
        .map(|(material, profile)| {
            format!(
                "  {:<16} score {:<3} {} durability",
                material, profile.score, profile.durability
            )
        })
        .collect::<Vec<_>>();
    sections.push(format!("Materials:\n{}", materials.join("\n")));

    let mitigation = reference
        .mitigation
        .iter()
        .map(|(feature, profile)| {
            format!(
                "  {:<16} score {:<3} {} effectiveness",
                feature, profile.score, profile.effectiveness
            )
        })
        .collect::<Vec<_>>();
    sections.push(format!("Mitigation features:\n{}", mitigation.join("\n")));

    let scenarios = reference
        .scenarios
        .iter()
        .map(|(name, scenario)| {
            let points = scenario.sorted_projections();
            match (points.first(), points.last()) {
                (Some(&(first_year, _)), Some(&(last_year, _))) => format!(
                    "  {:<16} {}-{}, max rise {:.2} ft",
                    name,
                    first_year,
                    last_year,
                    scenario.max_rise_ft().unwrap_or_default()
                ),
                _ => format!("  {:<16} (no projections)", name),
            }
        })
        .collect::<Vec<_>>();
    sections.push(format!("Sea-level scenarios:\n{}", scenarios.join("\n")));

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_covers_every_table_of_the_builtin_dataset() {
        let reference = ReferenceData::builtin().unwrap();
        let listing = render_listing(&reference);

        for name in reference.neighborhood_names() {
            assert!(listing.contains(name));
        }
        for name in reference.scenario_names() {
            assert!(listing.contains(name));
        }
        assert!(listing.contains("BFE 6 ft ±0.5 ft"));
        assert!(listing.contains("score 30"));
        assert!(listing.contains("composite"));
        assert!(listing.contains("high effectiveness"));
        assert!(listing.contains("2020-2060, max rise 2.85 ft"));
    }

    #[test]
    fn empty_scenario_is_listed_without_years() {
        let mut reference = ReferenceData::default();
        reference
            .scenarios
            .insert("blank".to_string(), Default::default());
        assert!(render_listing(&reference).contains("blank            (no projections)"));
    }
}
