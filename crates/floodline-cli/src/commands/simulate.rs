use crate::cli::{OutputFormat, SimulateArgs};
use crate::config::AppConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use crate::{data, input, narrative};
use floodline::{
    core::models::{input::BuildingInput, result::SimulationResult},
    engine::progress::ProgressReporter,
    workflows::simulate::Simulator,
};
use std::sync::Arc;
use tracing::info;

pub async fn run(args: SimulateArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let config = AppConfig::resolve(&args.settings, Some(&args.narrative))?;

    let input = input::resolve_design(&args.design)?;
    info!(
        "Evaluating {} foundation at {} ft in {}.",
        input.foundation_type, input.elevation_ft, input.neighborhood
    );

    let reference = Arc::new(data::load_reference(&config.reference)?);
    let generator = narrative::build_generator(&config.provider)?;
    let simulator = Simulator::new(reference, config.simulation, generator);

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Invoking the core simulation workflow...");
    let outcome = simulator.simulate_with_progress(&input, &reporter).await;
    progress_handler.clear();
    let result = outcome?;

    info!(
        "Workflow finished: score {}, safe until {}.",
        result.resilience_score, result.cutoff_year
    );

    let rendered = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&result).map_err(anyhow::Error::from)?,
        OutputFormat::Text => render_text(&input, &simulator.config().scenario, &result),
    };
    println!("{}", rendered);

    Ok(())
}

fn render_text(input: &BuildingInput, scenario: &str, result: &SimulationResult) -> String {
    let features = if input.mitigation_features.is_empty() {
        "none".to_string()
    } else {
        input
            .mitigation_features
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let breakdown = &result.breakdown;

    format!(
        "Flood resilience assessment: {neighborhood}
  Design:     {foundation} foundation, {material}, elevation {elevation} ft
  Mitigation: {features}

Resilience score:    {score}/100
  Foundation         {b_foundation:>3}
  Elevation          {b_elevation:>3}
  Material           {b_material:>3}
  Mitigation         {b_mitigation:>3}
Safe until:          {cutoff_year} (scenario \"{scenario}\")
Material risk score: {material_risk}

Design recommendation
{recommendation}

Cost-benefit analysis
{cost_benefit}",
        neighborhood = input.neighborhood,
        foundation = input.foundation_type,
        material = input.material,
        elevation = input.elevation_ft,
        score = result.resilience_score,
        b_foundation = breakdown.foundation,
        b_elevation = breakdown.elevation,
        b_material = breakdown.material,
        b_mitigation = breakdown.mitigation,
        cutoff_year = result.cutoff_year,
        material_risk = result.material_risk_score,
        recommendation = indent(&result.recommendation),
        cost_benefit = indent(&result.cost_benefit_analysis),
    )
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("  {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
