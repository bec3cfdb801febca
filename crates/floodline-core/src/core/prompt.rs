use super::models::input::BuildingInput;
use super::models::result::ScoreBreakdown;
use super::reference::ReferenceData;
use crate::engine::error::EngineError;

pub const RECOMMENDATION_HEADING: &str = "Design Recommendation";
pub const COST_BENEFIT_HEADING: &str = "Cost-Benefit Analysis";

const COST_AND_DURABILITY_CONTEXT: &str = "\
• Foundation Types:
  - Slab: ~$6,000, low flood resistance, ~20 yrs durability
  - Pier: ~$9,000, moderate flood resistance, ~25 yrs durability
  - Elevated: ~$14,000, high flood resistance, ~30+ yrs durability

• Materials:
  - Wood: low durability (~10 yrs), high flood damage risk (~$15K repair avg)
  - Concrete: high durability (~30 yrs), low damage risk (~$5K repair avg)

• Mitigation Features:
  - Flood vents: ~$1,200 (high effectiveness)
  - Breakaway walls: ~$3,500 (medium)
  - Sump pump: ~$900 (medium)

• Elevation Improvements:
  - +0 ft → ~$0
  - +2 ft → ~$8,000
  - +4 ft → ~$14,000
  - +6 ft → ~$20,000
  - +8 ft → ~$25,000
  - +10 ft → ~$30,000";

/// Numeric outcome of an evaluation, as rendered into the prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssessmentSummary {
    pub breakdown: ScoreBreakdown,
    pub resilience_score: u32,
    pub cutoff_year: i32,
}

/// Highest flood level the dataset can produce: the maximum rise of
/// `scenario_name` on top of the highest base flood elevation.
pub fn worst_case_flood_line_ft(
    reference: &ReferenceData,
    scenario_name: &str,
) -> Result<f64, EngineError> {
    let scenario = reference
        .scenario(scenario_name)
        .ok_or_else(|| EngineError::UnknownScenario(scenario_name.to_string()))?;
    let max_rise = scenario
        .max_rise_ft()
        .ok_or_else(|| EngineError::EmptyScenario(scenario_name.to_string()))?;
    let max_bfe = reference
        .max_base_flood_elevation_ft()
        .ok_or_else(|| EngineError::missing("neighborhood", "<any>"))?;
    Ok(max_rise + max_bfe)
}

/// Renders the advisory prompt for the narrative generator.
///
/// The response format embedded at the end (`1. Design Recommendation` /
/// `2. Cost-Benefit Analysis`) is what [`crate::engine::narrative::parse_narrative`]
/// splits on.
pub fn build_prompt(
    input: &BuildingInput,
    assessment: &AssessmentSummary,
    reference: &ReferenceData,
    worst_case_scenario: &str,
) -> Result<String, EngineError> {
    let neighborhood = reference
        .neighborhood(&input.neighborhood)
        .ok_or_else(|| EngineError::missing("neighborhood", input.neighborhood.as_str()))?;

    let material_description = reference
        .material(input.material)
        .map_or("", |profile| profile.description.as_str());

    let selected_features = if input.mitigation_features.is_empty() {
        "  - none".to_string()
    } else {
        input
            .mitigation_features
            .iter()
            .map(|&feature| {
                let description = reference
                    .mitigation_feature(feature)
                    .map_or("N/A", |profile| profile.description.as_str());
                format!("  - {}: {}", feature, description)
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let foundation_options = reference
        .foundations
        .iter()
        .map(|(foundation, score)| format!("  - {} (score: {})", foundation, score))
        .collect::<Vec<_>>()
        .join("\n");

    let material_options = reference
        .materials
        .iter()
        .map(|(material, profile)| {
            format!(
                "  - {} ({} durability): {}",
                material, profile.durability, profile.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mitigation_options = reference
        .mitigation
        .iter()
        .map(|(feature, profile)| {
            format!(
                "  - {} ({} effectiveness): {}",
                feature, profile.effectiveness, profile.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let worst_case = worst_case_flood_line_ft(reference, worst_case_scenario)?;
    let breakdown = &assessment.breakdown;

    Ok(format!(
        "You are an expert flood resilience design advisor.
Help design buildings that will perform well as conditions change over the next 30 years.
Analyze the building design and simulation below, and provide:

1. A short, actionable recommendation for improving resilience
2. A thoughtful cost-benefit analysis of the current design vs. possible improvements

--- DESIGN INPUT ---
• Neighborhood: {neighborhood_name}
• Base Flood Elevation (BFE): {bfe} ft ±{uncertainty} ft
• Foundation Type: {foundation}
• Elevation: {elevation} ft
• Material: {material} — {material_description}
• Mitigation Features:
{selected_features}

--- SIMULATION OUTPUT ---
• Resilience Score: {score}/100
• Projected Safe Until: {cutoff_year}
• Score Breakdown:
  - Foundation: {b_foundation}
  - Elevation: {b_elevation}
  - Material: {b_material}
  - Mitigation: {b_mitigation}

---
[DESIGN OPTIONS]
• Foundation Types:
{foundation_options}

• Materials:
{material_options}

• Flood Mitigation Features:
{mitigation_options}

[EXTREME FLOOD SCENARIO]
• Max projected flood level (BFE + sea level rise): {worst_case:.2} ft (based on \"{worst_case_scenario}\")

---
[COST & DURABILITY CONTEXT]
{COST_AND_DURABILITY_CONTEXT}

---

Please respond in this format:

1. {RECOMMENDATION_HEADING}:
Consider the available options, the design input and output, and the uncertainty (worst case flood scenario).
Be specific about how much elevation is needed to withstand future floods.
If the design already achieves a resilience score close to 100 and withstands flood projections through the final modeled year, avoid recommending major changes and minimize additional cost.
<one paragraph>

2. {COST_BENEFIT_HEADING}:
Consider how to achieve a reasonable resilience score while minimizing the potential design cost.
<one paragraph>
",
        neighborhood_name = input.neighborhood,
        bfe = neighborhood.base_flood_elevation_ft,
        uncertainty = neighborhood.uncertainty_ft,
        foundation = input.foundation_type,
        elevation = input.elevation_ft,
        material = input.material,
        score = assessment.resilience_score,
        cutoff_year = assessment.cutoff_year,
        b_foundation = breakdown.foundation,
        b_elevation = breakdown.elevation,
        b_material = breakdown.material,
        b_mitigation = breakdown.mitigation,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::input::{FoundationType, Material, MitigationFeature};
    use std::collections::BTreeSet;

    fn sample_input() -> BuildingInput {
        BuildingInput {
            foundation_type: FoundationType::Pier,
            elevation_ft: 12.0,
            material: Material::Concrete,
            mitigation_features: BTreeSet::from([MitigationFeature::SumpPump]),
            neighborhood: "Lakeview".to_string(),
        }
    }

    fn sample_assessment() -> AssessmentSummary {
        AssessmentSummary {
            breakdown: ScoreBreakdown {
                foundation: 20,
                elevation: 0,
                material: 25,
                mitigation: 8,
            },
            resilience_score: 53,
            cutoff_year: 2050,
        }
    }

    #[test]
    fn prompt_renders_input_and_scores() {
        let reference = ReferenceData::builtin().unwrap();
        let prompt =
            build_prompt(&sample_input(), &sample_assessment(), &reference, "1.0 - HIGH").unwrap();

        assert!(prompt.contains("• Neighborhood: Lakeview"));
        assert!(prompt.contains("Base Flood Elevation (BFE): 7 ft ±0.5 ft"));
        assert!(prompt.contains("• Foundation Type: pier"));
        assert!(prompt.contains("• Elevation: 12 ft"));
        assert!(prompt.contains("concrete — Concrete is highly resistant to flooding."));
        assert!(prompt.contains("  - sumpPump: Removes water from basements or crawl spaces."));
        assert!(prompt.contains("• Resilience Score: 53/100"));
        assert!(prompt.contains("• Projected Safe Until: 2050"));
        assert!(prompt.contains("  - Mitigation: 8"));
    }

    #[test]
    fn prompt_lists_every_catalog_option() {
        let reference = ReferenceData::builtin().unwrap();
        let prompt =
            build_prompt(&sample_input(), &sample_assessment(), &reference, "1.0 - HIGH").unwrap();

        for foundation in FoundationType::ALL {
            assert!(prompt.contains(&format!("  - {} (score: ", foundation)));
        }
        for material in Material::ALL {
            assert!(prompt.contains(&format!("  - {} (", material)));
        }
        for feature in MitigationFeature::ALL {
            assert!(prompt.contains(&format!("  - {} (", feature)));
        }
    }

    #[test]
    fn prompt_reports_worst_case_flood_line() {
        let reference = ReferenceData::builtin().unwrap();
        // 2.85 ft maximum rise on top of Lower9thWard's 8.0 ft BFE.
        assert!((worst_case_flood_line_ft(&reference, "1.0 - HIGH").unwrap() - 10.85).abs() < 1e-9);

        let prompt =
            build_prompt(&sample_input(), &sample_assessment(), &reference, "1.0 - HIGH").unwrap();
        assert!(prompt.contains("10.85 ft (based on \"1.0 - HIGH\")"));
    }

    #[test]
    fn prompt_embeds_the_two_part_response_contract() {
        let reference = ReferenceData::builtin().unwrap();
        let prompt =
            build_prompt(&sample_input(), &sample_assessment(), &reference, "1.0 - HIGH").unwrap();

        assert!(prompt.contains("\n1. Design Recommendation:\n"));
        assert!(prompt.contains("\n2. Cost-Benefit Analysis:\n"));
        assert!(prompt.contains("[COST & DURABILITY CONTEXT]"));
    }

    #[test]
    fn prompt_is_deterministic() {
        let reference = ReferenceData::builtin().unwrap();
        let first =
            build_prompt(&sample_input(), &sample_assessment(), &reference, "1.0 - HIGH").unwrap();
        let second =
            build_prompt(&sample_input(), &sample_assessment(), &reference, "1.0 - HIGH").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn design_without_features_says_none() {
        let reference = ReferenceData::builtin().unwrap();
        let mut input = sample_input();
        input.mitigation_features.clear();
        let prompt = build_prompt(&input, &sample_assessment(), &reference, "1.0 - HIGH").unwrap();
        assert!(prompt.contains("• Mitigation Features:\n  - none\n"));
    }

    #[test]
    fn unknown_worst_case_scenario_is_an_error() {
        let reference = ReferenceData::builtin().unwrap();
        let result = build_prompt(&sample_input(), &sample_assessment(), &reference, "nope");
        assert!(matches!(result, Err(EngineError::UnknownScenario(_))));
    }
}
