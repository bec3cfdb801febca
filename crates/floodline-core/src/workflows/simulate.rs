use crate::core::models::input::BuildingInput;
use crate::core::models::result::SimulationResult;
use crate::core::prompt::{self, AssessmentSummary};
use crate::core::reference::ReferenceData;
use crate::core::scoring::{self, ScoringResult};
use crate::core::timeline;
use crate::engine::config::SimulationConfig;
use crate::engine::error::EngineError;
use crate::engine::narrative::{
    Narrative, NarrativeError, NarrativeGenerator, NarrativeRequest, NarrativeStatus,
};
use crate::engine::progress::{Progress, ProgressReporter};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Everything a simulation computes before the narrative call.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSimulation {
    pub scoring: ScoringResult,
    pub cutoff_year: i32,
    pub material_risk_score: u32,
    pub prompt: String,
}

impl PreparedSimulation {
    pub fn into_result(self, narrative: Narrative) -> SimulationResult {
        SimulationResult {
            resilience_score: self.scoring.resilience_score,
            cutoff_year: self.cutoff_year,
            material_risk_score: self.material_risk_score,
            recommendation: narrative.recommendation,
            cost_benefit_analysis: narrative.cost_benefit_analysis,
            breakdown: self.scoring.breakdown,
        }
    }
}

/// Runs the deterministic part of a simulation: scoring, cutoff projection,
/// material risk and prompt assembly.
pub fn prepare(
    input: &BuildingInput,
    reference: &ReferenceData,
    config: &SimulationConfig,
    reporter: &ProgressReporter,
) -> Result<PreparedSimulation, EngineError> {
    let scored = reporter.phase("Scoring design", || scoring::evaluate(input, reference))?;
    info!(
        "Resilience score {} (raw {}).",
        scored.resilience_score,
        scored.breakdown.raw_total()
    );

    let cutoff_year = reporter.phase("Projecting flood timeline", || {
        let neighborhood = reference
            .neighborhood(&input.neighborhood)
            .ok_or_else(|| EngineError::missing("neighborhood", input.neighborhood.as_str()))?;
        timeline::project_cutoff_year(
            input.elevation_ft,
            neighborhood.base_flood_elevation_ft,
            &config.scenario,
            reference,
        )
    })?;
    info!(
        "Projected safe until {} under scenario '{}'.",
        cutoff_year, config.scenario
    );

    let material_risk_score = scoring::material_risk_score(input.material, reference);

    let assessment = AssessmentSummary {
        breakdown: scored.breakdown,
        resilience_score: scored.resilience_score,
        cutoff_year,
    };
    let prompt = prompt::build_prompt(input, &assessment, reference, &config.worst_case_scenario)?;
    debug!("Assembled narrative prompt ({} bytes).", prompt.len());

    Ok(PreparedSimulation {
        scoring: scored,
        cutoff_year,
        material_risk_score,
        prompt,
    })
}

/// Issues the single narrative call for a request under the configured
/// budget. Never fails: every failure mode resolves to fallback texts.
pub async fn narrate(
    prompt: &str,
    config: &SimulationConfig,
    generator: &dyn NarrativeGenerator,
) -> Narrative {
    let request = NarrativeRequest {
        prompt: prompt.to_string(),
        max_tokens: config.narrative.max_tokens,
        timeout: config.narrative.timeout,
    };

    let generation = tokio::time::timeout(request.timeout, generator.generate(&request))
        .await
        .unwrap_or(Err(NarrativeError::Timeout(request.timeout)));

    if let Err(e) = &generation {
        warn!("Narrative service degraded, using fallback texts: {}", e);
    }

    let narrative = Narrative::from_generation(generation);
    if narrative.status == NarrativeStatus::Partial {
        warn!("Narrative output was missing a section; substituted fallback text.");
    }
    narrative
}

#[instrument(skip_all, name = "simulation_workflow", fields(neighborhood = %input.neighborhood))]
pub async fn run(
    input: &BuildingInput,
    reference: &ReferenceData,
    config: &SimulationConfig,
    generator: &dyn NarrativeGenerator,
    reporter: &ProgressReporter<'_>,
) -> Result<SimulationResult, EngineError> {
    let prepared = prepare(input, reference, config, reporter)?;

    reporter.report(Progress::PhaseStart {
        name: "Generating narrative",
    });
    let narrative = narrate(&prepared.prompt, config, generator).await;
    reporter.report(Progress::PhaseFinish);

    if narrative.status != NarrativeStatus::Complete {
        reporter.report(Progress::Message(
            "Narrative generation was incomplete; fallback text substituted.".to_string(),
        ));
    }

    Ok(prepared.into_result(narrative))
}

/// Long-lived entry point holding the shared, read-only collaborators.
#[derive(Clone)]
pub struct Simulator {
    reference: Arc<ReferenceData>,
    config: SimulationConfig,
    generator: Arc<dyn NarrativeGenerator>,
}

impl Simulator {
    pub fn new(
        reference: Arc<ReferenceData>,
        config: SimulationConfig,
        generator: Arc<dyn NarrativeGenerator>,
    ) -> Self {
        Self {
            reference,
            config,
            generator,
        }
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub async fn simulate(&self, input: &BuildingInput) -> Result<SimulationResult, EngineError> {
        self.simulate_with_progress(input, &ProgressReporter::new())
            .await
    }

    pub async fn simulate_with_progress(
        &self,
        input: &BuildingInput,
        reporter: &ProgressReporter<'_>,
    ) -> Result<SimulationResult, EngineError> {
        run(
            input,
            &self.reference,
            &self.config,
            self.generator.as_ref(),
            reporter,
        )
        .await
    }
}
