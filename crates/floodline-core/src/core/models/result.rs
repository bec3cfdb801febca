use serde::{Deserialize, Serialize};

pub const MAX_RESILIENCE_SCORE: u32 = 100;

/// Per-component contributions to the resilience score, before capping.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub foundation: u32,
    pub elevation: u32,
    pub material: u32,
    pub mitigation: u32,
}

impl ScoreBreakdown {
    /// Sum of the four components, saturating at `u32::MAX`.
    pub fn raw_total(&self) -> u32 {
        [self.elevation, self.material, self.mitigation]
            .into_iter()
            .fold(self.foundation, u32::saturating_add)
    }

    /// Composite score: the raw total clamped to [`MAX_RESILIENCE_SCORE`].
    pub fn composite(&self) -> u32 {
        self.raw_total().min(MAX_RESILIENCE_SCORE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub resilience_score: u32,
    pub cutoff_year: i32,
    pub material_risk_score: u32,
    pub recommendation: String,
    pub cost_benefit_analysis: String,
    pub breakdown: ScoreBreakdown,
}
