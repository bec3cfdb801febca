//! Boundary to the external text generator that writes the design
//! recommendation and cost-benefit narrative.
//!
//! The generator is reached through [`NarrativeGenerator`]; its free-text
//! output is split by [`parse_narrative`], and [`Narrative::from_generation`]
//! applies the fallback texts so that a failed or malformed generation never
//! fails a simulation.

use crate::core::prompt::{COST_BENEFIT_HEADING, RECOMMENDATION_HEADING};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub const RECOMMENDATION_MISSING: &str = "No recommendation provided.";
pub const COST_BENEFIT_MISSING: &str = "No cost-benefit analysis provided.";
pub const RECOMMENDATION_UNAVAILABLE: &str = "Unable to generate recommendation at this time.";
pub const COST_BENEFIT_UNAVAILABLE: &str =
    "Unable to perform cost-benefit analysis due to an error.";

#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("Narrative generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Narrative transport failed: {0}")]
    Transport(String),

    #[error("Narrative provider returned status {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Narrative provider returned no text")]
    EmptyResponse,

    #[error("Narrative generation is disabled")]
    Disabled,
}

#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, request: &NarrativeRequest) -> Result<String, NarrativeError>;
}

/// Generator used when no provider is configured; every call fails with
/// [`NarrativeError::Disabled`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledGenerator;

#[async_trait]
impl NarrativeGenerator for DisabledGenerator {
    async fn generate(&self, _request: &NarrativeRequest) -> Result<String, NarrativeError> {
        Err(NarrativeError::Disabled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrativeSections {
    pub recommendation: String,
    pub cost_benefit_analysis: String,
}

/// Generator output that lacked at least one of the two sections. Each
/// variant keeps whichever section was found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedNarrativeOutput {
    #[error("Narrative output is missing the recommendation section")]
    MissingRecommendation { cost_benefit_analysis: String },

    #[error("Narrative output is missing the cost-benefit section")]
    MissingCostBenefit { recommendation: String },

    #[error("Narrative output is missing both sections")]
    MissingBoth,
}

impl MalformedNarrativeOutput {
    pub fn recommendation(&self) -> Option<&str> {
        match self {
            Self::MissingCostBenefit { recommendation } => Some(recommendation.as_str()),
            Self::MissingRecommendation { .. } | Self::MissingBoth => None,
        }
    }

    pub fn cost_benefit_analysis(&self) -> Option<&str> {
        match self {
            Self::MissingRecommendation {
                cost_benefit_analysis,
            } => Some(cost_benefit_analysis.as_str()),
            Self::MissingCostBenefit { .. } | Self::MissingBoth => None,
        }
    }

    /// Fills the missing section(s) with their fallback texts.
    pub fn into_sections_with_fallbacks(self) -> NarrativeSections {
        let (recommendation, cost_benefit_analysis) = match self {
            Self::MissingRecommendation {
                cost_benefit_analysis,
            } => (RECOMMENDATION_MISSING.to_string(), cost_benefit_analysis),
            Self::MissingCostBenefit { recommendation } => {
                (recommendation, COST_BENEFIT_MISSING.to_string())
            }
            Self::MissingBoth => (
                RECOMMENDATION_MISSING.to_string(),
                COST_BENEFIT_MISSING.to_string(),
            ),
        };
        NarrativeSections {
            recommendation,
            cost_benefit_analysis,
        }
    }
}

/// Splits generator output at the first line opening with `2.`.
///
/// A leading `1.`/`2.` marker, markdown emphasis and the section heading
/// are stripped from each part.
pub fn parse_narrative(text: &str) -> Result<NarrativeSections, MalformedNarrativeOutput> {
    let (first, second) = split_at_second_section(text);
    let recommendation = clean_section(first, '1', RECOMMENDATION_HEADING);
    let cost_benefit_analysis = second.and_then(|s| clean_section(s, '2', COST_BENEFIT_HEADING));

    match (recommendation, cost_benefit_analysis) {
        (Some(recommendation), Some(cost_benefit_analysis)) => Ok(NarrativeSections {
            recommendation,
            cost_benefit_analysis,
        }),
        (None, Some(cost_benefit_analysis)) => Err(MalformedNarrativeOutput::MissingRecommendation {
            cost_benefit_analysis,
        }),
        (Some(recommendation), None) => {
            Err(MalformedNarrativeOutput::MissingCostBenefit { recommendation })
        }
        (None, None) => Err(MalformedNarrativeOutput::MissingBoth),
    }
}

fn strip_markup(s: &str) -> &str {
    s.trim_start_matches(['#', '*', ' ', '\t'])
}

fn split_at_second_section(text: &str) -> (&str, Option<&str>) {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if strip_markup(line).starts_with("2.") {
            return (&text[..offset], Some(&text[offset..]));
        }
        offset += line.len();
    }
    (text, None)
}

fn clean_section(raw: &str, number: char, heading: &str) -> Option<String> {
    let mut text = strip_markup(raw.trim());
    if let Some(rest) = text.strip_prefix(number).and_then(|r| r.strip_prefix('.')) {
        text = strip_markup(rest);
    }
    if let Some(prefix) = text.get(..heading.len()) {
        if prefix.eq_ignore_ascii_case(heading) {
            text = text[heading.len()..].trim_start_matches([':', '*', ' ', '\t']);
        }
    }
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeStatus {
    Complete,
    Partial,
    Unavailable,
}

/// Narrative texts after the fallback policy has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narrative {
    pub recommendation: String,
    pub cost_benefit_analysis: String,
    pub status: NarrativeStatus,
}

impl Narrative {
    pub fn unavailable() -> Self {
        Self {
            recommendation: RECOMMENDATION_UNAVAILABLE.to_string(),
            cost_benefit_analysis: COST_BENEFIT_UNAVAILABLE.to_string(),
            status: NarrativeStatus::Unavailable,
        }
    }

    pub fn from_generation(generation: Result<String, NarrativeError>) -> Self {
        let text = match generation {
            Ok(text) => text,
            Err(_) => return Self::unavailable(),
        };
        match parse_narrative(&text) {
            Ok(sections) => Self {
                recommendation: sections.recommendation,
                cost_benefit_analysis: sections.cost_benefit_analysis,
                status: NarrativeStatus::Complete,
            },
            Err(partial) => {
                let sections = partial.into_sections_with_fallbacks();
                Self {
                    recommendation: sections.recommendation,
                    cost_benefit_analysis: sections.cost_benefit_analysis,
                    status: NarrativeStatus::Partial,
                }
            }
        }
    }
}
