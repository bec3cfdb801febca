use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Limits applied to the single narrative call made per simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrativeBudget {
    pub timeout: Duration,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Scenario used to project the cutoff year.
    pub scenario: String,
    /// Scenario whose maximum rise sets the prompt's worst-case flood level.
    pub worst_case_scenario: String,
    pub narrative: NarrativeBudget,
}

#[derive(Default)]
pub struct SimulationConfigBuilder {
    scenario: Option<String>,
    worst_case_scenario: Option<String>,
    narrative_timeout: Option<Duration>,
    narrative_max_tokens: Option<u32>,
}

impl SimulationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scenario(mut self, name: impl Into<String>) -> Self {
        self.scenario = Some(name.into());
        self
    }
    pub fn worst_case_scenario(mut self, name: impl Into<String>) -> Self {
        self.worst_case_scenario = Some(name.into());
        self
    }
    pub fn narrative_timeout(mut self, timeout: Duration) -> Self {
        self.narrative_timeout = Some(timeout);
        self
    }
    pub fn narrative_max_tokens(mut self, max_tokens: u32) -> Self {
        self.narrative_max_tokens = Some(max_tokens);
        self
    }

    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        let timeout = self
            .narrative_timeout
            .ok_or(ConfigError::MissingParameter("narrative_timeout"))?;
        if timeout.is_zero() {
            return Err(ConfigError::InvalidParameter {
                name: "narrative_timeout",
                reason: "must be greater than zero".to_string(),
            });
        }
        let max_tokens = self
            .narrative_max_tokens
            .ok_or(ConfigError::MissingParameter("narrative_max_tokens"))?;
        if max_tokens == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "narrative_max_tokens",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(SimulationConfig {
            scenario: self
                .scenario
                .ok_or(ConfigError::MissingParameter("scenario"))?,
            worst_case_scenario: self
                .worst_case_scenario
                .ok_or(ConfigError::MissingParameter("worst_case_scenario"))?,
            narrative: NarrativeBudget {
                timeout,
                max_tokens,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_builder() -> SimulationConfigBuilder {
        SimulationConfigBuilder::new()
            .scenario("1.0 - HIGH")
            .worst_case_scenario("1.0 - HIGH")
            .narrative_timeout(Duration::from_secs(10))
            .narrative_max_tokens(600)
    }

    #[test]
    fn builder_produces_config_when_all_parameters_set() {
        let config = complete_builder().build().unwrap();
        assert_eq!(config.scenario, "1.0 - HIGH");
        assert_eq!(config.narrative.timeout, Duration::from_secs(10));
        assert_eq!(config.narrative.max_tokens, 600);
    }

    #[test]
    fn builder_reports_first_missing_parameter() {
        let result = SimulationConfigBuilder::new()
            .narrative_timeout(Duration::from_secs(1))
            .narrative_max_tokens(10)
            .worst_case_scenario("x")
            .build();
        assert_eq!(result, Err(ConfigError::MissingParameter("scenario")));
    }

    #[test]
    fn builder_rejects_zero_budget() {
        let result = complete_builder().narrative_timeout(Duration::ZERO).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter {
                name: "narrative_timeout",
                ..
            })
        ));

        let result = complete_builder().narrative_max_tokens(0).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter {
                name: "narrative_max_tokens",
                ..
            })
        ));
    }
}
