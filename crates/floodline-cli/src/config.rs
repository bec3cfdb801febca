mod defaults;

use crate::cli::{NarrativeArgs, ReferenceArgs, SettingsArgs};
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use floodline::engine::config::{SimulationConfig, SimulationConfigBuilder};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialSimulationConfig {
    scenario: Option<String>,
    #[serde(rename = "worst-case-scenario")]
    worst_case_scenario: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialNarrativeConfig {
    enabled: Option<bool>,
    endpoint: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    #[serde(rename = "max-tokens")]
    max_tokens: Option<u32>,
    #[serde(rename = "timeout-secs")]
    timeout_secs: Option<u64>,
    #[serde(rename = "api-key-env")]
    api_key_env: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialReferenceConfig {
    catalog: Option<PathBuf>,
    scenarios: Option<PathBuf>,
}

/// Connection settings for the chat-completions narrative provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReferenceSource {
    #[default]
    Builtin,
    Files {
        catalog: PathBuf,
        scenarios: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
    pub provider: ProviderConfig,
    pub reference: ReferenceSource,
}

impl AppConfig {
    /// Loads `--config` when given and merges it with the remaining flags.
    pub fn resolve(settings: &SettingsArgs, narrative: Option<&NarrativeArgs>) -> Result<Self> {
        let partial = match &settings.config {
            Some(path) => PartialAppConfig::from_file(path)?,
            None => PartialAppConfig::default(),
        };
        partial.merge_with_cli(settings, narrative)
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialAppConfig {
    simulation: Option<PartialSimulationConfig>,
    narrative: Option<PartialNarrativeConfig>,
    reference: Option<PartialReferenceConfig>,
    /// Directory that relative `[reference]` paths are resolved against.
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl PartialAppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut partial: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        partial.base_dir = path.parent().map(Path::to_path_buf);
        Ok(partial)
    }

    pub fn merge_with_cli(
        mut self,
        settings: &SettingsArgs,
        narrative: Option<&NarrativeArgs>,
    ) -> Result<AppConfig> {
        self.apply_set_values(&settings.set_values)?;

        let defaults = DefaultsConfig::default();
        let sim_config = self.simulation.take().unwrap_or_default();
        let narrative_config = self.narrative.take().unwrap_or_default();
        let reference_config = self.reference.take().unwrap_or_default();
        let offline = narrative.is_some_and(|n| n.offline);

        let timeout_secs = narrative
            .and_then(|n| n.timeout_secs)
            .or(narrative_config.timeout_secs)
            .unwrap_or(defaults.timeout_secs);

        let simulation = SimulationConfigBuilder::new()
            .scenario(
                settings
                    .scenario
                    .clone()
                    .or(sim_config.scenario)
                    .unwrap_or(defaults.scenario),
            )
            .worst_case_scenario(
                sim_config
                    .worst_case_scenario
                    .unwrap_or(defaults.worst_case_scenario),
            )
            .narrative_timeout(Duration::from_secs(timeout_secs))
            .narrative_max_tokens(narrative_config.max_tokens.unwrap_or(defaults.max_tokens))
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        let provider = ProviderConfig {
            enabled: !offline
                && narrative_config
                    .enabled
                    .unwrap_or(defaults.narrative_enabled),
            endpoint: narrative_config.endpoint.unwrap_or(defaults.endpoint),
            model: narrative
                .and_then(|n| n.model.clone())
                .or(narrative_config.model)
                .unwrap_or(defaults.model),
            temperature: narrative_config.temperature.unwrap_or(defaults.temperature),
            api_key_env: narrative_config.api_key_env.unwrap_or(defaults.api_key_env),
        };

        let reference = Self::merge_reference(
            &settings.reference,
            reference_config,
            self.base_dir.as_deref(),
        )?;

        Ok(AppConfig {
            simulation,
            provider,
            reference,
        })
    }

    fn merge_reference(
        cli: &ReferenceArgs,
        file: PartialReferenceConfig,
        base_dir: Option<&Path>,
    ) -> Result<ReferenceSource> {
        if let (Some(catalog), Some(scenarios)) = (&cli.catalog, &cli.scenarios) {
            return Ok(ReferenceSource::Files {
                catalog: catalog.clone(),
                scenarios: scenarios.clone(),
            });
        }

        let resolve = |path: PathBuf| match base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path,
        };

        match (file.catalog, file.scenarios) {
            (None, None) => Ok(ReferenceSource::Builtin),
            (Some(catalog), Some(scenarios)) => Ok(ReferenceSource::Files {
                catalog: resolve(catalog),
                scenarios: resolve(scenarios),
            }),
            _ => Err(CliError::Config(
                "`reference.catalog` and `reference.scenarios` must be set together.".to_string(),
            )),
        }
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "simulation.scenario" => {
                    self.simulation
                        .get_or_insert_with(Default::default)
                        .scenario = Some(value_str.to_string());
                }
                "simulation.worst-case-scenario" => {
                    self.simulation
                        .get_or_insert_with(Default::default)
                        .worst_case_scenario = Some(value_str.to_string());
                }
                "narrative.enabled" => {
                    self.narrative
                        .get_or_insert_with(Default::default)
                        .enabled = Some(parse_value(key, value_str, "boolean")?);
                }
                "narrative.endpoint" => {
                    self.narrative
                        .get_or_insert_with(Default::default)
                        .endpoint = Some(value_str.to_string());
                }
                "narrative.model" => {
                    self.narrative.get_or_insert_with(Default::default).model =
                        Some(value_str.to_string());
                }
                "narrative.temperature" => {
                    self.narrative
                        .get_or_insert_with(Default::default)
                        .temperature = Some(parse_value(key, value_str, "float")?);
                }
                "narrative.max-tokens" => {
                    self.narrative
                        .get_or_insert_with(Default::default)
                        .max_tokens = Some(parse_value(key, value_str, "integer")?);
                }
                "narrative.timeout-secs" => {
                    self.narrative
                        .get_or_insert_with(Default::default)
                        .timeout_secs = Some(parse_value(key, value_str, "integer")?);
                }
                "narrative.api-key-env" => {
                    self.narrative
                        .get_or_insert_with(Default::default)
                        .api_key_env = Some(value_str.to_string());
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value_str: &str, kind: &str) -> Result<T> {
    value_str.parse().map_err(|_| {
        CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value_str))
    })
}
