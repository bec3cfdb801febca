use crate::core::reference::ReferenceLoadError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Reference data has no {table} entry for '{key}'")]
    MissingReferenceData { table: &'static str, key: String },

    #[error("Unknown sea level scenario: '{0}'")]
    UnknownScenario(String),

    #[error("Sea level scenario '{0}' has no modeled years")]
    EmptyScenario(String),

    #[error("Reference data could not be loaded: {source}")]
    Reference {
        #[from]
        source: ReferenceLoadError,
    },
}

impl EngineError {
    pub(crate) fn missing(table: &'static str, key: impl Into<String>) -> Self {
        Self::MissingReferenceData {
            table,
            key: key.into(),
        }
    }
}
