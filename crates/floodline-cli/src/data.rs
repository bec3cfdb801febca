use crate::config::ReferenceSource;
use crate::error::{CliError, Result};
use floodline::core::reference::{BUILTIN_CATALOG, BUILTIN_SCENARIOS, ReferenceData};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CATALOG_FILE_NAME: &str = "catalog.toml";
pub const SCENARIOS_FILE_NAME: &str = "scenarios.csv";

pub fn load_reference(source: &ReferenceSource) -> Result<ReferenceData> {
    let reference = match source {
        ReferenceSource::Builtin => {
            debug!("Using the built-in reference dataset.");
            ReferenceData::builtin()?
        }
        ReferenceSource::Files { catalog, scenarios } => {
            info!(
                "Loading reference data from {:?} and {:?}.",
                catalog, scenarios
            );
            ReferenceData::load(catalog, scenarios)?
        }
    };
    debug!(
        "Reference data ready: {} neighborhoods, {} scenarios.",
        reference.neighborhoods.len(),
        reference.scenarios.len()
    );
    Ok(reference)
}

/// Writes the built-in dataset into `dir`, refusing to replace existing
/// files unless `force` is set. Returns the written paths.
pub fn export_builtin(dir: &Path, force: bool) -> Result<Vec<PathBuf>> {
    let files = [
        (dir.join(CATALOG_FILE_NAME), BUILTIN_CATALOG),
        (dir.join(SCENARIOS_FILE_NAME), BUILTIN_SCENARIOS),
    ];

    if !force {
        if let Some((existing, _)) = files.iter().find(|(path, _)| path.exists()) {
            return Err(CliError::Data(format!(
                "{:?} already exists. Use --force to overwrite.",
                existing
            )));
        }
    }

    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(files.len());
    for (path, content) in files {
        fs::write(&path, content)?;
        info!("Wrote {:?}", path);
        written.push(path);
    }
    Ok(written)
}
