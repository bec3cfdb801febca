use crate::cli::PromptArgs;
use crate::config::AppConfig;
use crate::error::Result;
use crate::{data, input};
use floodline::engine::progress::ProgressReporter;
use floodline::workflows::simulate;
use tracing::info;

pub async fn run(args: PromptArgs) -> Result<()> {
    let config = AppConfig::resolve(&args.settings, None)?;
    let input = input::resolve_design(&args.design)?;
    let reference = data::load_reference(&config.reference)?;

    info!("Assembling narrative prompt without contacting the provider.");
    let prepared = simulate::prepare(
        &input,
        &reference,
        &config.simulation,
        &ProgressReporter::new(),
    )?;

    println!("{}", prepared.prompt);
    Ok(())
}
