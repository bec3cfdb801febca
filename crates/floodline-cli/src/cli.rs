use clap::{Args, Parser, Subcommand, ValueEnum};
use floodline::core::models::input::{FoundationType, Material, MitigationFeature};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Floodline Contributors",
    version,
    about = "Floodline CLI - estimate a building design's flood resilience score, safe-until year, and design narrative.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score a design, project its safe-until year, and generate a recommendation.
    Simulate(SimulateArgs),
    /// Print the narrative prompt for a design without contacting the provider.
    Prompt(PromptArgs),
    /// Inspect or export the reference dataset.
    Data(DataArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// The building design under evaluation.
/// Flags override the matching fields of `--input`.
#[derive(Args, Debug, Default)]
pub struct DesignArgs {
    /// Path to a design file (TOML, or JSON when the extension is `.json`).
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Foundation type: slab, pier or elevated.
    #[arg(long, value_name = "TYPE")]
    pub foundation: Option<FoundationType>,

    /// Elevation of the structure in feet, on the same datum as the base flood elevation.
    #[arg(short, long, value_name = "FEET", allow_negative_numbers = true)]
    pub elevation: Option<f64>,

    /// Primary material: wood, metal, concrete or composite.
    #[arg(short, long, value_name = "MATERIAL")]
    pub material: Option<Material>,

    /// Mitigation feature to include; repeat for several (e.g. --feature flood-vents).
    #[arg(long = "feature", value_name = "FEATURE")]
    pub features: Vec<MitigationFeature>,

    /// Neighborhood name as listed by `floodline data list`.
    #[arg(short, long, value_name = "NAME")]
    pub neighborhood: Option<String>,
}

/// Custom reference tables; both files must be given together.
#[derive(Args, Debug, Default, Clone)]
pub struct ReferenceArgs {
    /// Catalog of foundation, material, mitigation and neighborhood tables (TOML).
    #[arg(long, value_name = "PATH", requires = "scenarios")]
    pub catalog: Option<PathBuf>,

    /// Sea-level-rise projections with columns scenario,year,rise_ft (CSV).
    #[arg(long, value_name = "PATH", requires = "catalog")]
    pub scenarios: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Sea-level-rise scenario used for the safe-until projection.
    #[arg(short, long, value_name = "NAME")]
    pub scenario: Option<String>,

    #[command(flatten)]
    pub reference: ReferenceArgs,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S narrative.timeout-secs=20
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

#[derive(Args, Debug, Default)]
pub struct NarrativeArgs {
    /// Skip the narrative provider and report fallback texts.
    #[arg(long)]
    pub offline: bool,

    /// Override the provider model name.
    #[arg(long, value_name = "NAME")]
    pub model: Option<String>,

    /// Override the narrative time budget in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}

/// Arguments for the `simulate` subcommand.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub design: DesignArgs,

    #[command(flatten)]
    pub settings: SettingsArgs,

    #[command(flatten)]
    pub narrative: NarrativeArgs,

    /// Output format for the simulation result.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the `prompt` subcommand.
#[derive(Args, Debug)]
pub struct PromptArgs {
    #[command(flatten)]
    pub design: DesignArgs,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

/// Arguments for the `data` subcommand.
#[derive(Args, Debug)]
pub struct DataArgs {
    #[command(subcommand)]
    pub command: DataCommands,
}

#[derive(Subcommand, Debug)]
pub enum DataCommands {
    /// List neighborhoods, design options and scenarios in the reference dataset.
    List {
        #[command(flatten)]
        reference: ReferenceArgs,
    },
    /// Write the built-in dataset to a directory as catalog.toml and scenarios.csv.
    Export {
        /// Directory to write into; created if missing.
        #[arg(required = true, value_name = "DIR")]
        dir: PathBuf,

        /// Overwrite existing files.
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulate_parses_design_flags() {
        let cli = Cli::parse_from([
            "floodline",
            "simulate",
            "--foundation",
            "elevated",
            "-e",
            "16",
            "-m",
            "concrete",
            "--feature",
            "flood-vents",
            "--feature",
            "sumpPump",
            "-n",
            "Bywater",
            "--offline",
            "-f",
            "json",
        ]);
        let Commands::Simulate(args) = cli.command else {
            panic!("Expected 'simulate' subcommand");
        };
        assert_eq!(args.design.foundation, Some(FoundationType::Elevated));
        assert_eq!(args.design.elevation, Some(16.0));
        assert_eq!(args.design.material, Some(Material::Concrete));
        assert_eq!(
            args.design.features,
            vec![MitigationFeature::FloodVents, MitigationFeature::SumpPump]
        );
        assert!(args.narrative.offline);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn invalid_enum_value_is_rejected() {
        let result = Cli::try_parse_from(["floodline", "simulate", "--material", "straw"]);
        assert!(result.is_err());
    }

    #[test]
    fn catalog_requires_scenarios() {
        let result = Cli::try_parse_from(["floodline", "prompt", "--catalog", "c.toml"]);
        assert!(result.is_err());

        let cli = Cli::parse_from([
            "floodline",
            "data",
            "list",
            "--catalog",
            "c.toml",
            "--scenarios",
            "s.csv",
        ]);
        let Commands::Data(DataArgs {
            command: DataCommands::List { reference },
        }) = cli.command
        else {
            panic!("Expected 'data list' subcommand");
        };
        assert_eq!(reference.catalog, Some(PathBuf::from("c.toml")));
    }

    #[test]
    fn negative_elevation_reaches_validation() {
        let cli = Cli::parse_from(["floodline", "prompt", "--elevation", "-2"]);
        let Commands::Prompt(args) = cli.command else {
            panic!("Expected 'prompt' subcommand");
        };
        assert_eq!(args.design.elevation, Some(-2.0));
    }
}
