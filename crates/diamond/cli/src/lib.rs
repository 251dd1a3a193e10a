//! Diamond CLI - deterministic deployment and routing verification
//!
//! Terminal interface to:
//! - Compute selectors, salts and CREATE2 addresses
//! - Build, verify, prove and diff routing manifests
//! - Validate two-phase addresses across a network registry
//! - Gate a deployed dispatcher against its manifest
//!
//! Every command returns a process exit code; see [`exit`].

#![deny(unsafe_code)]

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod commands;
pub mod config;
pub mod error;
pub mod exit;
pub mod output;

use commands::{crosschain, gate, manifest, predict};
pub use config::CliConfig;
pub use error::{CliError, CliResult};
pub use output::OutputFormat;

/// Diamond CLI application
#[derive(Debug, Parser)]
#[command(name = "diamond")]
#[command(about = "Diamond - deterministic deployment and routing verification", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "DIAMOND_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output format (human, json, yaml)
    #[arg(short, long, value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Predict salts and CREATE2 addresses
    Predict {
        #[command(subcommand)]
        command: predict::PredictCommands,
    },

    /// Build, verify, prove and diff routing manifests
    Manifest {
        #[command(subcommand)]
        command: manifest::ManifestCommands,
    },

    /// Validate two-phase addresses across a network registry
    Crosschain(crosschain::CrossChainArgs),

    /// Check a deployed dispatcher against its manifest
    Gate(gate::GateArgs),

    /// Show the resolved configuration
    Config,
}

/// Run the CLI with the process arguments.
pub async fn run() -> CliResult<i32> {
    run_with_args(std::env::args_os()).await
}

/// Run the CLI with explicit arguments, returning the exit code.
pub async fn run_with_args<I, T>(args: I) -> CliResult<i32>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    // Logs go to stderr so stdout stays machine-readable
    let filter = if cli.verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();

    let config = CliConfig::load(cli.config.as_deref())?;
    let format = cli.format;

    match cli.command {
        Commands::Predict { command } => predict::execute(command, &config, format),
        Commands::Manifest { command } => manifest::execute(command, format),
        Commands::Crosschain(args) => crosschain::execute(args, &config, format).await,
        Commands::Gate(args) => gate::execute(args, &config, format).await,
        Commands::Config => {
            if format.is_human() {
                let path = match &cli.config {
                    Some(path) => path.clone(),
                    None => CliConfig::default_config_path()?,
                };
                output::print_field("Config", path.display());
                println!("{}", toml::to_string_pretty(&config)?);
            } else {
                output::print_single(&config, format)?;
            }
            Ok(exit::PASS)
        }
    }
}
