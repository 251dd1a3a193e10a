//! Cross-chain validation command

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use colored::*;
use diamond_address::{Artifact, TwoPhaseInputs};
use diamond_crosschain::{
    CrossChainOutcome, CrossChainReport, CrossChainValidator, NetworkRegistry, ValidatorConfig,
};
use diamond_probe::{NetworkProbe, RpcProbe};
use diamond_types::hex;
use tabled::Tabled;
use tracing::warn;

use crate::commands::{artifact_set, resolve_nonce, resolve_version};
use crate::config::{rpc_env_var, CliConfig};
use crate::error::CliResult;
use crate::exit;
use crate::output::{
    print_error, print_info, print_output, print_single, print_success, print_warning,
    OutputFormat,
};

/// Cross-chain validation arguments
#[derive(Debug, Args)]
pub struct CrossChainArgs {
    /// Network registry, JSON or YAML
    #[arg(long)]
    registry: PathBuf,

    #[arg(long)]
    factory_code: PathBuf,

    #[arg(long)]
    target_code: PathBuf,

    /// Stand-in when the target artifact is missing
    #[arg(long)]
    fallback_code: Option<PathBuf>,

    /// Permit the fallback to stand in
    #[arg(long, env = "DIAMOND_ALLOW_FALLBACK")]
    allow_fallback: bool,

    #[arg(long, env = "DIAMOND_VERSION")]
    version: Option<String>,

    #[arg(long, env = "DIAMOND_NONCE")]
    nonce: Option<String>,

    /// Runtime codehash a deployed target must have
    #[arg(long)]
    expected_target_codehash: Option<String>,

    /// Predict only, never contact an endpoint
    #[arg(long)]
    offline: bool,

    /// Stop at the first mismatch or unreachable network
    #[arg(long, conflicts_with = "lenient")]
    strict: bool,

    /// Report unreachable networks without failing (default)
    #[arg(long)]
    lenient: bool,

    /// Networks probed at the same time
    #[arg(long)]
    concurrency: Option<usize>,
}

#[derive(Debug, serde::Serialize, Tabled)]
struct RowView {
    #[tabled(rename = "Network")]
    network: String,
    #[tabled(rename = "Chain")]
    chain_id: u64,
    #[tabled(rename = "Deployer")]
    deployer: String,
    #[tabled(rename = "Factory")]
    factory: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Probes for every active network with a configured endpoint. Networks
/// left out are reported as unconfigured by the validator.
fn probes(registry: &NetworkRegistry, config: &CliConfig) -> HashMap<String, Arc<dyn NetworkProbe>> {
    let mut probes: HashMap<String, Arc<dyn NetworkProbe>> = HashMap::new();
    for entry in registry.active() {
        match config.rpc_url(&entry.network) {
            Some(url) => {
                let probe: Arc<dyn NetworkProbe> = Arc::new(RpcProbe::new(&entry.network, url));
                probes.insert(entry.network.clone(), probe);
            }
            None => warn!(
                network = %entry.network,
                env = %rpc_env_var(&entry.network),
                "No RPC endpoint configured"
            ),
        }
    }
    probes
}

/// Execute the crosschain command
pub async fn execute(args: CrossChainArgs, config: &CliConfig, format: OutputFormat) -> CliResult<i32> {
    let registry = NetworkRegistry::load(&args.registry)?;
    let inputs = TwoPhaseInputs {
        factory_init_code: Artifact::load(&args.factory_code)?.init_code,
        target: artifact_set(&args.target_code, args.fallback_code.as_deref())?,
        version: resolve_version(args.version, config)?,
        nonce: resolve_nonce(args.nonce, config)?,
        allow_fallback: args.allow_fallback || config.allow_fallback_artifact,
    };

    let mut validator_config = ValidatorConfig::default()
        .with_concurrency(args.concurrency.unwrap_or(config.gate.concurrency))
        .with_strict(args.strict && !args.lenient)
        .with_offline(args.offline)
        .with_probe(config.probe_config());
    if let Some(raw) = &args.expected_target_codehash {
        validator_config = validator_config.with_expected_target_codehash(hex::parse_hash(raw)?);
    }

    let mut validator = CrossChainValidator::new(validator_config);
    if !args.offline {
        validator = validator.with_probes(Arc::new(probes(&registry, config)));
    }
    let report = validator.validate(&registry, &inputs).await?;

    if format.is_human() {
        print_human(&report)?;
    } else {
        print_single(&report, format)?;
    }
    Ok(exit::crosschain(report.outcome()))
}

fn print_human(report: &CrossChainReport) -> CliResult<()> {
    let rows: Vec<RowView> = report
        .rows
        .iter()
        .map(|row| RowView {
            network: row.network.clone(),
            chain_id: row.chain_id,
            deployer: hex::encode_address(&row.deployer_address),
            factory: hex::encode_address(&row.predicted_factory_address),
            target: hex::encode_address(&row.predicted_target_address),
            status: row.status.to_string(),
        })
        .collect();
    print_output(rows, OutputFormat::Human)?;
    println!();

    for row in &report.rows {
        for finding in &row.findings {
            print_error(&format!("{}: {}", row.network, finding));
        }
        if let Some(error) = &row.error {
            print_warning(&format!("{}: {}", row.network, error));
        }
    }
    if !report.skipped.is_empty() {
        print_info(&format!("Skipped deprecated: {}", report.skipped.join(", ")));
    }
    if let Some(substitution) = &report.substitution {
        print_warning(&format!(
            "Target predicted from fallback {} in place of {}",
            substitution.fallback, substitution.primary
        ));
    }
    for recommendation in &report.recommendations {
        println!(
            "  {} {} {}",
            "→".cyan(),
            recommendation.network.bold(),
            recommendation.message
        );
    }
    if !report.recommendations.is_empty() {
        println!();
    }

    match report.outcome() {
        CrossChainOutcome::Consistent => {
            print_success("Factory and target addresses agree across all networks")
        }
        CrossChainOutcome::Inconsistent => print_error(&format!(
            "Cross-chain inconsistency (factory consistent: {}, target consistent: {})",
            report.consistent_factory, report.consistent_target
        )),
        CrossChainOutcome::Degraded => {
            print_warning("Strict run degraded: some networks could not be checked")
        }
    }
    Ok(())
}
