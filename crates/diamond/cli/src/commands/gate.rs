//! Routing compliance gate command

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use colored::*;
use diamond_gate::{ComplianceGate, GateConfig, GateReport};
use diamond_manifest::Manifest;
use diamond_probe::{NetworkProbe, RpcProbe};
use diamond_types::hex;
use tabled::Tabled;

use crate::commands::parse_address;
use crate::config::{rpc_env_var, CliConfig};
use crate::error::{CliError, CliResult};
use crate::output::{
    colorize_status, print_error, print_field, print_output, print_single, print_success,
    OutputFormat,
};

/// Compliance gate arguments
#[derive(Debug, Args)]
pub struct GateArgs {
    #[arg(long)]
    manifest: PathBuf,

    /// Deployed dispatcher
    #[arg(long, required_unless_present = "static_only")]
    diamond: Option<String>,

    /// Network name used to find the endpoint
    #[arg(long, required_unless_present = "static_only")]
    network: Option<String>,

    /// Endpoint, overriding the configuration
    #[arg(long)]
    rpc_url: Option<String>,

    /// Runtime size that triggers a warning
    #[arg(long)]
    soft_limit: Option<usize>,

    /// Runtime size that fails
    #[arg(long)]
    hard_limit: Option<usize>,

    /// Unknown results fail, and the first hard failure stops observation
    #[arg(long, conflicts_with = "lenient")]
    strict: bool,

    /// Unknown results pass (default)
    #[arg(long)]
    lenient: bool,

    /// Check declared sizes only, without a live system
    #[arg(long = "static", conflicts_with_all = ["diamond", "network", "rpc_url"])]
    static_only: bool,
}

#[derive(Debug, serde::Serialize, Tabled)]
struct CheckView {
    #[tabled(rename = "Gate")]
    gate: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Violations")]
    violations: usize,
    #[tabled(rename = "Warnings")]
    warnings: usize,
    #[tabled(rename = "Exit")]
    exit_code: i32,
}

/// Execute the gate command
pub async fn execute(args: GateArgs, config: &CliConfig, format: OutputFormat) -> CliResult<i32> {
    let manifest = Manifest::load(&args.manifest)?;

    let mut limits = config.size_limits();
    if let Some(soft) = args.soft_limit {
        limits.soft_limit = soft;
    }
    if let Some(hard) = args.hard_limit {
        limits.hard_limit = hard;
    }
    let gate = ComplianceGate::new(
        GateConfig::default()
            .with_limits(limits)
            .with_concurrency(config.gate.concurrency)
            .with_strict(args.strict && !args.lenient)
            .with_probe(config.probe_config()),
    )?;

    let report = if args.static_only {
        gate.run_static(&manifest)?
    } else {
        let (Some(diamond), Some(network)) = (args.diamond, args.network) else {
            return Err(CliError::InvalidInput(
                "--diamond and --network are required unless --static is given".into(),
            ));
        };
        let diamond = parse_address("diamond", &diamond)?;
        let url = args
            .rpc_url
            .or_else(|| config.rpc_url(&network))
            .ok_or_else(|| {
                CliError::Config(format!(
                    "No RPC endpoint for network {network}: set [networks.{network}] rpc_url or {}",
                    rpc_env_var(&network)
                ))
            })?;
        let probe: Arc<dyn NetworkProbe> = Arc::new(RpcProbe::new(network, url));
        gate.run(&manifest, diamond, probe).await?
    };

    if format.is_human() {
        print_human(&report)?;
    } else {
        print_single(&report, format)?;
    }
    Ok(report.exit_code())
}

fn print_human(report: &GateReport) -> CliResult<()> {
    if let Some(network) = &report.network {
        print_field("Network", network);
    }
    if let Some(diamond) = &report.diamond {
        print_field("Diamond", diamond);
    }
    print_field("Manifest", &report.manifest_version);
    print_field("Merkle root", hex::encode_hash(&report.merkle_root));
    print_field("Mode", if report.strict { "strict" } else { "lenient" });
    println!();

    let rows: Vec<CheckView> = report
        .checks
        .iter()
        .map(|check| CheckView {
            gate: check.gate.to_string(),
            status: check.status.to_string(),
            violations: check.violations.len(),
            warnings: check.warnings.len(),
            exit_code: check.gate.exit_code(),
        })
        .collect();
    print_output(rows, OutputFormat::Human)?;
    println!();

    for check in &report.checks {
        let details = check.violations.len() + check.unknowns.len() + check.warnings.len();
        if details == 0 {
            continue;
        }
        println!("{} [{}]", check.gate.to_string().bold(), colorize_status(check.status));
        for violation in &check.violations {
            println!("  {} {}", "✗".red(), violation);
        }
        for unknown in &check.unknowns {
            println!("  {} {}", "?".magenta(), unknown);
        }
        for warning in &check.warnings {
            println!("  {} {}", "⚠".yellow(), warning);
        }
    }
    if report.cancelled {
        println!("{}", "Strict mode stopped observation early".dimmed());
    }

    if report.passed() {
        print_success("Routing compliance gate passed");
    } else {
        let failed: Vec<String> = report.failed_gates().iter().map(ToString::to_string).collect();
        print_error(&format!(
            "Routing compliance gate failed: {} (exit {})",
            failed.join(", "),
            report.exit_code()
        ));
    }
    Ok(())
}
