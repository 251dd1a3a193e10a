//! Manifest commands

use std::path::PathBuf;

use clap::Subcommand;
use diamond_manifest::{plan_upgrade, Manifest, ManifestInput, RoutingCommitment, Signature};
use diamond_types::{hex, Selector};
use serde::Serialize;
use tabled::Tabled;
use tracing::info;

use crate::error::{CliError, CliResult};
use crate::exit;
use crate::output::{print_field, print_info, print_output, print_single, print_success, OutputFormat};

/// Manifest subcommands
#[derive(Debug, Subcommand)]
pub enum ManifestCommands {
    /// Build and seal a manifest from facet definitions
    Build {
        /// Facet definitions: `{version, addresses?, facets[]}`
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: PathBuf,
    },

    /// Recompute leaves and root and compare with the stored values
    Verify {
        #[arg(long)]
        manifest: PathBuf,
    },

    /// Inclusion proof for one selector's route
    Proof {
        #[arg(long)]
        manifest: PathBuf,

        #[arg(long)]
        selector: String,
    },

    /// Facet cuts that upgrade one manifest version to the next
    Diff {
        #[arg(long)]
        from: PathBuf,

        #[arg(long)]
        to: PathBuf,
    },

    /// Commit a manifest's root and digest for a future epoch
    Commit {
        #[arg(long)]
        manifest: PathBuf,

        #[arg(long)]
        epoch: u64,

        /// Epoch currently active on the dispatcher
        #[arg(long)]
        active_epoch: u64,
    },

    /// Canonical form and selector of a function signature
    Selector {
        /// e.g. `transfer(address, uint256)`
        signature: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct RouteRow {
    #[tabled(rename = "Selector")]
    selector: Selector,
    #[tabled(rename = "Facet")]
    facet: String,
}

#[derive(Debug, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct CutRow {
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Facet")]
    facet_address: String,
    #[tabled(rename = "Selectors")]
    selectors: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ManifestSummary {
    version: String,
    routes: usize,
    facets: usize,
    merkle_root: String,
    digest: String,
}

impl ManifestSummary {
    fn of(manifest: &Manifest) -> CliResult<Self> {
        Ok(Self {
            version: manifest.version.clone(),
            routes: manifest.routes.len(),
            facets: manifest.facet_addresses().len(),
            merkle_root: hex::encode_hash(&manifest.merkle_root),
            digest: hex::encode_hash(&manifest.digest()?),
        })
    }

    fn print_human(&self) {
        print_field("Version", &self.version);
        print_field("Routes", self.routes);
        print_field("Facets", self.facets);
        print_field("Merkle root", &self.merkle_root);
        print_field("Digest", &self.digest);
    }
}

fn route_rows(manifest: &Manifest) -> Vec<RouteRow> {
    manifest
        .routes
        .iter()
        .map(|route| RouteRow {
            selector: route.selector,
            facet: manifest.facet_label(route.facet),
        })
        .collect()
}

/// Execute a manifest command
pub fn execute(command: ManifestCommands, format: OutputFormat) -> CliResult<i32> {
    match command {
        ManifestCommands::Build { input, output } => {
            let json = std::fs::read_to_string(&input).map_err(|source| CliError::Read {
                path: input.clone(),
                source,
            })?;
            let definitions: ManifestInput = serde_json::from_str(&json)?;
            let manifest = definitions.into_builder().build()?.seal();
            manifest.save(&output)?;
            info!(output = %output.display(), routes = manifest.routes.len(), "Manifest built");

            let summary = ManifestSummary::of(&manifest)?;
            if format.is_human() {
                print_success(&format!("Wrote {}", output.display()));
                summary.print_human();
            } else {
                print_single(&summary, format)?;
            }
            Ok(exit::PASS)
        }

        ManifestCommands::Verify { manifest: path } => {
            let manifest = Manifest::load(&path)?;
            let summary = ManifestSummary::of(&manifest)?;
            if format.is_human() {
                print_success(&format!("Manifest {} verified", manifest.version));
                summary.print_human();
                println!();
                print_output(route_rows(&manifest), format)?;
            } else {
                print_single(&summary, format)?;
            }
            Ok(exit::PASS)
        }

        ManifestCommands::Proof {
            manifest: path,
            selector: raw,
        } => {
            let manifest = Manifest::load(&path)?;
            let selector: Selector = raw.parse()?;
            let proof = manifest.proof_for(selector)?;
            if format.is_human() {
                print_field("Selector", proof.selector);
                print_field("Facet", manifest.facet_label(proof.facet));
                print_field("Index", proof.index);
                print_field("Leaf", hex::encode_hash(&proof.leaf));
                print_field("Root", hex::encode_hash(&proof.root));
                println!("Proof:");
                for sibling in &proof.proof {
                    println!("  {}", hex::encode_hash(sibling));
                }
                if proof.verify() {
                    print_success("Proof verifies against the root");
                }
            } else {
                print_single(&proof, format)?;
            }
            Ok(exit::PASS)
        }

        ManifestCommands::Diff { from, to } => {
            let previous = Manifest::load(&from)?;
            let next = Manifest::load(&to)?;
            let plan = plan_upgrade(&previous, &next)?;
            if format.is_human() {
                print_info(&format!(
                    "{} -> {}: {} cuts, {} selectors unchanged",
                    plan.from_version,
                    plan.to_version,
                    plan.cuts.len(),
                    plan.unchanged
                ));
                let rows: Vec<CutRow> = plan
                    .cuts
                    .iter()
                    .map(|cut| CutRow {
                        action: cut.action.to_string(),
                        facet_address: hex::encode_address(&cut.facet_address),
                        selectors: cut
                            .selectors
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join(" "),
                    })
                    .collect();
                print_output(rows, format)?;
            } else {
                print_single(&plan, format)?;
            }
            Ok(exit::PASS)
        }

        ManifestCommands::Commit {
            manifest: path,
            epoch,
            active_epoch,
        } => {
            let manifest = Manifest::load(&path)?;
            let commitment = RoutingCommitment::new(&manifest, epoch, active_epoch)?;
            if format.is_human() {
                print_field("Version", &commitment.version);
                print_field("Merkle root", hex::encode_hash(&commitment.merkle_root));
                print_field("Digest", hex::encode_hash(&commitment.manifest_digest));
                print_field("Epoch", commitment.epoch);
            } else {
                print_single(&commitment, format)?;
            }
            Ok(exit::PASS)
        }

        ManifestCommands::Selector { signature } => {
            let parsed = Signature::parse(&signature)?;
            let canonical = parsed.canonical();
            let selector = parsed.selector();
            if format.is_human() {
                print_field("Signature", &canonical);
                print_field("Selector", selector);
            } else {
                print_single(
                    &serde_json::json!({ "signature": canonical, "selector": selector }),
                    format,
                )?;
            }
            Ok(exit::PASS)
        }
    }
}
