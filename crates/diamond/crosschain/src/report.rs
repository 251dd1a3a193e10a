//! Per-network rows, recommendations and the aggregated cross-chain report.

use chrono::{DateTime, Utc};
use diamond_address::{Substitution, TwoPhasePrediction};
use diamond_probe::ProbeError;
use diamond_types::{hex, Address, CheckResult, CheckStatus, ValidationReport, B256};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::registry::RegistryEntry;

/// Where a network row ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    /// Prediction only, nothing was probed
    Predicted,
    /// Singleton, factory and target are all deployed as predicted
    Ready,
    /// Reachable, but deployment steps remain
    Pending,
    /// The endpoint disagrees with the registry or the expected code
    Mismatch,
    /// Probe failed; nothing is known about the network
    Unknown,
    /// Probe was cancelled after a hard failure elsewhere in strict mode
    Cancelled,
}

impl RowStatus {
    /// Whether this row stops a strict run.
    pub fn stops_strict_run(&self) -> bool {
        matches!(self, RowStatus::Mismatch | RowStatus::Unknown)
    }
}

impl std::fmt::Display for RowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RowStatus::Predicted => "predicted",
            RowStatus::Ready => "ready",
            RowStatus::Pending => "pending",
            RowStatus::Mismatch => "mismatch",
            RowStatus::Unknown => "unknown",
            RowStatus::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// What a reachable endpoint reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub chain_id: u64,
    pub singleton_present: bool,
    pub factory_deployed: bool,
    /// Runtime codehash at the predicted target, absent when nothing is deployed
    #[serde(default, with = "hex::option_hash", skip_serializing_if = "Option::is_none")]
    pub target_code_hash: Option<B256>,
}

impl Observation {
    pub fn target_deployed(&self) -> bool {
        self.target_code_hash.is_some()
    }
}

/// Cryptographic or identity divergence found on one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Finding {
    #[serde(rename_all = "camelCase")]
    ChainIdMismatch { expected: u64, observed: u64 },
    #[serde(rename_all = "camelCase")]
    TargetCodeMismatch {
        #[serde(with = "hex::address")]
        address: Address,
        #[serde(with = "hex::hash")]
        expected: B256,
        #[serde(with = "hex::hash")]
        observed: B256,
    },
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Finding::ChainIdMismatch { expected, observed } => {
                write!(f, "ChainIdMismatch: registry says {expected}, endpoint serves {observed}")
            }
            Finding::TargetCodeMismatch {
                address,
                expected,
                observed,
            } => write!(
                f,
                "TargetCodeMismatch at {}: expected {}, found {}",
                hex::encode_address(address),
                hex::encode_hash(expected),
                hex::encode_hash(observed)
            ),
        }
    }
}

/// One network's predicted pair and, when probed, what was observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRow {
    pub network: String,
    pub chain_id: u64,
    #[serde(with = "hex::address")]
    pub deployer_address: Address,
    #[serde(with = "hex::address")]
    pub predicted_factory_address: Address,
    #[serde(with = "hex::address")]
    pub predicted_target_address: Address,
    pub status: RowStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<Observation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<Finding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    probe_error: Option<ProbeError>,
}

impl NetworkRow {
    pub fn predicted(entry: &RegistryEntry, prediction: &TwoPhasePrediction) -> Self {
        Self {
            network: entry.network.clone(),
            chain_id: entry.chain_id,
            deployer_address: prediction.singleton_deployer,
            predicted_factory_address: prediction.factory_address,
            predicted_target_address: prediction.target_address,
            status: RowStatus::Predicted,
            observation: None,
            findings: Vec::new(),
            error: None,
            probe_error: None,
        }
    }

    pub(crate) fn observed(mut self, observation: Observation, findings: Vec<Finding>) -> Self {
        self.status = if !findings.is_empty() {
            RowStatus::Mismatch
        } else if observation.singleton_present
            && observation.factory_deployed
            && observation.target_deployed()
        {
            RowStatus::Ready
        } else {
            RowStatus::Pending
        };
        self.observation = Some(observation);
        self.findings = findings;
        self
    }

    pub(crate) fn degraded(mut self, error: ProbeError) -> Self {
        self.status = RowStatus::Unknown;
        self.error = Some(error.to_string());
        self.probe_error = Some(error);
        self
    }

    pub(crate) fn cancelled(mut self) -> Self {
        self.status = RowStatus::Cancelled;
        self
    }
}

/// Kind of follow-up a recommendation asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendedAction {
    DeploySingleton,
    DeployFactory,
    DeployTarget,
    AlignSingleton,
    FixChainId,
    InvestigateTargetCode,
    ConfigureEndpoint,
    CheckEndpoint,
    Rerun,
}

/// Actionable follow-up for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub network: String,
    pub action: RecommendedAction,
    pub message: String,
}

impl Recommendation {
    fn new(network: &str, action: RecommendedAction, message: String) -> Self {
        Self {
            network: network.to_string(),
            action,
            message,
        }
    }
}

/// Overall verdict of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossChainOutcome {
    Consistent,
    /// Predictions disagree, or an endpoint contradicts the registry or expected code
    Inconsistent,
    /// Strict run with unreachable or cancelled networks
    Degraded,
}

/// Aggregated result of one cross-chain run. A snapshot, regenerated per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossChainReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub strict: bool,
    pub offline: bool,
    pub rows: Vec<NetworkRow>,
    /// Deprecated networks left out of the run
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    pub consistent_factory: bool,
    pub consistent_target: bool,
    pub recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substitution: Option<Substitution>,
}

impl CrossChainReport {
    pub(crate) fn assemble(
        rows: Vec<NetworkRow>,
        skipped: Vec<String>,
        substitution: Option<Substitution>,
        strict: bool,
        offline: bool,
    ) -> Self {
        let consistent_factory = all_equal(rows.iter().map(|r| r.predicted_factory_address));
        let consistent_target = all_equal(rows.iter().map(|r| r.predicted_target_address));
        let recommendations = recommend(&rows, consistent_factory);

        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            strict,
            offline,
            rows,
            skipped,
            consistent_factory,
            consistent_target,
            recommendations,
            substitution,
        }
    }

    pub fn row(&self, network: &str) -> Option<&NetworkRow> {
        self.rows.iter().find(|row| row.network == network)
    }

    pub fn outcome(&self) -> CrossChainOutcome {
        let mismatch = self.rows.iter().any(|r| r.status == RowStatus::Mismatch);
        if !self.consistent_factory || !self.consistent_target || mismatch {
            return CrossChainOutcome::Inconsistent;
        }
        let degraded = self
            .rows
            .iter()
            .any(|r| matches!(r.status, RowStatus::Unknown | RowStatus::Cancelled));
        if self.strict && degraded {
            CrossChainOutcome::Degraded
        } else {
            CrossChainOutcome::Consistent
        }
    }

    /// The run expressed as named checks.
    pub fn checks(&self) -> Vec<CheckResult> {
        let mut checks = vec![
            consistency_check("factory-consistency", self.consistent_factory, &self.rows, |r| {
                r.predicted_factory_address
            }),
            consistency_check("target-consistency", self.consistent_target, &self.rows, |r| {
                r.predicted_target_address
            }),
        ];
        if self.offline {
            return checks;
        }

        let mut chain_ids = Vec::new();
        let mut target_code = Vec::new();
        for row in &self.rows {
            for finding in &row.findings {
                let detail = format!("{}: {finding}", row.network);
                match finding {
                    Finding::ChainIdMismatch { .. } => chain_ids.push(detail),
                    Finding::TargetCodeMismatch { .. } => target_code.push(detail),
                }
            }
        }
        checks.push(failing_if_any("chain-id", chain_ids));
        checks.push(failing_if_any("target-code", target_code));

        let unreachable: Vec<String> = self
            .rows
            .iter()
            .filter(|r| matches!(r.status, RowStatus::Unknown | RowStatus::Cancelled))
            .map(|r| match &r.error {
                Some(error) => format!("{}: {error}", r.network),
                None => format!("{}: {}", r.network, r.status),
            })
            .collect();
        let status = if unreachable.is_empty() {
            CheckStatus::Pass
        } else {
            CheckStatus::Unknown
        };
        checks.push(CheckResult::new("reachability", status).with_details(unreachable));
        checks
    }

    pub fn validation(&self) -> ValidationReport {
        ValidationReport::from_checks(self.checks(), self.strict)
    }
}

fn all_equal(mut values: impl Iterator<Item = Address>) -> bool {
    match values.next() {
        Some(first) => values.all(|value| value == first),
        None => true,
    }
}

/// The address most rows agree on; ties go to the earliest row.
fn majority(rows: &[NetworkRow], key: impl Fn(&NetworkRow) -> Address) -> Option<Address> {
    let mut counts: Vec<(Address, usize)> = Vec::new();
    for row in rows {
        let value = key(row);
        match counts.iter_mut().find(|(address, _)| *address == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }
    let best = counts.iter().map(|(_, count)| *count).max()?;
    counts
        .into_iter()
        .find(|(_, count)| *count == best)
        .map(|(address, _)| address)
}

fn consistency_check(
    name: &str,
    consistent: bool,
    rows: &[NetworkRow],
    key: impl Fn(&NetworkRow) -> Address + Copy,
) -> CheckResult {
    if consistent {
        return CheckResult::pass(name);
    }
    let expected = majority(rows, key).unwrap_or(Address::ZERO);
    let outliers = rows
        .iter()
        .filter(|row| key(row) != expected)
        .map(|row| {
            format!(
                "{}: {} differs from {}",
                row.network,
                hex::encode_address(&key(row)),
                hex::encode_address(&expected)
            )
        });
    CheckResult::new(name, CheckStatus::Fail).with_details(outliers)
}

fn failing_if_any(name: &str, details: Vec<String>) -> CheckResult {
    if details.is_empty() {
        CheckResult::pass(name)
    } else {
        CheckResult::new(name, CheckStatus::Fail).with_details(details)
    }
}

fn recommend(rows: &[NetworkRow], consistent_factory: bool) -> Vec<Recommendation> {
    use RecommendedAction::*;

    let expected_singleton = if consistent_factory {
        None
    } else {
        majority(rows, |r| r.deployer_address)
    };

    let mut out = Vec::new();
    for row in rows {
        let network = row.network.as_str();

        if let Some(expected) = expected_singleton.filter(|e| *e != row.deployer_address) {
            out.push(Recommendation::new(
                network,
                AlignSingleton,
                format!(
                    "Network {network} uses singleton deployer {} instead of {}; its factory and target addresses will differ",
                    hex::encode_address(&row.deployer_address),
                    hex::encode_address(&expected)
                ),
            ));
        }

        match row.status {
            RowStatus::Unknown => {
                let (action, message) = match &row.probe_error {
                    Some(ProbeError::NotConfigured { .. }) => (
                        ConfigureEndpoint,
                        format!("Configure an RPC endpoint for network {network}"),
                    ),
                    Some(error) => (
                        CheckEndpoint,
                        format!("Check the endpoint for network {network}: {error}"),
                    ),
                    None => (CheckEndpoint, format!("Check the endpoint for network {network}")),
                };
                out.push(Recommendation::new(network, action, message));
            }
            RowStatus::Cancelled => out.push(Recommendation::new(
                network,
                Rerun,
                format!("Re-run validation for network {network}; its probe was cancelled"),
            )),
            _ => {}
        }

        for finding in &row.findings {
            let (action, message) = match finding {
                Finding::ChainIdMismatch { expected, observed } => (
                    FixChainId,
                    format!(
                        "Registry lists chain id {expected} for network {network} but its endpoint serves chain {observed}; fix the registry or the endpoint"
                    ),
                ),
                Finding::TargetCodeMismatch { address, .. } => (
                    InvestigateTargetCode,
                    format!(
                        "Code at predicted target {} on network {network} does not match the expected codehash; do not route to it",
                        hex::encode_address(address)
                    ),
                ),
            };
            out.push(Recommendation::new(network, action, message));
        }

        if let (RowStatus::Pending, Some(observation)) = (row.status, &row.observation) {
            let step = if !observation.singleton_present {
                Some((
                    DeploySingleton,
                    format!(
                        "Deploy singleton deployer {} on network {network}",
                        hex::encode_address(&row.deployer_address)
                    ),
                ))
            } else if !observation.factory_deployed {
                Some((
                    DeployFactory,
                    format!(
                        "Deploy the factory through the singleton deployer on network {network} (expected at {})",
                        hex::encode_address(&row.predicted_factory_address)
                    ),
                ))
            } else if !observation.target_deployed() {
                Some((
                    DeployTarget,
                    format!(
                        "Deploy the target through factory {} on network {network} (expected at {})",
                        hex::encode_address(&row.predicted_factory_address),
                        hex::encode_address(&row.predicted_target_address)
                    ),
                ))
            } else {
                None
            };
            if let Some((action, message)) = step {
                out.push(Recommendation::new(network, action, message));
            }
        }
    }
    out
}
