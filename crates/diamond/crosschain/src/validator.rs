//! Cross-chain validator
//!
//! Predictions are pure and computed up front for every network. Probing
//! then fans out on a `JoinSet` bounded by a semaphore; each worker owns one
//! result slot and writes it exactly once. A failed probe degrades only its
//! own row. In strict mode the first row that stops the run aborts every
//! worker still in flight and their slots are reported as cancelled.

use std::sync::{Arc, OnceLock};

use diamond_address::{TwoPhaseInputs, TwoPhasePrediction, TwoPhasePredictor};
use diamond_probe::{NetworkProbe, ProbeConfig, ProbeError, ProbeProvider, ResilientProbe};
use diamond_types::B256;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::error::{CrossChainError, Result};
use crate::registry::{NetworkRegistry, RegistryEntry};
use crate::report::{CrossChainReport, Finding, NetworkRow, Observation};

/// Validator settings, passed explicitly per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Networks probed at the same time
    pub concurrency: usize,
    /// Stop at the first mismatch or unreachable network
    pub strict: bool,
    /// Predict only, never touch an endpoint
    pub offline: bool,
    pub probe: ProbeConfig,
    /// Runtime codehash the deployed target must have, when known
    #[serde(skip)]
    pub expected_target_codehash: Option<B256>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            strict: false,
            offline: false,
            probe: ProbeConfig::default(),
            expected_target_codehash: None,
        }
    }
}

impl ValidatorConfig {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn with_probe(mut self, probe: ProbeConfig) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_expected_target_codehash(mut self, codehash: B256) -> Self {
        self.expected_target_codehash = Some(codehash);
        self
    }
}

/// Fans address prediction and network probing out over a registry.
pub struct CrossChainValidator {
    config: ValidatorConfig,
    probes: Option<Arc<dyn ProbeProvider>>,
}

impl CrossChainValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            config,
            probes: None,
        }
    }

    pub fn with_probes(mut self, probes: Arc<dyn ProbeProvider>) -> Self {
        self.probes = Some(probes);
        self
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Predict every active network's factory and target, probe them unless
    /// offline, and aggregate the report.
    ///
    /// Fails only on input errors (including salt or fallback policy misuse);
    /// network failures are reported per row.
    #[instrument(skip_all, fields(networks = registry.len(), strict = self.config.strict))]
    pub async fn validate(
        &self,
        registry: &NetworkRegistry,
        inputs: &TwoPhaseInputs,
    ) -> Result<CrossChainReport> {
        let skipped: Vec<String> = registry.deprecated().map(|e| e.network.clone()).collect();
        let entries: Vec<RegistryEntry> = registry.active().cloned().collect();
        if entries.is_empty() {
            return Err(CrossChainError::NoActiveNetworks {
                skipped: skipped.len(),
            });
        }

        let mut predictions = Vec::with_capacity(entries.len());
        for entry in &entries {
            let prediction =
                TwoPhasePredictor::new(entry.singleton_deployer_address).predict(inputs)?;
            predictions.push(prediction);
        }
        let substitution = predictions.first().and_then(|p| p.substitution.clone());

        let rows = match (&self.probes, self.config.offline) {
            (Some(probes), false) => self.probe_all(probes, entries, predictions).await,
            _ => entries
                .iter()
                .zip(&predictions)
                .map(|(entry, prediction)| NetworkRow::predicted(entry, prediction))
                .collect(),
        };

        let report = CrossChainReport::assemble(
            rows,
            skipped,
            substitution,
            self.config.strict,
            self.config.offline || self.probes.is_none(),
        );
        info!(
            run_id = %report.run_id,
            consistent_factory = report.consistent_factory,
            consistent_target = report.consistent_target,
            outcome = ?report.outcome(),
            "Cross-chain validation complete"
        );
        Ok(report)
    }

    async fn probe_all(
        &self,
        probes: &Arc<dyn ProbeProvider>,
        entries: Vec<RegistryEntry>,
        predictions: Vec<TwoPhasePrediction>,
    ) -> Vec<NetworkRow> {
        let slots: Arc<Vec<OnceLock<NetworkRow>>> =
            Arc::new(entries.iter().map(|_| OnceLock::new()).collect());
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let strict = self.config.strict;
        let expected = self.config.expected_target_codehash;

        let mut workers = JoinSet::new();
        for (index, (entry, prediction)) in entries.iter().zip(&predictions).enumerate() {
            let row = NetworkRow::predicted(entry, prediction);
            let probe = probes
                .probe(&entry.network)
                .map(|inner| Arc::new(ResilientProbe::new(inner, self.config.probe)));
            let entry = entry.clone();
            let prediction = prediction.clone();
            let slots = Arc::clone(&slots);
            let semaphore = Arc::clone(&semaphore);

            workers.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return false;
                };
                let row = match probe {
                    Some(probe) => observe(&*probe, &entry, &prediction, expected, row).await,
                    None => row.degraded(ProbeError::NotConfigured {
                        network: entry.network.clone(),
                    }),
                };
                let stops = row.status.stops_strict_run();
                let _ = slots[index].set(row);
                stops
            });
        }

        let mut cancelling = false;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(true) if strict && !cancelling => {
                    warn!("Hard failure in strict mode, cancelling remaining probes");
                    cancelling = true;
                    workers.abort_all();
                }
                Ok(_) => {}
                Err(e) if e.is_cancelled() => {}
                Err(e) => warn!(error = %e, "Network worker panicked"),
            }
        }

        entries
            .iter()
            .zip(&predictions)
            .enumerate()
            .map(|(index, (entry, prediction))| match slots[index].get() {
                Some(row) => row.clone(),
                None => NetworkRow::predicted(entry, prediction).cancelled(),
            })
            .collect()
    }
}

/// Probe one network: chain id, singleton, factory, then target code.
async fn observe(
    probe: &dyn NetworkProbe,
    entry: &RegistryEntry,
    prediction: &TwoPhasePrediction,
    expected_target_codehash: Option<B256>,
    row: NetworkRow,
) -> NetworkRow {
    match probe_network(probe, entry, prediction, expected_target_codehash).await {
        Ok((observation, findings)) => {
            debug!(network = %entry.network, ?observation, "Network observed");
            row.observed(observation, findings)
        }
        Err(e) => {
            warn!(network = %entry.network, error = %e, "Network probe failed");
            row.degraded(e)
        }
    }
}

async fn probe_network(
    probe: &dyn NetworkProbe,
    entry: &RegistryEntry,
    prediction: &TwoPhasePrediction,
    expected_target_codehash: Option<B256>,
) -> diamond_probe::Result<(Observation, Vec<Finding>)> {
    let chain_id = probe.chain_id().await?;
    if chain_id != entry.chain_id {
        // Anything further would describe the wrong chain.
        let observation = Observation {
            chain_id,
            singleton_present: false,
            factory_deployed: false,
            target_code_hash: None,
        };
        let finding = Finding::ChainIdMismatch {
            expected: entry.chain_id,
            observed: chain_id,
        };
        return Ok((observation, vec![finding]));
    }

    let singleton_present = !probe
        .get_code(prediction.singleton_deployer)
        .await?
        .is_empty();
    let factory_deployed = !probe.get_code(prediction.factory_address).await?.is_empty();
    let target_code = probe.get_code(prediction.target_address).await?;
    let target_code_hash = (!target_code.is_empty()).then(|| diamond_types::keccak256(&target_code));

    let mut findings = Vec::new();
    if let (Some(expected), Some(observed)) = (expected_target_codehash, target_code_hash) {
        if expected != observed {
            findings.push(Finding::TargetCodeMismatch {
                address: prediction.target_address,
                expected,
                observed,
            });
        }
    }

    Ok((
        Observation {
            chain_id,
            singleton_present,
            factory_deployed,
            target_code_hash,
        },
        findings,
    ))
}
