//! Observation phase
//!
//! Reads the dispatcher's loupe once, then fetches every manifest facet's
//! runtime code concurrently. Each facet worker writes its own slot exactly
//! once. In strict mode the first hard finding aborts the remaining workers.

use std::sync::{Arc, OnceLock};

use diamond_manifest::Manifest;
use diamond_probe::NetworkProbe;
use diamond_types::{keccak256, Address, LoupeFacet, Selector, B256};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::GateConfig;

/// What was learned about one facet's runtime code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ObservedCode {
    /// Code fetched; size zero means nothing is deployed
    #[serde(rename_all = "camelCase")]
    Code {
        size: usize,
        #[serde(with = "diamond_types::hex::hash")]
        hash: B256,
    },
    /// The probe failed
    Failed { error: String },
    /// Aborted by strict mode before it finished
    Cancelled,
    /// No live system was consulted
    NotObserved,
}

impl ObservedCode {
    pub fn from_code(code: &[u8]) -> Self {
        ObservedCode::Code {
            size: code.len(),
            hash: keccak256(code),
        }
    }

    /// Whether this observation alone already fails a gate.
    fn is_hard_failure(&self, declared: Option<B256>, hard_limit: usize) -> bool {
        match self {
            ObservedCode::Code { size, hash } => {
                *size == 0 || *size > hard_limit || declared != Some(*hash)
            }
            ObservedCode::Failed { .. } => true,
            ObservedCode::Cancelled | ObservedCode::NotObserved => false,
        }
    }
}

/// Live state of one dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveState {
    /// `facets()` answer, or why it is missing
    pub loupe: Result<Vec<LoupeFacet>, String>,
    /// Runtime code per manifest facet, in manifest facet order
    pub facets: Vec<(Address, ObservedCode)>,
    /// Strict mode stopped observation early
    pub cancelled: bool,
}

impl LiveState {
    /// State for evaluating a manifest with no live system.
    pub fn unobserved(manifest: &Manifest) -> Self {
        Self {
            loupe: Err("no live system observed".to_string()),
            facets: manifest
                .facet_addresses()
                .into_iter()
                .map(|address| (address, ObservedCode::NotObserved))
                .collect(),
            cancelled: false,
        }
    }

    pub fn code(&self, address: Address) -> Option<&ObservedCode> {
        self.facets
            .iter()
            .find(|(a, _)| *a == address)
            .map(|(_, observed)| observed)
    }

    /// `selector -> facet` pairs as the loupe reports them, first wins.
    pub fn live_routes(&self) -> Option<Vec<(Selector, Address)>> {
        let loupe = self.loupe.as_ref().ok()?;
        let mut routes: Vec<(Selector, Address)> = Vec::new();
        for facet in loupe {
            for selector in &facet.selectors {
                if !routes.iter().any(|(s, _)| s == selector) {
                    routes.push((*selector, facet.address));
                }
            }
        }
        Some(routes)
    }
}

pub(crate) async fn observe(
    probe: Arc<dyn NetworkProbe>,
    manifest: &Manifest,
    diamond: Address,
    config: &GateConfig,
) -> LiveState {
    let addresses = manifest.facet_addresses();

    let loupe = probe.facets(diamond).await.map_err(|e| {
        warn!(network = %probe.network(), error = %e, "Loupe unavailable");
        e.to_string()
    });
    if loupe.is_err() && config.strict {
        return LiveState {
            loupe,
            facets: addresses
                .into_iter()
                .map(|address| (address, ObservedCode::Cancelled))
                .collect(),
            cancelled: true,
        };
    }

    let slots: Arc<Vec<OnceLock<ObservedCode>>> =
        Arc::new(addresses.iter().map(|_| OnceLock::new()).collect());
    let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
    let hard_limit = config.limits.hard_limit;

    let mut workers = JoinSet::new();
    for (index, address) in addresses.iter().copied().enumerate() {
        let declared = manifest.facet(address).and_then(|facet| facet.code_hash);
        let probe = Arc::clone(&probe);
        let slots = Arc::clone(&slots);
        let semaphore = Arc::clone(&semaphore);

        workers.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return false;
            };
            let observed = match probe.get_code(address).await {
                Ok(code) => ObservedCode::from_code(&code),
                Err(e) => ObservedCode::Failed {
                    error: e.to_string(),
                },
            };
            debug!(facet = %address, ?observed, "Facet observed");
            let hard = observed.is_hard_failure(declared, hard_limit);
            let _ = slots[index].set(observed);
            hard
        });
    }

    let mut cancelled = false;
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(true) if config.strict && !cancelled => {
                warn!("Hard failure in strict mode, cancelling remaining facet probes");
                cancelled = true;
                workers.abort_all();
            }
            Ok(_) => {}
            Err(e) if e.is_cancelled() => {}
            Err(e) => warn!(error = %e, "Facet worker panicked"),
        }
    }

    let facets = addresses
        .iter()
        .enumerate()
        .map(|(index, address)| {
            let observed = slots[index].get().cloned().unwrap_or(ObservedCode::Cancelled);
            (*address, observed)
        })
        .collect();

    LiveState {
        loupe,
        facets,
        cancelled,
    }
}
