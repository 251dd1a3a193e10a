//! In-memory probe
//!
//! Serves code and loupe answers from maps. Suitable for tests and dry runs;
//! failures and latency can be injected per network or per address.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use diamond_types::{keccak256, Address, Bytes, LoupeFacet, Selector, B256};

use crate::error::{ProbeError, Result};
use crate::probe::NetworkProbe;

/// Failure an in-memory probe reports instead of answering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureMode {
    Timeout,
    Unreachable,
    Rpc(String),
}

/// Where an injected failure applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureScope {
    All,
    Address(Address),
}

pub struct InMemoryProbe {
    network: String,
    chain_id: u64,
    code: DashMap<Address, Bytes>,
    loupes: DashMap<Address, Vec<LoupeFacet>>,
    facet_hashes: DashMap<Address, B256>,
    failures: DashMap<FailureScope, FailureMode>,
    transient_failures: AtomicU32,
    latency_ms: AtomicU64,
    calls: AtomicU64,
}

impl InMemoryProbe {
    pub fn new(network: impl Into<String>, chain_id: u64) -> Self {
        Self {
            network: network.into(),
            chain_id,
            code: DashMap::new(),
            loupes: DashMap::new(),
            facet_hashes: DashMap::new(),
            failures: DashMap::new(),
            transient_failures: AtomicU32::new(0),
            latency_ms: AtomicU64::new(0),
            calls: AtomicU64::new(0),
        }
    }

    pub fn with_code(self, address: Address, code: impl Into<Bytes>) -> Self {
        self.set_code(address, code);
        self
    }

    /// Install a dispatcher answering `facets()` with `facets`.
    pub fn with_diamond(self, diamond: Address, facets: Vec<LoupeFacet>) -> Self {
        self.loupes.insert(diamond, facets);
        self
    }

    pub fn with_facet_hash(self, facet: Address, hash: B256) -> Self {
        self.facet_hashes.insert(facet, hash);
        self
    }

    pub fn with_latency(self, latency: Duration) -> Self {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
        self
    }

    pub fn set_code(&self, address: Address, code: impl Into<Bytes>) {
        self.code.insert(address, code.into());
    }

    /// Fail every call in `scope` until cleared.
    pub fn fail(&self, scope: FailureScope, mode: FailureMode) {
        self.failures.insert(scope, mode);
    }

    pub fn clear_failures(&self) {
        self.failures.clear();
        self.transient_failures.store(0, Ordering::Relaxed);
    }

    /// Fail the next `count` calls with a transport error, then recover.
    pub fn fail_next(&self, count: u32) {
        self.transient_failures.store(count, Ordering::Relaxed);
    }

    /// Number of calls answered or failed so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    fn error(&self, method: &str, mode: &FailureMode) -> ProbeError {
        match mode {
            FailureMode::Timeout => ProbeError::Timeout {
                network: self.network.clone(),
                method: method.to_string(),
                after_ms: 0,
            },
            FailureMode::Unreachable => ProbeError::Transport {
                network: self.network.clone(),
                message: "connection refused".to_string(),
            },
            FailureMode::Rpc(message) => ProbeError::Rpc {
                network: self.network.clone(),
                method: method.to_string(),
                code: -32000,
                message: message.clone(),
            },
        }
    }

    /// Common preamble: count, delay, then any injected failure.
    async fn enter(&self, method: &str, address: Option<Address>) -> Result<()> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        let transient = self
            .transient_failures
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
        if transient.is_ok() {
            return Err(self.error(method, &FailureMode::Unreachable));
        }

        let injected = self
            .failures
            .get(&FailureScope::All)
            .or_else(|| address.and_then(|a| self.failures.get(&FailureScope::Address(a))))
            .map(|mode| mode.value().clone());
        match injected {
            Some(mode) => Err(self.error(method, &mode)),
            None => Ok(()),
        }
    }

    fn loupe(&self, method: &str, diamond: Address) -> Result<Vec<LoupeFacet>> {
        self.loupes
            .get(&diamond)
            .map(|facets| facets.value().clone())
            .ok_or_else(|| self.error(method, &FailureMode::Rpc("execution reverted".to_string())))
    }
}

#[async_trait]
impl NetworkProbe for InMemoryProbe {
    fn network(&self) -> &str {
        &self.network
    }

    async fn chain_id(&self) -> Result<u64> {
        self.enter("eth_chainId", None).await?;
        Ok(self.chain_id)
    }

    async fn get_code(&self, address: Address) -> Result<Bytes> {
        self.enter("eth_getCode", Some(address)).await?;
        Ok(self
            .code
            .get(&address)
            .map(|code| code.value().clone())
            .unwrap_or_default())
    }

    async fn facets(&self, diamond: Address) -> Result<Vec<LoupeFacet>> {
        self.enter("facets()", Some(diamond)).await?;
        self.loupe("facets()", diamond)
    }

    async fn facet_address(&self, diamond: Address, selector: Selector) -> Result<Address> {
        self.enter("facetAddress(bytes4)", Some(diamond)).await?;
        let facets = self.loupe("facetAddress(bytes4)", diamond)?;
        Ok(facets
            .iter()
            .find(|facet| facet.selectors.contains(&selector))
            .map(|facet| facet.address)
            .unwrap_or(Address::ZERO))
    }

    async fn facet_hash(&self, diamond: Address, facet: Address) -> Result<B256> {
        self.enter("facetHash(address)", Some(diamond)).await?;
        self.loupe("facetHash(address)", diamond)?;
        if let Some(hash) = self.facet_hashes.get(&facet) {
            return Ok(*hash);
        }
        Ok(self
            .code
            .get(&facet)
            .map(|code| keccak256(code.value()))
            .unwrap_or(B256::ZERO))
    }
}
