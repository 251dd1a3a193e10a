//! The network probe interface.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use diamond_types::{keccak256, Address, Bytes, LoupeFacet, Selector, B256};

use crate::error::Result;

/// Read-only view of one chain endpoint.
///
/// Implementations hold no lock across a call and are shared between
/// concurrent workers.
#[async_trait]
pub trait NetworkProbe: Send + Sync {
    /// Network name used in errors and reports.
    fn network(&self) -> &str;

    async fn chain_id(&self) -> Result<u64>;

    /// Runtime code at `address`; empty when nothing is deployed.
    async fn get_code(&self, address: Address) -> Result<Bytes>;

    /// keccak256 of the runtime code at `address`.
    async fn get_code_hash(&self, address: Address) -> Result<B256> {
        let code = self.get_code(address).await?;
        Ok(keccak256(&code))
    }

    /// The dispatcher's `facets()` introspection.
    async fn facets(&self, diamond: Address) -> Result<Vec<LoupeFacet>>;

    /// The dispatcher's `facetAddress(bytes4)` introspection.
    async fn facet_address(&self, diamond: Address, selector: Selector) -> Result<Address>;

    /// The dispatcher's `facetHash(address)` introspection.
    async fn facet_hash(&self, diamond: Address, facet: Address) -> Result<B256>;
}

/// Source of probes by network name.
pub trait ProbeProvider: Send + Sync {
    fn probe(&self, network: &str) -> Option<Arc<dyn NetworkProbe>>;
}

impl ProbeProvider for HashMap<String, Arc<dyn NetworkProbe>> {
    fn probe(&self, network: &str) -> Option<Arc<dyn NetworkProbe>> {
        self.get(network).cloned()
    }
}
