//! Timeout and retry wrapper.
//!
//! Every call gets its own timeout. Timeouts and transport failures are
//! retried up to the configured budget with a fixed delay; RPC and decode
//! errors are returned immediately.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use diamond_types::{Address, Bytes, LoupeFacet, Selector, B256};
use tracing::{debug, warn};

use crate::config::ProbeConfig;
use crate::error::{ProbeError, Result};
use crate::probe::NetworkProbe;

pub struct ResilientProbe {
    inner: Arc<dyn NetworkProbe>,
    config: ProbeConfig,
}

impl ResilientProbe {
    pub fn new(inner: Arc<dyn NetworkProbe>, config: ProbeConfig) -> Self {
        Self { inner, config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    async fn call<T, F, Fut>(&self, method: &str, op: F) -> Result<T>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<T>> + Send,
        T: Send,
    {
        let mut attempt = 0;
        loop {
            let outcome = match tokio::time::timeout(self.config.timeout(), op()).await {
                Ok(result) => result,
                Err(_) => Err(ProbeError::Timeout {
                    network: self.inner.network().to_string(),
                    method: method.to_string(),
                    after_ms: self.config.timeout_ms,
                }),
            };

            match outcome {
                Err(e) if e.is_transient() && attempt < self.config.retries => {
                    attempt += 1;
                    warn!(
                        network = %self.inner.network(),
                        method,
                        attempt,
                        error = %e,
                        "Transient probe failure, retrying"
                    );
                    tokio::time::sleep(self.config.retry_delay()).await;
                }
                Err(e) => {
                    debug!(network = %self.inner.network(), method, error = %e, "Probe call failed");
                    return Err(e);
                }
                Ok(value) => return Ok(value),
            }
        }
    }
}

#[async_trait]
impl NetworkProbe for ResilientProbe {
    fn network(&self) -> &str {
        self.inner.network()
    }

    async fn chain_id(&self) -> Result<u64> {
        self.call("eth_chainId", || self.inner.chain_id()).await
    }

    async fn get_code(&self, address: Address) -> Result<Bytes> {
        self.call("eth_getCode", || self.inner.get_code(address)).await
    }

    async fn get_code_hash(&self, address: Address) -> Result<B256> {
        self.call("eth_getCode", || self.inner.get_code_hash(address))
            .await
    }

    async fn facets(&self, diamond: Address) -> Result<Vec<LoupeFacet>> {
        self.call("facets()", || self.inner.facets(diamond)).await
    }

    async fn facet_address(&self, diamond: Address, selector: Selector) -> Result<Address> {
        self.call("facetAddress(bytes4)", || {
            self.inner.facet_address(diamond, selector)
        })
        .await
    }

    async fn facet_hash(&self, diamond: Address, facet: Address) -> Result<B256> {
        self.call("facetHash(address)", || self.inner.facet_hash(diamond, facet))
            .await
    }
}
