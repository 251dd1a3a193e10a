//! JSON-RPC probe over HTTP.
//!
//! Uses `eth_chainId`, `eth_getCode` and `eth_call` against the `latest`
//! block. Loupe calls are ABI-encoded with the `IDiamondLoupe` interface.

use std::sync::atomic::{AtomicU64, Ordering};

use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use diamond_types::{hex, Address, Bytes, LoupeFacet, Selector, B256};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::error::{ProbeError, Result};
use crate::probe::NetworkProbe;

sol! {
    interface IDiamondLoupe {
        struct Facet {
            address facetAddress;
            bytes4[] functionSelectors;
        }

        function facets() external view returns (Facet[] memory facets_);
        function facetAddress(bytes4 _functionSelector) external view returns (address facetAddress_);
        function facetHash(address _facet) external view returns (bytes32 hash_);
    }
}

/// Probe backed by an HTTP JSON-RPC endpoint.
pub struct RpcProbe {
    network: String,
    url: String,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl RpcProbe {
    pub fn new(network: impl Into<String>, url: impl Into<String>) -> Self {
        Self::with_client(network, url, reqwest::Client::new())
    }

    pub fn with_client(
        network: impl Into<String>,
        url: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            network: network.into(),
            url: url.into(),
            client,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn decode_error(&self, method: &str, message: impl ToString) -> ProbeError {
        ProbeError::Decode {
            network: self.network.clone(),
            method: method.to_string(),
            message: message.to_string(),
        }
    }

    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(method, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Transport {
                network: self.network.clone(),
                message: format!("{method} returned HTTP {status}"),
            });
        }

        let mut value: Value = response
            .json()
            .await
            .map_err(|e| self.decode_error(method, e))?;

        if let Some(error) = value.get("error") {
            return Err(ProbeError::Rpc {
                network: self.network.clone(),
                method: method.to_string(),
                code: error.get("code").and_then(Value::as_i64).unwrap_or_default(),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            });
        }

        value
            .get_mut("result")
            .map(Value::take)
            .ok_or_else(|| self.decode_error(method, "response has no result"))
    }

    fn transport_error(&self, method: &str, error: reqwest::Error) -> ProbeError {
        if error.is_timeout() {
            ProbeError::Timeout {
                network: self.network.clone(),
                method: method.to_string(),
                after_ms: 0,
            }
        } else {
            ProbeError::Transport {
                network: self.network.clone(),
                message: error.to_string(),
            }
        }
    }

    async fn hex_result(&self, method: &str, params: Value) -> Result<Vec<u8>> {
        let result = self.rpc_call(method, params).await?;
        let text = result
            .as_str()
            .ok_or_else(|| self.decode_error(method, "result is not a string"))?;
        hex::parse_bytes(text).map_err(|e| self.decode_error(method, e))
    }

    async fn eth_call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>> {
        self.hex_result(
            "eth_call",
            json!([
                {"to": hex::encode_address(&to), "data": hex::encode_bytes(&data)},
                "latest"
            ]),
        )
        .await
    }
}

/// Parse a JSON-RPC hex quantity such as `0x1` or `0x2105`.
fn parse_quantity(text: &str) -> Option<u64> {
    let digits = text.strip_prefix("0x")?;
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

#[async_trait]
impl NetworkProbe for RpcProbe {
    fn network(&self) -> &str {
        &self.network
    }

    #[instrument(skip(self), fields(network = %self.network))]
    async fn chain_id(&self) -> Result<u64> {
        let result = self.rpc_call("eth_chainId", json!([])).await?;
        result
            .as_str()
            .and_then(parse_quantity)
            .ok_or_else(|| self.decode_error("eth_chainId", format!("bad quantity {result}")))
    }

    #[instrument(skip(self), fields(network = %self.network))]
    async fn get_code(&self, address: Address) -> Result<Bytes> {
        let code = self
            .hex_result(
                "eth_getCode",
                json!([hex::encode_address(&address), "latest"]),
            )
            .await?;
        debug!(%address, size = code.len(), "Fetched code");
        Ok(code.into())
    }

    #[instrument(skip(self), fields(network = %self.network))]
    async fn facets(&self, diamond: Address) -> Result<Vec<LoupeFacet>> {
        let data = IDiamondLoupe::facetsCall {}.abi_encode();
        let output = self.eth_call(diamond, data).await?;
        let decoded = IDiamondLoupe::facetsCall::abi_decode_returns(&output, true)
            .map_err(|e| self.decode_error("facets()", e))?;

        Ok(decoded
            .facets_
            .into_iter()
            .map(|facet| {
                LoupeFacet::new(
                    facet.facetAddress,
                    facet
                        .functionSelectors
                        .into_iter()
                        .map(Selector::from)
                        .collect(),
                )
            })
            .collect())
    }

    #[instrument(skip(self), fields(network = %self.network))]
    async fn facet_address(&self, diamond: Address, selector: Selector) -> Result<Address> {
        let data = IDiamondLoupe::facetAddressCall {
            _functionSelector: selector.into(),
        }
        .abi_encode();
        let output = self.eth_call(diamond, data).await?;
        let decoded = IDiamondLoupe::facetAddressCall::abi_decode_returns(&output, true)
            .map_err(|e| self.decode_error("facetAddress(bytes4)", e))?;
        Ok(decoded.facetAddress_)
    }

    #[instrument(skip(self), fields(network = %self.network))]
    async fn facet_hash(&self, diamond: Address, facet: Address) -> Result<B256> {
        let data = IDiamondLoupe::facetHashCall { _facet: facet }.abi_encode();
        let output = self.eth_call(diamond, data).await?;
        let decoded = IDiamondLoupe::facetHashCall::abi_decode_returns(&output, true)
            .map_err(|e| self.decode_error("facetHash(address)", e))?;
        Ok(decoded.hash_)
    }
}
