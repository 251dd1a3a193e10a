//! Facet metadata and loupe views

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::selector::Selector;

/// A deployable unit and the metadata used to verify its deployment.
///
/// The routes a facet owns live in the manifest's route list; this record
/// carries what the compliance gate checks against the deployed code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetRecord {
    pub name: String,

    #[serde(with = "crate::hex::address")]
    pub address: Address,

    /// keccak256 of the audited runtime bytecode
    #[serde(
        default,
        with = "crate::hex::option_hash",
        skip_serializing_if = "Option::is_none"
    )]
    pub code_hash: Option<B256>,

    /// Runtime bytecode length in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_size: Option<usize>,
}

impl FacetRecord {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            address,
            code_hash: None,
            byte_size: None,
        }
    }

    pub fn with_code_hash(mut self, code_hash: B256) -> Self {
        self.code_hash = Some(code_hash);
        self
    }

    pub fn with_byte_size(mut self, byte_size: usize) -> Self {
        self.byte_size = Some(byte_size);
        self
    }
}

/// One entry of a live dispatcher's `facets()` introspection result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoupeFacet {
    #[serde(with = "crate::hex::address")]
    pub address: Address,
    pub selectors: Vec<Selector>,
}

impl LoupeFacet {
    pub fn new(address: Address, selectors: Vec<Selector>) -> Self {
        Self { address, selectors }
    }
}
