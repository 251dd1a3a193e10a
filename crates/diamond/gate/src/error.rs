//! Gate error and violation types

use diamond_manifest::ManifestError;
use diamond_types::{hex, Address, Selector, B256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that prevent the gate from running at all.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("Soft size limit {soft} exceeds the hard limit {hard}")]
    InvalidSizeLimits { soft: usize, hard: usize },

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Result type for gate operations
pub type Result<T> = std::result::Result<T, GateError>;

/// One compliance finding. Facets are named by label (`Name (0x..)` when the
/// manifest carries metadata, otherwise the address).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Violation {
    #[error("Selector {selector} of facet {facet} is in the manifest but not routed on-chain")]
    MissingOnChain { selector: Selector, facet: String },

    #[error("Selector {selector} is routed on-chain to {facet} but not in the manifest")]
    UnexpectedOnChain { selector: Selector, facet: String },

    #[error("ReservedSelectorInFacet: dispatcher selector {selector} is declared by business facet {facet}")]
    ReservedSelectorInFacet { selector: Selector, facet: String },

    #[error("MissingDeclaredCodehash: facet {facet} declares no codehash")]
    MissingDeclaredCodehash { facet: String },

    #[error("Facet {facet} has no runtime code deployed")]
    FacetNotDeployed { facet: String },

    #[error("Codehash mismatch for facet {facet}: declared {}, observed {}", hex::encode_hash(.declared), hex::encode_hash(.observed))]
    CodehashMismatch {
        facet: String,
        #[serde(with = "hex::hash")]
        declared: B256,
        #[serde(with = "hex::hash")]
        observed: B256,
    },

    #[error("SizeLimitExceeded({size}, {limit}): facet {facet}")]
    SizeLimitExceeded {
        facet: String,
        size: usize,
        limit: usize,
    },

    #[error("Merkle root mismatch: manifest {}, live routing table {}", hex::encode_hash(.expected), hex::encode_hash(.observed))]
    RootMismatch {
        #[serde(with = "hex::hash")]
        expected: B256,
        #[serde(with = "hex::hash")]
        observed: B256,
    },

    #[error("Selector {selector} routes to {} on-chain, manifest says {}", hex::encode_address(.observed), hex::encode_address(.expected))]
    RouteDivergence {
        selector: Selector,
        #[serde(with = "hex::address")]
        expected: Address,
        #[serde(with = "hex::address")]
        observed: Address,
    },
}
