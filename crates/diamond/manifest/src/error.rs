//! Manifest error types

use std::path::PathBuf;

use diamond_types::{HexError, Selector, B256};
use thiserror::Error;

/// Manifest errors
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Malformed signature {signature:?}: {reason}")]
    MalformedSignature { signature: String, reason: String },

    #[error("Selector collision on {selector}: {facet_a} and {facet_b}")]
    SelectorCollision {
        selector: Selector,
        facet_a: String,
        facet_b: String,
    },

    #[error("Manifest has no facets")]
    EmptyManifest,

    #[error("Facet {facet} declares no selectors")]
    EmptyFacet { facet: String },

    #[error("Facet {facet} has no address: not declared and not in the address book")]
    MissingFacetAddress { facet: String },

    #[error("Address book lists {name} twice")]
    DuplicateAddressBookEntry { name: String },

    #[error("Integrity mismatch at {field}: stored {stored}, recomputed {computed}")]
    IntegrityMismatch {
        field: String,
        stored: B256,
        computed: B256,
    },

    #[error("Manifest stores {stored} leaves for {routes} routes")]
    LeafCountMismatch { stored: usize, routes: usize },

    #[error("Leaf index {index} out of range for {len} leaves")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Selector {0} is not routed by this manifest")]
    SelectorNotFound(Selector),

    #[error("Version not advanced: both manifests are version {version}")]
    VersionNotAdvanced { version: String },

    #[error("Epoch {epoch} is not in the future (active epoch {active})")]
    EpochNotInFuture { epoch: u64, active: u64 },

    #[error("Facet {facet} is defined twice")]
    DuplicateFacet { facet: String },

    #[error(transparent)]
    Hex(#[from] HexError),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid manifest JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ManifestError {
    /// Structural errors abort the whole operation; everything else is a
    /// cryptographic divergence or a lookup miss.
    pub fn is_structural(&self) -> bool {
        !matches!(
            self,
            ManifestError::IntegrityMismatch { .. } | ManifestError::SelectorNotFound(_)
        )
    }
}

/// Result type for manifest operations
pub type Result<T> = std::result::Result<T, ManifestError>;
