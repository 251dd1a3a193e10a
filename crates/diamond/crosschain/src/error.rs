//! Cross-chain validation error types

use std::path::PathBuf;

use diamond_address::AddressError;
use thiserror::Error;

/// Errors that abort a cross-chain run before any network is probed.
///
/// Per-network probe failures never surface here; they degrade that
/// network's row instead.
#[derive(Debug, Error)]
pub enum CrossChainError {
    #[error("Network registry is empty")]
    EmptyRegistry,

    #[error("Network registry has no network left to validate ({skipped} deprecated)")]
    NoActiveNetworks { skipped: usize },

    #[error("Network {network} is listed more than once in the registry")]
    DuplicateNetwork { network: String },

    #[error("Malformed registry JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed registry YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to read registry {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Prediction(#[from] AddressError),
}

impl CrossChainError {
    pub fn is_policy_misuse(&self) -> bool {
        matches!(self, CrossChainError::Prediction(e) if e.is_policy_misuse())
    }
}

/// Result type for cross-chain validation
pub type Result<T> = std::result::Result<T, CrossChainError>;
