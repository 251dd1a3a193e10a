//! Address prediction error types

use std::path::PathBuf;

use diamond_types::HexError;
use thiserror::Error;

use crate::salt::{SaltPolicy, SaltRole};

/// Address prediction errors
#[derive(Debug, Error)]
pub enum AddressError {
    #[error("Init code of {size} bytes exceeds the {limit}-byte ceiling")]
    InitCodeTooLarge { size: usize, limit: usize },

    #[error("Salt policy {policy} misused: {reason}")]
    SaltPolicyMismatch { policy: SaltPolicy, reason: String },

    #[error("Salt policy {policy} is chain-scoped and cannot yield a cross-chain address")]
    ChainScopedCrossChain { policy: SaltPolicy },

    #[error("Salt policy {policy} derives {actual} salts, {expected} salt required")]
    SaltRoleMismatch {
        policy: SaltPolicy,
        expected: SaltRole,
        actual: SaltRole,
    },

    #[error("Unknown salt policy: {0}")]
    UnknownSaltPolicy(String),

    #[error("Artifact {primary} is unavailable and fallback {fallback} was not permitted")]
    FallbackNotPermitted { primary: String, fallback: String },

    #[error("Artifact {0} is unavailable and no fallback is configured")]
    ArtifactUnavailable(String),

    #[error("Artifact {name} is empty")]
    EmptyArtifact { name: String },

    #[error(transparent)]
    Hex(#[from] HexError),

    #[error("Failed to read artifact {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl AddressError {
    /// Caller misuse rejected at the API boundary, as opposed to bad input data.
    pub fn is_policy_misuse(&self) -> bool {
        matches!(
            self,
            AddressError::SaltPolicyMismatch { .. }
                | AddressError::ChainScopedCrossChain { .. }
                | AddressError::SaltRoleMismatch { .. }
                | AddressError::FallbackNotPermitted { .. }
        )
    }
}

/// Result type for address prediction
pub type Result<T> = std::result::Result<T, AddressError>;
