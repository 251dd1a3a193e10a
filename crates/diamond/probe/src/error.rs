//! Probe error types

use thiserror::Error;

/// Network probe errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("{network}: {method} timed out after {after_ms}ms")]
    Timeout {
        network: String,
        method: String,
        after_ms: u64,
    },

    #[error("{network}: endpoint unreachable: {message}")]
    Transport { network: String, message: String },

    #[error("{network}: {method} failed with RPC error {code}: {message}")]
    Rpc {
        network: String,
        method: String,
        code: i64,
        message: String,
    },

    #[error("{network}: could not decode {method} response: {message}")]
    Decode {
        network: String,
        method: String,
        message: String,
    },

    #[error("{network}: no endpoint configured")]
    NotConfigured { network: String },
}

impl ProbeError {
    /// Timeouts and transport failures may succeed on retry; everything else
    /// is a definite answer from the endpoint.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProbeError::Timeout { .. } | ProbeError::Transport { .. })
    }

    pub fn network(&self) -> &str {
        match self {
            ProbeError::Timeout { network, .. }
            | ProbeError::Transport { network, .. }
            | ProbeError::Rpc { network, .. }
            | ProbeError::Decode { network, .. }
            | ProbeError::NotConfigured { network } => network,
        }
    }
}

/// Result type for probe operations
pub type Result<T> = std::result::Result<T, ProbeError>;
