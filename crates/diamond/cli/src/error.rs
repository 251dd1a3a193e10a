//! CLI error types

use std::path::PathBuf;

use diamond_address::AddressError;
use diamond_crosschain::CrossChainError;
use diamond_gate::GateError;
use diamond_manifest::ManifestError;
use diamond_types::HexError;
use thiserror::Error;

use crate::exit;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Hex(#[from] HexError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    CrossChain(#[from] CrossChainError),

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Policy misuse exits 3; every other error is structural and exits 2.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Address(e) if e.is_policy_misuse() => exit::POLICY_MISUSE,
            CliError::CrossChain(e) if e.is_policy_misuse() => exit::POLICY_MISUSE,
            _ => exit::STRUCTURAL,
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = std::result::Result<T, CliError>;
