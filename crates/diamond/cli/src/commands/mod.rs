//! Subcommands

pub mod crosschain;
pub mod gate;
pub mod manifest;
pub mod predict;

use std::path::Path;

use diamond_address::{Artifact, ArtifactSet, U256};
use diamond_types::{hex, Address};

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

pub(crate) fn parse_address(flag: &str, value: &str) -> CliResult<Address> {
    hex::parse_address(value).map_err(|e| CliError::InvalidInput(format!("--{flag}: {e}")))
}

/// Nonce in decimal or `0x` hex.
pub(crate) fn parse_nonce(value: &str) -> CliResult<U256> {
    let parsed = match value.strip_prefix("0x") {
        Some(digits) => U256::from_str_radix(digits, 16),
        None => U256::from_str_radix(value, 10),
    };
    parsed.map_err(|e| CliError::InvalidInput(format!("nonce {value:?}: {e}")))
}

/// The flag, else the `[prediction]` default.
pub(crate) fn resolve_version(flag: Option<String>, config: &CliConfig) -> CliResult<String> {
    flag.or_else(|| config.prediction.version.clone())
        .ok_or_else(|| {
            CliError::InvalidInput(
                "a version is required: --version, DIAMOND_VERSION or [prediction] version".into(),
            )
        })
}

pub(crate) fn resolve_nonce(flag: Option<String>, config: &CliConfig) -> CliResult<U256> {
    let raw = flag.or_else(|| config.prediction.nonce.clone()).ok_or_else(|| {
        CliError::InvalidInput(
            "a nonce is required: --nonce, DIAMOND_NONCE or [prediction] nonce".into(),
        )
    })?;
    parse_nonce(&raw)
}

/// Target artifacts: the primary may be missing when a fallback is given.
pub(crate) fn artifact_set(target: &Path, fallback: Option<&Path>) -> CliResult<ArtifactSet> {
    let primary_name = target
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| target.display().to_string());
    let primary = match fallback {
        Some(_) => Artifact::load_optional(target)?,
        None => Some(Artifact::load(target)?),
    };

    let mut set = ArtifactSet::new(primary_name, primary);
    if let Some(path) = fallback {
        set = set.with_fallback(Artifact::load(path)?);
    }
    Ok(set)
}
