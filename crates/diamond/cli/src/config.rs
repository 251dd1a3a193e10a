//! CLI configuration
//!
//! ```toml
//! allow_fallback_artifact = false
//!
//! [networks.mainnet]
//! rpc_url = "https://eth.example.org"
//!
//! [prediction]
//! version = "1.0.0"
//! nonce = "1"
//!
//! [gate]
//! soft_limit = 20000
//! ```
//!
//! `DIAMOND_RPC_<NETWORK>` overrides a network's `rpc_url`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use diamond_gate::SizeLimits;
use diamond_probe::ProbeConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Let a named fallback artifact stand in for a missing primary
    pub allow_fallback_artifact: bool,

    /// Endpoints by network name
    pub networks: BTreeMap<String, NetworkSettings>,

    /// Defaults for salt and address prediction
    pub prediction: PredictionSettings,

    pub gate: GateSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    pub rpc_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionSettings {
    pub version: Option<String>,
    /// Decimal or `0x` hex
    pub nonce: Option<String>,
    pub salt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateSettings {
    pub hard_limit: usize,
    pub soft_limit: usize,
    pub concurrency: usize,
    pub timeout_ms: u64,
    pub retries: u32,
}

impl Default for GateSettings {
    fn default() -> Self {
        let limits = SizeLimits::default();
        let probe = ProbeConfig::default();
        Self {
            hard_limit: limits.hard_limit,
            soft_limit: limits.soft_limit,
            concurrency: 8,
            timeout_ms: probe.timeout_ms,
            retries: probe.retries,
        }
    }
}

impl CliConfig {
    /// Load configuration from `path`, or the default location. A missing
    /// file yields the defaults.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).map_err(|source| CliError::Read {
                    path: config_path.clone(),
                    source,
                })?;
            let config: CliConfig =
                toml::from_str(&contents).map_err(|e| CliError::Config(e.to_string()))?;
            debug!(path = %config_path.display(), networks = config.networks.len(), "Loaded configuration");
            Ok(config)
        } else {
            debug!(path = %config_path.display(), "No configuration file, using defaults");
            Ok(CliConfig::default())
        }
    }

    /// `$CONFIG_DIR/diamond/config.toml`
    pub fn default_config_path() -> CliResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::Config("Cannot find config directory".into()))?;
        Ok(config_dir.join("diamond").join("config.toml"))
    }

    /// Endpoint for `network`: the environment first, then the file.
    pub fn rpc_url(&self, network: &str) -> Option<String> {
        std::env::var(rpc_env_var(network))
            .ok()
            .filter(|url| !url.is_empty())
            .or_else(|| {
                self.networks
                    .get(network)
                    .and_then(|settings| settings.rpc_url.clone())
            })
    }

    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            timeout_ms: self.gate.timeout_ms,
            retries: self.gate.retries,
            ..ProbeConfig::default()
        }
    }

    pub fn size_limits(&self) -> SizeLimits {
        SizeLimits {
            hard_limit: self.gate.hard_limit,
            soft_limit: self.gate.soft_limit,
        }
    }
}

/// Environment variable holding the endpoint for `network`.
pub fn rpc_env_var(network: &str) -> String {
    format!("DIAMOND_RPC_{}", network.to_uppercase().replace('-', "_"))
}
