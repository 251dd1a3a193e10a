//! Network registry
//!
//! Static metadata for every target chain. Files are either a bare list of
//! entries or an object with a `networks` list, in JSON or YAML; both shapes
//! are normalised into one [`NetworkRegistry`] at load time.

use std::collections::HashSet;
use std::path::Path;

use diamond_types::{hex, Address, DEFAULT_SINGLETON_DEPLOYER};
use serde::{Deserialize, Serialize};

use crate::error::{CrossChainError, Result};

/// Lifecycle status of a network in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NetworkStatus {
    #[default]
    Active,
    Testnet,
    Planned,
    /// Kept for the record, never validated
    Deprecated,
}

fn default_singleton() -> Address {
    DEFAULT_SINGLETON_DEPLOYER
}

/// One row of static network metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    pub network: String,
    pub chain_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    #[serde(default)]
    pub status: NetworkStatus,
    #[serde(with = "hex::address", default = "default_singleton")]
    pub singleton_deployer_address: Address,
}

impl RegistryEntry {
    pub fn new(network: impl Into<String>, chain_id: u64) -> Self {
        Self {
            network: network.into(),
            chain_id,
            explorer_url: None,
            status: NetworkStatus::Active,
            singleton_deployer_address: DEFAULT_SINGLETON_DEPLOYER,
        }
    }

    pub fn with_status(mut self, status: NetworkStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_singleton(mut self, deployer: Address) -> Self {
        self.singleton_deployer_address = deployer;
        self
    }

    pub fn with_explorer(mut self, url: impl Into<String>) -> Self {
        self.explorer_url = Some(url.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RegistryFile {
    Listed(Vec<RegistryEntry>),
    Wrapped { networks: Vec<RegistryEntry> },
}

impl From<RegistryFile> for Vec<RegistryEntry> {
    fn from(file: RegistryFile) -> Self {
        match file {
            RegistryFile::Listed(entries) | RegistryFile::Wrapped { networks: entries } => entries,
        }
    }
}

/// Validated, ordered set of registry entries with unique network names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NetworkRegistry {
    entries: Vec<RegistryEntry>,
}

impl NetworkRegistry {
    pub fn new(entries: Vec<RegistryEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(CrossChainError::EmptyRegistry);
        }
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.network.as_str()) {
                return Err(CrossChainError::DuplicateNetwork {
                    network: entry.network.clone(),
                });
            }
        }
        Ok(Self { entries })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: RegistryFile = serde_json::from_str(json)?;
        Self::new(file.into())
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let file: RegistryFile = serde_yaml::from_str(yaml)?;
        Self::new(file.into())
    }

    /// Load a registry file; `.yaml`/`.yml` files are read as YAML, anything
    /// else as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CrossChainError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&text),
            _ => Self::from_json(&text),
        }
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn get(&self, network: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|entry| entry.network == network)
    }

    /// Entries to validate, in registry order.
    pub fn active(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.status != NetworkStatus::Deprecated)
    }

    pub fn deprecated(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.status == NetworkStatus::Deprecated)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
