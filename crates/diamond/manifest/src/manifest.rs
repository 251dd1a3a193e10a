//! Sealed manifests and the manifest file format
//!
//! A manifest is immutable once sealed: a new routing table is a new
//! version. Persisted as JSON with lowercase hex selectors, addresses and
//! hashes. Loading always recomputes leaves and root from the routes.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use diamond_types::hex;
use diamond_types::{keccak256, Address, FacetRecord, Route, Selector, B256};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ManifestError, Result};
use crate::merkle::{self, MerkleTree};

/// Versioned, Merkle-committed routing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub version: String,
    pub routes: Vec<Route>,

    #[serde(with = "hex::hash")]
    pub merkle_root: B256,

    #[serde(with = "hex::hashes")]
    pub leaves: Vec<B256>,

    pub timestamp: DateTime<Utc>,

    /// Deployment metadata per facet, checked by the compliance gate
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<FacetRecord>,
}

/// Inclusion proof for one route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteProof {
    pub selector: Selector,

    #[serde(with = "hex::address")]
    pub facet: Address,

    pub index: usize,

    #[serde(with = "hex::hash")]
    pub leaf: B256,

    #[serde(with = "hex::hashes")]
    pub proof: Vec<B256>,

    #[serde(with = "hex::hash")]
    pub root: B256,
}

impl RouteProof {
    pub fn verify(&self) -> bool {
        self.leaf == merkle::leaf(self.selector, self.facet)
            && merkle::verify(&self.leaf, &self.proof, &self.root)
    }
}

impl Manifest {
    /// Parse and integrity-check a manifest document.
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(json)?;
        manifest.verify_integrity()?;
        Ok(manifest)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest = Self::from_json(&json)?;
        debug!(path = %path.display(), version = %manifest.version, "Loaded manifest");
        Ok(manifest)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json_pretty()?;
        std::fs::write(path, json + "\n").map_err(|source| ManifestError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), version = %self.version, root = %self.merkle_root, "Wrote manifest");
        Ok(())
    }

    /// Recompute leaves and root from the routes and compare with the stored values.
    pub fn verify_integrity(&self) -> Result<()> {
        if self.routes.is_empty() {
            return Err(ManifestError::EmptyManifest);
        }

        let mut seen: HashSet<Selector> = HashSet::with_capacity(self.routes.len());
        for route in &self.routes {
            if !seen.insert(route.selector) {
                let first = self
                    .routes
                    .iter()
                    .find(|r| r.selector == route.selector)
                    .map(|r| r.facet)
                    .unwrap_or(route.facet);
                return Err(ManifestError::SelectorCollision {
                    selector: route.selector,
                    facet_a: self.facet_label(first),
                    facet_b: self.facet_label(route.facet),
                });
            }
        }

        if self.leaves.len() != self.routes.len() {
            return Err(ManifestError::LeafCountMismatch {
                stored: self.leaves.len(),
                routes: self.routes.len(),
            });
        }
        for (i, (route, stored)) in self.routes.iter().zip(&self.leaves).enumerate() {
            let computed = merkle::route_leaf(route);
            if computed != *stored {
                return Err(ManifestError::IntegrityMismatch {
                    field: format!("leaves[{i}] ({})", route.selector),
                    stored: *stored,
                    computed,
                });
            }
        }

        let computed = merkle::build_root(&self.leaves);
        if computed != self.merkle_root {
            return Err(ManifestError::IntegrityMismatch {
                field: "merkleRoot".to_string(),
                stored: self.merkle_root,
                computed,
            });
        }
        Ok(())
    }

    /// keccak256 of the compact JSON encoding; what an external signer signs.
    pub fn digest(&self) -> Result<B256> {
        let bytes = serde_json::to_vec(self)?;
        Ok(keccak256(bytes))
    }

    pub fn route(&self, selector: Selector) -> Option<&Route> {
        self.routes.iter().find(|r| r.selector == selector)
    }

    pub fn selectors(&self) -> impl Iterator<Item = Selector> + '_ {
        self.routes.iter().map(|r| r.selector)
    }

    /// Distinct facet addresses in first-route order.
    pub fn facet_addresses(&self) -> Vec<Address> {
        let mut addresses = Vec::new();
        for route in &self.routes {
            if !addresses.contains(&route.facet) {
                addresses.push(route.facet);
            }
        }
        addresses
    }

    pub fn facet(&self, address: Address) -> Option<&FacetRecord> {
        self.facets.iter().find(|f| f.address == address)
    }

    /// Facet name if known, otherwise the address.
    pub fn facet_label(&self, address: Address) -> String {
        match self.facet(address) {
            Some(facet) => format!("{} ({})", facet.name, hex::encode_address(&address)),
            None => hex::encode_address(&address),
        }
    }

    /// Inclusion proof for the route of `selector`.
    pub fn proof_for(&self, selector: Selector) -> Result<RouteProof> {
        let index = self
            .routes
            .iter()
            .position(|r| r.selector == selector)
            .ok_or(ManifestError::SelectorNotFound(selector))?;
        if self.leaves.len() != self.routes.len() {
            return Err(ManifestError::LeafCountMismatch {
                stored: self.leaves.len(),
                routes: self.routes.len(),
            });
        }
        let route = &self.routes[index];
        let tree = MerkleTree::new(&self.leaves);

        Ok(RouteProof {
            selector,
            facet: route.facet,
            index,
            leaf: self.leaves[index],
            proof: tree.proof(index)?,
            root: self.merkle_root,
        })
    }
}
