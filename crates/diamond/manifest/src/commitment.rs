//! Routing commitments
//!
//! The dispatcher accepts a routing table only for a future epoch and
//! activates it atomically when that epoch begins. A commitment binds a
//! manifest's root and digest to that epoch.

use diamond_types::hex;
use diamond_types::B256;
use serde::{Deserialize, Serialize};

use crate::error::{ManifestError, Result};
use crate::manifest::Manifest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingCommitment {
    pub version: String,

    #[serde(with = "hex::hash")]
    pub merkle_root: B256,

    #[serde(with = "hex::hash")]
    pub manifest_digest: B256,

    pub epoch: u64,
}

impl RoutingCommitment {
    /// Commit `manifest` for `epoch`; `epoch` must be after `active_epoch`.
    pub fn new(manifest: &Manifest, epoch: u64, active_epoch: u64) -> Result<Self> {
        if epoch <= active_epoch {
            return Err(ManifestError::EpochNotInFuture {
                epoch,
                active: active_epoch,
            });
        }
        manifest.verify_integrity()?;

        Ok(Self {
            version: manifest.version.clone(),
            merkle_root: manifest.merkle_root,
            manifest_digest: manifest.digest()?,
            epoch,
        })
    }

    pub fn matches(&self, manifest: &Manifest) -> bool {
        self.merkle_root == manifest.merkle_root
            && manifest
                .digest()
                .map(|digest| digest == self.manifest_digest)
                .unwrap_or(false)
    }
}
