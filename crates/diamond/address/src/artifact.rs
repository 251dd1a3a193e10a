//! Init code artifacts and explicit fallback substitution
//!
//! A target is predicted from its primary artifact. When the primary is
//! unavailable a named fallback may stand in, but only when the caller opts
//! in; the substitution is then carried through to every report.

use std::path::Path;

use diamond_types::{hex, Bytes};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AddressError, Result};

/// Named init code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub init_code: Bytes,
}

impl Artifact {
    pub fn new(name: impl Into<String>, init_code: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            init_code: init_code.into(),
        }
    }

    /// Load `0x`-prefixed hex init code from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| AddressError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let init_code = hex::parse_bytes(&text)?;
        if init_code.is_empty() {
            return Err(AddressError::EmptyArtifact { name });
        }
        Ok(Self::new(name, init_code))
    }

    /// Load if the file exists; a missing file is an unavailable artifact.
    pub fn load_optional(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Record of a fallback standing in for the primary artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub primary: String,
    pub fallback: String,
}

/// Primary artifact plus an optional named fallback.
#[derive(Debug, Clone, Default)]
pub struct ArtifactSet {
    pub primary_name: String,
    pub primary: Option<Artifact>,
    pub fallback: Option<Artifact>,
}

/// The artifact to predict from, and whether it was substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    pub artifact: Artifact,
    pub substitution: Option<Substitution>,
}

impl ArtifactSet {
    pub fn new(primary_name: impl Into<String>, primary: Option<Artifact>) -> Self {
        Self {
            primary_name: primary_name.into(),
            primary,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Artifact) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn resolve(&self, allow_fallback: bool) -> Result<ResolvedArtifact> {
        if let Some(primary) = &self.primary {
            return Ok(ResolvedArtifact {
                artifact: primary.clone(),
                substitution: None,
            });
        }

        let fallback = self
            .fallback
            .as_ref()
            .ok_or_else(|| AddressError::ArtifactUnavailable(self.primary_name.clone()))?;
        if !allow_fallback {
            return Err(AddressError::FallbackNotPermitted {
                primary: self.primary_name.clone(),
                fallback: fallback.name.clone(),
            });
        }

        warn!(
            primary = %self.primary_name,
            fallback = %fallback.name,
            "Primary artifact unavailable, substituting fallback"
        );
        Ok(ResolvedArtifact {
            artifact: fallback.clone(),
            substitution: Some(Substitution {
                primary: self.primary_name.clone(),
                fallback: fallback.name.clone(),
            }),
        })
    }
}
