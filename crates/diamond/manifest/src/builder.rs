//! Manifest builder
//!
//! Turns facet definitions into an ordered route list. Route order follows
//! facet order, then function order within each facet; it fixes the leaf
//! order and therefore the Merkle root.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use diamond_types::hex;
use diamond_types::{Address, FacetRecord, Route, Selector, B256};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::address_book::AddressBook;
use crate::codec::Signature;
use crate::error::{ManifestError, Result};
use crate::manifest::Manifest;
use crate::merkle;

/// One facet as declared by the caller.
///
/// `functions` holds canonical signatures or precomputed `0x` selectors, in
/// routing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetDefinition {
    pub name: String,

    /// Deployed or predicted address; falls back to the address book
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "option_address"
    )]
    pub address: Option<Address>,

    pub functions: Vec<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "diamond_types::hex::option_hash"
    )]
    pub code_hash: Option<B256>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_size: Option<usize>,
}

impl FacetDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            functions: Vec::new(),
            code_hash: None,
            byte_size: None,
        }
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.functions.push(function.into());
        self
    }

    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.functions.push(selector.to_string());
        self
    }

    pub fn with_code_hash(mut self, code_hash: B256) -> Self {
        self.code_hash = Some(code_hash);
        self
    }

    pub fn with_byte_size(mut self, byte_size: usize) -> Self {
        self.byte_size = Some(byte_size);
        self
    }
}

/// Builder input file: `{version, addresses?, facets[]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestInput {
    pub version: String,

    #[serde(default, skip_serializing_if = "AddressBook::is_empty")]
    pub addresses: AddressBook,

    pub facets: Vec<FacetDefinition>,
}

impl ManifestInput {
    pub fn into_builder(self) -> ManifestBuilder {
        let mut builder = ManifestBuilder::new(self.version).with_address_book(self.addresses);
        for facet in self.facets {
            builder = builder.facet(facet);
        }
        builder
    }
}

/// Assembles facets into an [`UnrootedManifest`].
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    version: String,
    address_book: AddressBook,
    facets: Vec<FacetDefinition>,
}

impl ManifestBuilder {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            address_book: AddressBook::new(),
            facets: Vec::new(),
        }
    }

    pub fn with_address_book(mut self, address_book: AddressBook) -> Self {
        self.address_book = address_book;
        self
    }

    pub fn facet(mut self, facet: FacetDefinition) -> Self {
        self.facets.push(facet);
        self
    }

    /// Validate and flatten into routes.
    pub fn build(self) -> Result<UnrootedManifest> {
        if self.facets.is_empty() {
            return Err(ManifestError::EmptyManifest);
        }

        let mut routes = Vec::new();
        let mut records = Vec::with_capacity(self.facets.len());
        let mut owners: HashMap<Selector, (String, Address)> = HashMap::new();

        for facet in &self.facets {
            if records.iter().any(|r: &FacetRecord| r.name == facet.name) {
                return Err(ManifestError::DuplicateFacet {
                    facet: facet.name.clone(),
                });
            }
            if facet.functions.is_empty() {
                return Err(ManifestError::EmptyFacet {
                    facet: facet.name.clone(),
                });
            }
            let address = facet
                .address
                .or_else(|| self.address_book.get(&facet.name))
                .ok_or_else(|| ManifestError::MissingFacetAddress {
                    facet: facet.name.clone(),
                })?;

            for function in &facet.functions {
                let (selector, label) = resolve_function(function)?;

                if let Some((owner, owner_address)) = owners.get(&selector) {
                    if *owner_address == address {
                        debug!(%selector, facet = %facet.name, "Duplicate selector for same address, keeping first");
                        continue;
                    }
                    return Err(ManifestError::SelectorCollision {
                        selector,
                        facet_a: format!("{owner} ({})", hex::encode_address(owner_address)),
                        facet_b: format!("{} ({})", facet.name, hex::encode_address(&address)),
                    });
                }
                owners.insert(selector, (facet.name.clone(), address));

                let route = Route::new(selector, address);
                routes.push(match label {
                    Some(label) => route.with_label(label),
                    None => route,
                });
            }

            records.push(FacetRecord {
                name: facet.name.clone(),
                address,
                code_hash: facet.code_hash,
                byte_size: facet.byte_size,
            });
        }

        debug!(
            version = %self.version,
            facets = records.len(),
            routes = routes.len(),
            "Built route list"
        );

        Ok(UnrootedManifest {
            version: self.version,
            routes,
            facets: records,
        })
    }
}

/// A `0x` selector passes through unlabelled; anything else goes through the
/// codec and keeps its canonical signature as the label.
fn resolve_function(function: &str) -> Result<(Selector, Option<String>)> {
    let trimmed = function.trim();
    if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
        return Ok((trimmed.parse::<Selector>()?, None));
    }
    let signature = Signature::parse(trimmed)?;
    Ok((signature.selector(), Some(signature.canonical())))
}

/// Validated routes and facet metadata, not yet committed to a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrootedManifest {
    pub version: String,
    pub routes: Vec<Route>,
    pub facets: Vec<FacetRecord>,
}

impl UnrootedManifest {
    /// Commit the routes to a Merkle root, stamped now.
    pub fn seal(self) -> Manifest {
        self.seal_at(Utc::now())
    }

    pub fn seal_at(self, timestamp: DateTime<Utc>) -> Manifest {
        let leaves = merkle::leaves(&self.routes);
        let merkle_root = merkle::build_root(&leaves);
        Manifest {
            version: self.version,
            routes: self.routes,
            merkle_root,
            leaves,
            timestamp,
            facets: self.facets,
        }
    }
}

mod option_address {
    use diamond_types::{hex, Address};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Address>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(address) => serializer.serialize_some(&hex::encode_address(address)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Address>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| hex::parse_address(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}
