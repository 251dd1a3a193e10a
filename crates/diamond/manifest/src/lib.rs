//! Diamond Manifest - routing tables and their Merkle commitments
//!
//! This crate turns facet definitions into a versioned manifest:
//!
//! - **codec**: function signature → 4-byte selector
//! - **builder**: facets → ordered, collision-free route list
//! - **merkle**: sorted-pair Merkle tree over route leaves, proofs, verification
//! - **manifest**: sealed manifest, file format, integrity check, digest
//! - **diff**: facet cuts between two manifest versions
//! - **commitment**: epoch-bound routing commitment for the dispatcher
//!
//! Everything here is pure and deterministic. Identical route lists give
//! bit-identical roots on any host.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod address_book;
pub mod builder;
pub mod codec;
pub mod commitment;
pub mod diff;
pub mod error;
pub mod manifest;
pub mod merkle;

// Re-exports
pub use address_book::AddressBook;
pub use builder::{FacetDefinition, ManifestBuilder, ManifestInput, UnrootedManifest};
pub use codec::{canonicalize, selector, Signature};
pub use commitment::RoutingCommitment;
pub use diff::{plan_upgrade, FacetCut, FacetCutAction, UpgradePlan};
pub use error::{ManifestError, Result};
pub use manifest::{Manifest, RouteProof};
pub use merkle::{build_proof, build_root, MerkleTree};
