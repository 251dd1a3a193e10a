//! Diamond Types - shared primitives for the diamond toolchain
//!
//! A "diamond" is a selector-routed contract system: one dispatcher forwards
//! each call to the facet registered for the call's 4-byte selector. This crate
//! holds the vocabulary every other crate speaks:
//!
//! - **Selector**: 4-byte entry point identifier
//! - **Route**: one `selector -> facet address` entry of the routing table
//! - **FacetRecord**: a deployable unit and the metadata used to verify it
//! - **LoupeFacet**: what a live dispatcher reports through its introspection surface
//! - **CheckResult**: one named pass/warn/fail outcome in a validation report
//!
//! Addresses and hashes are `alloy-primitives` types. The [`hex`] module holds
//! the strict lowercase encodings used in persisted files.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod constants;
pub mod error;
pub mod facet;
pub mod hex;
pub mod report;
pub mod route;
pub mod selector;

pub use alloy_primitives::{keccak256, Address, Bytes, B256};

pub use constants::{
    DEFAULT_SINGLETON_DEPLOYER, MAX_INIT_CODE_SIZE, MAX_RUNTIME_CODE_SIZE, ZERO_HASH,
};
pub use error::{HexError, HexKind};
pub use facet::{FacetRecord, LoupeFacet};
pub use report::{CheckResult, CheckStatus, ValidationReport};
pub use route::Route;
pub use selector::Selector;
