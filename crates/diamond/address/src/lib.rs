//! Diamond Address - deterministic deployment addresses
//!
//! - **salt**: named, versioned salt policies over content, version and nonce
//! - **create2**: EIP-1014 address prediction from init code or its hash
//! - **two_phase**: singleton deployer → factory → target, identical on every chain
//! - **artifact**: init code resolution with an explicit fallback opt-in
//!
//! All functions are pure. Invalid input and policy misuse come back as
//! [`AddressError`]; nothing is retried or silently corrected.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod artifact;
pub mod create2;
pub mod error;
pub mod salt;
pub mod two_phase;

// Re-exports
pub use alloy_primitives::U256;
pub use artifact::{Artifact, ArtifactSet, ResolvedArtifact, Substitution};
pub use create2::{init_code_hash, predict_address, predict_address_from_code};
pub use error::{AddressError, Result};
pub use salt::{derive_salt, ChainBinding, SaltInputs, SaltPolicy, SaltRole};
pub use two_phase::{TwoPhaseInputs, TwoPhasePrediction, TwoPhasePredictor};
