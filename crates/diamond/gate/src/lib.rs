//! Diamond Gate - routing compliance gate
//!
//! Confirms a deployed dispatcher matches its manifest and stays within the
//! platform's structural limits. Four independent checks, none of which
//! short-circuits another:
//!
//! - **selector parity**: manifest selectors equal the live business selectors
//! - **codehash parity**: observed runtime code hashes to the declared codehash
//! - **size compliance**: runtime size within the hard ceiling, warning above the soft limit
//! - **Merkle/loupe agreement**: the live routing table rebuilds the manifest root
//!
//! Each gate has its own exit code; the lowest failing one wins.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod checks;
pub mod config;
pub mod error;
pub mod gate;
pub mod observe;
pub mod report;

// Re-exports
pub use config::{GateConfig, SizeLimits, RESERVED_SELECTORS};
pub use error::{GateError, Result, Violation};
pub use gate::ComplianceGate;
pub use observe::{LiveState, ObservedCode};
pub use report::{GateCheck, GateKind, GateReport};
