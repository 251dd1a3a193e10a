//! Diamond Cross-Chain - multi-network consistency validation
//!
//! Given a network registry and the chain-independent deployment inputs, the
//! validator predicts every network's factory and target, probes each network
//! concurrently for the singleton deployer and deployed code, and aggregates:
//!
//! - one [`NetworkRow`] per network, degraded to `unknown` when its endpoint fails
//! - the `consistentFactory` / `consistentTarget` headline flags
//! - [`Recommendation`]s naming the network and the step to take
//!
//! Configuration is an explicit [`ValidatorConfig`] value; nothing is read
//! from process-wide state, so independent runs can share a process.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod error;
pub mod registry;
pub mod report;
pub mod validator;

// Re-exports
pub use error::{CrossChainError, Result};
pub use registry::{NetworkRegistry, NetworkStatus, RegistryEntry};
pub use report::{
    CrossChainOutcome, CrossChainReport, Finding, NetworkRow, Observation, Recommendation,
    RecommendedAction, RowStatus,
};
pub use validator::{CrossChainValidator, ValidatorConfig};
