//! Diamond Probe - chain endpoint access
//!
//! A thin, replaceable interface to one network:
//!
//! - **NetworkProbe**: code, code hash and the dispatcher's read-only loupe
//! - **RpcProbe**: HTTP JSON-RPC implementation
//! - **InMemoryProbe**: map-backed implementation with failure injection
//! - **ResilientProbe**: per-call timeout and bounded retry of transient failures
//!
//! Callers that fan out over many networks hold probes as
//! `Arc<dyn NetworkProbe>` and look them up through a [`ProbeProvider`].

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod config;
pub mod error;
pub mod memory;
pub mod probe;
pub mod resilient;
pub mod rpc;

// Re-exports
pub use config::ProbeConfig;
pub use error::{ProbeError, Result};
pub use memory::{FailureMode, FailureScope, InMemoryProbe};
pub use probe::{NetworkProbe, ProbeProvider};
pub use resilient::ResilientProbe;
pub use rpc::RpcProbe;
