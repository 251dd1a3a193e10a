//! End-to-end tests across the diamond crates.
//!
//! Each module drives a full flow: manifest lifecycle, cross-chain rollout,
//! and the compliance gate against a live (in-memory) dispatcher.

#[path = "e2e/manifest_lifecycle.rs"]
mod manifest_lifecycle;

#[path = "e2e/crosschain_rollout.rs"]
mod crosschain_rollout;

#[path = "e2e/gate_compliance.rs"]
mod gate_compliance;
