//! Property-based tests for the deterministic cores.

#[path = "property/merkle_proofs.rs"]
mod merkle_proofs;

#[path = "property/create2_addresses.rs"]
mod create2_addresses;

#[path = "property/selector_codec.rs"]
mod selector_codec;
