//! Platform constants shared across the toolchain.

use alloy_primitives::{address, Address, B256};

/// Hard ceiling on deployed runtime bytecode (EIP-170).
pub const MAX_RUNTIME_CODE_SIZE: usize = 24_576;

/// Hard ceiling on contract creation code (EIP-3860).
pub const MAX_INIT_CODE_SIZE: usize = 49_152;

/// Deterministic deployment proxy present at the same address on most EVM chains.
///
/// Used as the phase-1 deployer of the two-phase cross-chain scheme.
pub const DEFAULT_SINGLETON_DEPLOYER: Address =
    address!("4e59b44847b379578588920ca78fbf26c0b4956c");

/// Root of an empty Merkle tree.
pub const ZERO_HASH: B256 = B256::ZERO;
