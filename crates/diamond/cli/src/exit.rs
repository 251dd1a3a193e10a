//! Process exit codes
//!
//! Gate failures use [`GateKind::exit_code`](diamond_gate::GateKind::exit_code),
//! 10 through 13; the lowest failing gate wins.

use diamond_crosschain::CrossChainOutcome;

pub const PASS: i32 = 0;

/// Malformed input, unreadable file, integrity failure
pub const STRUCTURAL: i32 = 2;

/// Salt policy or fallback misuse
pub const POLICY_MISUSE: i32 = 3;

/// Factory or target address disagreement, chain id or code mismatch
pub const CROSSCHAIN_INCONSISTENT: i32 = 20;

/// Unreachable or cancelled networks in strict mode
pub const CROSSCHAIN_DEGRADED: i32 = 21;

pub fn crosschain(outcome: CrossChainOutcome) -> i32 {
    match outcome {
        CrossChainOutcome::Consistent => PASS,
        CrossChainOutcome::Inconsistent => CROSSCHAIN_INCONSISTENT,
        CrossChainOutcome::Degraded => CROSSCHAIN_DEGRADED,
    }
}
