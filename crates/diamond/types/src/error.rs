//! Hex decoding errors

use thiserror::Error;

/// Kind of value a hex string was expected to encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexKind {
    Selector,
    Address,
    Hash,
    Bytes,
}

impl HexKind {
    /// Number of hex digits after the `0x` prefix, if fixed.
    pub fn digits(&self) -> Option<usize> {
        match self {
            HexKind::Selector => Some(8),
            HexKind::Address => Some(40),
            HexKind::Hash => Some(64),
            HexKind::Bytes => None,
        }
    }
}

impl std::fmt::Display for HexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HexKind::Selector => write!(f, "selector"),
            HexKind::Address => write!(f, "address"),
            HexKind::Hash => write!(f, "hash"),
            HexKind::Bytes => write!(f, "bytes"),
        }
    }
}

/// Malformed hex encoding of a selector, address, hash or byte string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    #[error("Invalid {kind} {value:?}: missing 0x prefix")]
    MissingPrefix { kind: HexKind, value: String },

    #[error("Invalid {kind} {value:?}: {actual} hex digits, expected {expected}")]
    InvalidLength {
        kind: HexKind,
        value: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid {kind} {value:?}: non-hex characters")]
    InvalidCharacter { kind: HexKind, value: String },
}
