//! 4-byte function selectors.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::FixedBytes;
use serde::{Deserialize, Serialize};

use crate::error::{HexError, HexKind};

/// Identifier of a callable entry point: the first four bytes of the hash of
/// its canonical signature.
///
/// Displayed and persisted as `0x` + 8 lowercase hex digits.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Selector(pub [u8; 4]);

impl Selector {
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Left-aligned 32-byte ABI word (`bytes4` encoding).
    pub fn to_abi_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[..4].copy_from_slice(&self.0);
        word
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", u32::from_be_bytes(self.0))
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector({})", self)
    }
}

impl FromStr for Selector {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = crate::hex::decode(HexKind::Selector, s)?;
        let mut out = [0u8; 4];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl From<[u8; 4]> for Selector {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl From<FixedBytes<4>> for Selector {
    fn from(bytes: FixedBytes<4>) -> Self {
        Self(bytes.0)
    }
}

impl From<Selector> for FixedBytes<4> {
    fn from(selector: Selector) -> Self {
        FixedBytes(selector.0)
    }
}

impl Serialize for Selector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Selector {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
