//! Strict hex codecs for persisted values.
//!
//! Every value written to disk is `0x` followed by lowercase hex digits:
//! 8 digits for selectors, 40 for addresses, 64 for hashes. Parsing demands the
//! prefix and the exact digit count but accepts either letter case, so
//! checksummed addresses from registries and explorers load cleanly.
//!
//! The `serde` submodules plug these codecs into `#[serde(with = "...")]`.

use alloy_primitives::{hex, Address, B256};

use crate::error::{HexError, HexKind};

/// Decode a `0x`-prefixed hex string of the given kind.
pub fn decode(kind: HexKind, value: &str) -> Result<Vec<u8>, HexError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| HexError::MissingPrefix {
            kind,
            value: value.to_string(),
        })?;

    let expected = match kind.digits() {
        Some(expected) => expected,
        None if digits.len() % 2 == 1 => digits.len() + 1,
        None => digits.len(),
    };
    if digits.len() != expected {
        return Err(HexError::InvalidLength {
            kind,
            value: value.to_string(),
            expected,
            actual: digits.len(),
        });
    }

    hex::decode(digits).map_err(|_| HexError::InvalidCharacter {
        kind,
        value: value.to_string(),
    })
}

/// Parse a 20-byte address.
pub fn parse_address(value: &str) -> Result<Address, HexError> {
    decode(HexKind::Address, value).map(|bytes| Address::from_slice(&bytes))
}

/// Parse a 32-byte hash.
pub fn parse_hash(value: &str) -> Result<B256, HexError> {
    decode(HexKind::Hash, value).map(|bytes| B256::from_slice(&bytes))
}

/// Parse an arbitrary-length byte string.
pub fn parse_bytes(value: &str) -> Result<Vec<u8>, HexError> {
    decode(HexKind::Bytes, value.trim())
}

pub fn encode_address(address: &Address) -> String {
    encode_bytes(address.as_slice())
}

pub fn encode_hash(hash: &B256) -> String {
    encode_bytes(hash.as_slice())
}

pub fn encode_bytes(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// `#[serde(with = "diamond_types::hex::address")]`
pub mod address {
    use alloy_primitives::Address;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Address, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode_address(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Address, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_address(&raw).map_err(serde::de::Error::custom)
    }
}

/// `#[serde(with = "diamond_types::hex::hash")]`
pub mod hash {
    use alloy_primitives::B256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &B256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode_hash(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<B256, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_hash(&raw).map_err(serde::de::Error::custom)
    }
}

/// `#[serde(with = "diamond_types::hex::option_hash")]`
pub mod option_hash {
    use alloy_primitives::B256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<B256>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(hash) => serializer.serialize_some(&super::encode_hash(hash)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<B256>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|value| super::parse_hash(&value).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// `#[serde(with = "diamond_types::hex::hashes")]`
pub mod hashes {
    use alloy_primitives::B256;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[B256], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            seq.serialize_element(&super::encode_hash(value))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<B256>, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        raw.iter()
            .map(|value| super::parse_hash(value).map_err(serde::de::Error::custom))
            .collect()
    }
}
