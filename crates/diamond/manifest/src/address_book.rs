//! Facet address books
//!
//! Deployment tooling emits facet addresses either keyed by name
//! (`{"TokenFacet": "0x…"}`) or as a list (`[{"name": "TokenFacet",
//! "address": "0x…"}]`). Both shapes are normalized at parse time into one
//! ordered name → address map; nothing downstream sees the raw shape.

use std::fmt;

use diamond_types::hex;
use diamond_types::Address;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ManifestError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressBook {
    entries: Vec<(String, Address)>,
}

#[derive(Serialize, Deserialize)]
struct RawEntry {
    name: String,
    address: String,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; names are unique.
    pub fn insert(&mut self, name: impl Into<String>, address: Address) -> Result<()> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(ManifestError::DuplicateAddressBookEntry { name });
        }
        self.entries.push((name, address));
        Ok(())
    }

    fn insert_hex(&mut self, name: String, address: &str) -> Result<()> {
        let address = hex::parse_address(address)?;
        self.insert(name, address)
    }

    pub fn get(&self, name: &str) -> Option<Address> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, address)| *address)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Address)> {
        self.entries
            .iter()
            .map(|(name, address)| (name.as_str(), *address))
    }

    /// Parse either accepted JSON shape. Takes text, since a
    /// `serde_json::Value` has already merged repeated keys.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Serialize for AddressBook {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let entries: Vec<RawEntry> = self
            .entries
            .iter()
            .map(|(name, address)| RawEntry {
                name: name.clone(),
                address: hex::encode_address(address),
            })
            .collect();
        entries.serialize(serializer)
    }
}

struct AddressBookVisitor;

impl<'de> Visitor<'de> for AddressBookVisitor {
    type Value = AddressBook;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object of name to address, or a list of {name, address}")
    }

    // Repeated names reach `insert` and fail there.
    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<AddressBook, A::Error> {
        let mut book = AddressBook::new();
        while let Some((name, address)) = map.next_entry::<String, String>()? {
            book.insert_hex(name, &address).map_err(de::Error::custom)?;
        }
        Ok(book)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<AddressBook, A::Error> {
        let mut book = AddressBook::new();
        while let Some(entry) = seq.next_element::<RawEntry>()? {
            book.insert_hex(entry.name, &entry.address).map_err(de::Error::custom)?;
        }
        Ok(book)
    }
}

impl<'de> Deserialize<'de> for AddressBook {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(AddressBookVisitor)
    }
}
