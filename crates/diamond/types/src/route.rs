//! Routing table entries

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::selector::Selector;

/// One `selector -> facet` entry of a routing table.
///
/// Serialized as `{"selector": "0x…", "facet": "0x…", "fn": "…"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    pub selector: Selector,

    /// Address of the facet the selector dispatches to
    #[serde(with = "crate::hex::address")]
    pub facet: Address,

    /// Human-readable signature or function name
    #[serde(rename = "fn", default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Route {
    pub fn new(selector: Selector, facet: Address) -> Self {
        Self {
            selector,
            facet,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{} -> {} ({})", self.selector, self.facet, label),
            None => write!(f, "{} -> {}", self.selector, self.facet),
        }
    }
}
