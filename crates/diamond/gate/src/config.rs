//! Gate configuration

use diamond_probe::ProbeConfig;
use diamond_types::{Selector, MAX_RUNTIME_CODE_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::{GateError, Result};

/// Dispatcher management and introspection selectors: EIP-2535 cut and
/// loupe, ERC-165 and ERC-173.
pub const RESERVED_SELECTORS: [Selector; 8] = [
    Selector::new([0x1f, 0x93, 0x1c, 0x1c]), // diamondCut((address,uint8,bytes4[])[],address,bytes)
    Selector::new([0x7a, 0x0e, 0xd6, 0x27]), // facets()
    Selector::new([0xad, 0xfc, 0xa1, 0x5e]), // facetFunctionSelectors(address)
    Selector::new([0x52, 0xef, 0x6b, 0x2c]), // facetAddresses()
    Selector::new([0xcd, 0xff, 0xac, 0xc6]), // facetAddress(bytes4)
    Selector::new([0x01, 0xff, 0xc9, 0xa7]), // supportsInterface(bytes4)
    Selector::new([0x8d, 0xa5, 0xcb, 0x5b]), // owner()
    Selector::new([0xf2, 0xfd, 0xe3, 0x8b]), // transferOwnership(address)
];

/// Runtime size ceiling and the warning threshold below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeLimits {
    /// Sizes above this fail
    pub hard_limit: usize,
    /// Sizes above this warn
    pub soft_limit: usize,
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            hard_limit: MAX_RUNTIME_CODE_SIZE,
            soft_limit: 18_000,
        }
    }
}

impl SizeLimits {
    pub fn new(hard_limit: usize, soft_limit: usize) -> Result<Self> {
        Self {
            hard_limit,
            soft_limit,
        }
        .validated()
    }

    pub fn validated(self) -> Result<Self> {
        if self.soft_limit > self.hard_limit {
            return Err(GateError::InvalidSizeLimits {
                soft: self.soft_limit,
                hard: self.hard_limit,
            });
        }
        Ok(self)
    }
}

/// Compliance gate settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub limits: SizeLimits,
    /// Selectors owned by the dispatcher itself, excluded from parity
    pub reserved_selectors: Vec<Selector>,
    /// Facets observed at the same time
    pub concurrency: usize,
    /// Stop at the first hard failure or unreachable call
    pub strict: bool,
    pub probe: ProbeConfig,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            limits: SizeLimits::default(),
            reserved_selectors: RESERVED_SELECTORS.to_vec(),
            concurrency: 8,
            strict: false,
            probe: ProbeConfig::default(),
        }
    }
}

impl GateConfig {
    pub fn with_limits(mut self, limits: SizeLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_reserved_selectors(mut self, selectors: Vec<Selector>) -> Self {
        self.reserved_selectors = selectors;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_probe(mut self, probe: ProbeConfig) -> Self {
        self.probe = probe;
        self
    }

    pub fn is_reserved(&self, selector: Selector) -> bool {
        self.reserved_selectors.contains(&selector)
    }
}
