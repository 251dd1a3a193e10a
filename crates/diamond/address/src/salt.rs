//! Content-addressed salt policies
//!
//! Every salt is `keccak256(keccak256(domainTag) ++ fields...)` with a fixed,
//! per-policy field order. Integers are 32-byte big-endian words, addresses
//! are their 20 raw bytes, `versionHash = keccak256(version)` and
//! `contentHash = keccak256(content)`.
//!
//! | policy                     | fields after the tag                              |
//! |----------------------------|---------------------------------------------------|
//! | `factory-v1`               | versionHash                                       |
//! | `target-global-v1`         | contentHash, nonce, versionHash                   |
//! | `target-global-literal-v1` | content, nonce, versionHash                       |
//! | `target-chain-v1`          | chainId, deployer, contentHash, nonce, versionHash |
//!
//! Policies are never mixed: a chain binding given to a global policy, or
//! missing from a chain-scoped one, is rejected.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::U256;
use diamond_types::{keccak256, Address, Bytes, B256};
use serde::{Deserialize, Serialize};

use crate::error::{AddressError, Result};

/// What a salt is used to deploy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaltRole {
    Factory,
    Target,
}

impl fmt::Display for SaltRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaltRole::Factory => write!(f, "factory"),
            SaltRole::Target => write!(f, "target"),
        }
    }
}

/// Named, versioned salt derivation formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaltPolicy {
    #[serde(rename = "factory-v1")]
    FactoryV1,
    #[serde(rename = "target-global-v1")]
    TargetGlobalV1,
    #[serde(rename = "target-global-literal-v1")]
    TargetGlobalLiteralV1,
    #[serde(rename = "target-chain-v1")]
    TargetChainV1,
}

impl SaltPolicy {
    pub const ALL: [SaltPolicy; 4] = [
        SaltPolicy::FactoryV1,
        SaltPolicy::TargetGlobalV1,
        SaltPolicy::TargetGlobalLiteralV1,
        SaltPolicy::TargetChainV1,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SaltPolicy::FactoryV1 => "factory-v1",
            SaltPolicy::TargetGlobalV1 => "target-global-v1",
            SaltPolicy::TargetGlobalLiteralV1 => "target-global-literal-v1",
            SaltPolicy::TargetChainV1 => "target-chain-v1",
        }
    }

    pub fn domain_tag(&self) -> &'static str {
        match self {
            SaltPolicy::FactoryV1 => "diamond.salt.factory.v1",
            SaltPolicy::TargetGlobalV1 => "diamond.salt.target.global.v1",
            SaltPolicy::TargetGlobalLiteralV1 => "diamond.salt.target.global-literal.v1",
            SaltPolicy::TargetChainV1 => "diamond.salt.target.chain.v1",
        }
    }

    pub fn role(&self) -> SaltRole {
        match self {
            SaltPolicy::FactoryV1 => SaltRole::Factory,
            _ => SaltRole::Target,
        }
    }

    pub fn is_chain_scoped(&self) -> bool {
        matches!(self, SaltPolicy::TargetChainV1)
    }

    /// Fail unless this policy derives salts for `role`.
    pub fn expect_role(&self, role: SaltRole) -> Result<()> {
        if self.role() == role {
            Ok(())
        } else {
            Err(AddressError::SaltRoleMismatch {
                policy: *self,
                expected: role,
                actual: self.role(),
            })
        }
    }
}

impl fmt::Display for SaltPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SaltPolicy {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self> {
        SaltPolicy::ALL
            .into_iter()
            .find(|policy| policy.name() == s)
            .ok_or_else(|| AddressError::UnknownSaltPolicy(s.to_string()))
    }
}

/// Chain identity a chain-scoped salt is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainBinding {
    pub chain_id: u64,
    pub deployer: Address,
}

/// Chain-independent salt inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaltInputs {
    /// Content the salt is addressed by, usually the target init code
    pub content: Bytes,
    pub version: String,
    pub nonce: U256,
}

impl SaltInputs {
    pub fn new(content: impl Into<Bytes>, version: impl Into<String>, nonce: U256) -> Self {
        Self {
            content: content.into(),
            version: version.into(),
            nonce,
        }
    }

    pub fn version_hash(&self) -> B256 {
        keccak256(self.version.as_bytes())
    }

    pub fn content_hash(&self) -> B256 {
        keccak256(&self.content)
    }
}

/// Derive the salt for `policy`.
///
/// `chain` must be present exactly when the policy is chain-scoped.
pub fn derive_salt(
    policy: SaltPolicy,
    inputs: &SaltInputs,
    chain: Option<&ChainBinding>,
) -> Result<B256> {
    match (policy.is_chain_scoped(), chain) {
        (true, None) => {
            return Err(AddressError::SaltPolicyMismatch {
                policy,
                reason: "chain-scoped policy requires a chain id and deployer".to_string(),
            })
        }
        (false, Some(binding)) => {
            return Err(AddressError::SaltPolicyMismatch {
                policy,
                reason: format!(
                    "global policy given a binding to chain {}",
                    binding.chain_id
                ),
            })
        }
        _ => {}
    }

    let mut preimage = Vec::with_capacity(32 * 5 + inputs.content.len());
    preimage.extend_from_slice(keccak256(policy.domain_tag().as_bytes()).as_slice());

    match policy {
        SaltPolicy::FactoryV1 => {}
        SaltPolicy::TargetGlobalV1 => {
            preimage.extend_from_slice(inputs.content_hash().as_slice());
            preimage.extend_from_slice(&inputs.nonce.to_be_bytes::<32>());
        }
        SaltPolicy::TargetGlobalLiteralV1 => {
            preimage.extend_from_slice(&inputs.content);
            preimage.extend_from_slice(&inputs.nonce.to_be_bytes::<32>());
        }
        SaltPolicy::TargetChainV1 => {
            if let Some(binding) = chain {
                preimage.extend_from_slice(&U256::from(binding.chain_id).to_be_bytes::<32>());
                preimage.extend_from_slice(binding.deployer.as_slice());
            }
            preimage.extend_from_slice(inputs.content_hash().as_slice());
            preimage.extend_from_slice(&inputs.nonce.to_be_bytes::<32>());
        }
    }
    preimage.extend_from_slice(inputs.version_hash().as_slice());

    Ok(keccak256(&preimage))
}
