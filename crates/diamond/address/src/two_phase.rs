//! Two-phase cross-chain addressing
//!
//! Phase 1 deploys a factory through the singleton deployer with a
//! version-derived salt. Phase 2 deploys the target through that factory
//! with a content/nonce/version-derived salt. No input is chain-specific, so
//! the target address is the same on every chain where the singleton
//! deployer exists at the expected address.

use alloy_primitives::U256;
use diamond_types::hex;
use diamond_types::{Address, Bytes, B256, DEFAULT_SINGLETON_DEPLOYER};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::artifact::{ArtifactSet, Substitution};
use crate::create2;
use crate::error::{AddressError, Result};
use crate::salt::{self, SaltInputs, SaltPolicy, SaltRole};

/// Inputs shared by every network.
#[derive(Debug, Clone)]
pub struct TwoPhaseInputs {
    pub factory_init_code: Bytes,
    pub target: ArtifactSet,
    pub version: String,
    pub nonce: U256,
    pub allow_fallback: bool,
}

/// Predicted factory and target for one singleton deployer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoPhasePrediction {
    #[serde(with = "hex::address")]
    pub singleton_deployer: Address,

    pub factory_policy: SaltPolicy,
    #[serde(with = "hex::hash")]
    pub factory_salt: B256,
    #[serde(with = "hex::hash")]
    pub factory_init_code_hash: B256,
    #[serde(with = "hex::address")]
    pub factory_address: Address,

    pub target_policy: SaltPolicy,
    pub target_artifact: String,
    #[serde(with = "hex::hash")]
    pub target_salt: B256,
    #[serde(with = "hex::hash")]
    pub target_init_code_hash: B256,
    #[serde(with = "hex::address")]
    pub target_address: Address,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substitution: Option<Substitution>,
}

/// Predictor for the singleton → factory → target scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwoPhasePredictor {
    singleton_deployer: Address,
    factory_policy: SaltPolicy,
    target_policy: SaltPolicy,
}

impl Default for TwoPhasePredictor {
    fn default() -> Self {
        Self {
            singleton_deployer: DEFAULT_SINGLETON_DEPLOYER,
            factory_policy: SaltPolicy::FactoryV1,
            target_policy: SaltPolicy::TargetGlobalV1,
        }
    }
}

impl TwoPhasePredictor {
    pub fn new(singleton_deployer: Address) -> Self {
        Self {
            singleton_deployer,
            ..Self::default()
        }
    }

    pub fn singleton_deployer(&self) -> Address {
        self.singleton_deployer
    }

    /// Select the factory salt policy; must derive factory salts.
    pub fn with_factory_policy(mut self, policy: SaltPolicy) -> Result<Self> {
        policy.expect_role(SaltRole::Factory)?;
        self.factory_policy = policy;
        Ok(self)
    }

    /// Select the target salt policy; must be a chain-agnostic target policy.
    pub fn with_target_policy(mut self, policy: SaltPolicy) -> Result<Self> {
        if policy.is_chain_scoped() {
            return Err(AddressError::ChainScopedCrossChain { policy });
        }
        policy.expect_role(SaltRole::Target)?;
        self.target_policy = policy;
        Ok(self)
    }

    pub fn predict(&self, inputs: &TwoPhaseInputs) -> Result<TwoPhasePrediction> {
        let resolved = inputs.target.resolve(inputs.allow_fallback)?;

        let factory_init_code_hash = create2::init_code_hash(&inputs.factory_init_code)?;
        let target_init_code_hash = create2::init_code_hash(&resolved.artifact.init_code)?;

        let factory_inputs = SaltInputs::new(
            inputs.factory_init_code.clone(),
            inputs.version.clone(),
            inputs.nonce,
        );
        let factory_salt = salt::derive_salt(self.factory_policy, &factory_inputs, None)?;
        let factory_address =
            create2::predict_address(self.singleton_deployer, factory_salt, factory_init_code_hash);

        let target_inputs = SaltInputs::new(
            resolved.artifact.init_code.clone(),
            inputs.version.clone(),
            inputs.nonce,
        );
        let target_salt = salt::derive_salt(self.target_policy, &target_inputs, None)?;
        let target_address =
            create2::predict_address(factory_address, target_salt, target_init_code_hash);

        debug!(
            singleton = %self.singleton_deployer,
            factory = %factory_address,
            target = %target_address,
            "Predicted two-phase addresses"
        );

        Ok(TwoPhasePrediction {
            singleton_deployer: self.singleton_deployer,
            factory_policy: self.factory_policy,
            factory_salt,
            factory_init_code_hash,
            factory_address,
            target_policy: self.target_policy,
            target_artifact: resolved.artifact.name,
            target_salt,
            target_init_code_hash,
            target_address,
            substitution: resolved.substitution,
        })
    }
}
