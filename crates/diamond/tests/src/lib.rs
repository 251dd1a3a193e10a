//! Shared fixtures for the diamond end-to-end and property tests.
//!
//! A [`DiamondFixture`] describes a deployed dispatcher: its facets, their
//! selectors and runtime code. From it the tests derive the matching
//! manifest and an in-memory network serving the same system, then perturb
//! one side.

use std::collections::HashMap;
use std::sync::Arc;

use diamond_address::{
    Artifact, ArtifactSet, TwoPhaseInputs, TwoPhasePrediction, TwoPhasePredictor, U256,
};
use diamond_gate::RESERVED_SELECTORS;
use diamond_manifest::{FacetDefinition, Manifest, ManifestBuilder};
use diamond_probe::{InMemoryProbe, NetworkProbe, ProbeConfig, ProbeProvider};
use diamond_types::{keccak256, Address, LoupeFacet, Selector, DEFAULT_SINGLETON_DEPLOYER};

/// Selector with all four bytes set to `byte`.
pub fn selector(byte: u8) -> Selector {
    Selector::new([byte; 4])
}

pub fn facet_address(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

/// Runtime code of exactly `len` bytes, distinguished by `tag`.
pub fn runtime_code(tag: u8, len: usize) -> Vec<u8> {
    let mut code = vec![tag; len];
    if let Some(first) = code.first_mut() {
        *first = 0x60;
    }
    code
}

/// Single attempt, short timeout.
pub fn fast_probe_config() -> ProbeConfig {
    ProbeConfig {
        timeout_ms: 1_000,
        retries: 0,
        retry_delay_ms: 1,
    }
}

/// One deployed facet.
#[derive(Debug, Clone)]
pub struct FacetFixture {
    pub name: String,
    pub address: Address,
    pub selectors: Vec<Selector>,
    pub code: Vec<u8>,
}

impl FacetFixture {
    pub fn new(name: impl Into<String>, index: u8, selectors: &[u8], code_len: usize) -> Self {
        Self {
            name: name.into(),
            address: facet_address(index),
            selectors: selectors.iter().map(|b| selector(*b)).collect(),
            code: runtime_code(index, code_len),
        }
    }

    pub fn definition(&self) -> FacetDefinition {
        self.selectors.iter().fold(
            FacetDefinition::new(self.name.clone())
                .with_address(self.address)
                .with_code_hash(keccak256(&self.code)),
            |definition, selector| definition.with_selector(*selector),
        )
    }
}

/// A dispatcher and its business facets.
#[derive(Debug, Clone)]
pub struct DiamondFixture {
    pub diamond: Address,
    /// Facet holding the cut, loupe and ownership selectors
    pub management: Address,
    pub facets: Vec<FacetFixture>,
}

impl DiamondFixture {
    pub fn new(facets: Vec<FacetFixture>) -> Self {
        Self {
            diamond: Address::repeat_byte(0xdd),
            management: Address::repeat_byte(0xcc),
            facets,
        }
    }

    /// Three facets: two selectors, one selector, three selectors.
    pub fn standard() -> Self {
        Self::new(vec![
            FacetFixture::new("TokenFacet", 0x11, &[0xa1, 0xa2], 4_096),
            FacetFixture::new("AdminFacet", 0x22, &[0xb1], 2_048),
            FacetFixture::new("VaultFacet", 0x33, &[0xc1, 0xc2, 0xc3], 8_192),
        ])
    }

    pub fn manifest(&self, version: &str) -> Manifest {
        let builder = self
            .facets
            .iter()
            .fold(ManifestBuilder::new(version), |builder, facet| {
                builder.facet(facet.definition())
            });
        builder
            .build()
            .expect("fixture facets form a valid manifest")
            .seal()
    }

    /// The loupe answer of the deployed dispatcher.
    pub fn loupe(&self) -> Vec<LoupeFacet> {
        let mut loupe = vec![LoupeFacet::new(self.management, RESERVED_SELECTORS.to_vec())];
        loupe.extend(
            self.facets
                .iter()
                .map(|facet| LoupeFacet::new(facet.address, facet.selectors.clone())),
        );
        loupe
    }

    /// A network serving this dispatcher with `loupe` in place of the
    /// fixture's own.
    pub fn probe_with_loupe(&self, network: &str, chain_id: u64, loupe: Vec<LoupeFacet>) -> InMemoryProbe {
        self.facets
            .iter()
            .fold(InMemoryProbe::new(network, chain_id), |probe, facet| {
                probe.with_code(facet.address, facet.code.clone())
            })
            .with_diamond(self.diamond, loupe)
    }

    pub fn probe(&self, network: &str, chain_id: u64) -> InMemoryProbe {
        self.probe_with_loupe(network, chain_id, self.loupe())
    }
}

pub const FACTORY_INIT_CODE: [u8; 4] = [0x60, 0x80, 0x60, 0x01];
pub const TARGET_INIT_CODE: [u8; 4] = [0x60, 0x80, 0x60, 0x02];
pub const TARGET_RUNTIME: [u8; 3] = [0x60, 0x00, 0xf3];

pub fn two_phase_inputs(version: &str, nonce: u64) -> TwoPhaseInputs {
    TwoPhaseInputs {
        factory_init_code: FACTORY_INIT_CODE.to_vec().into(),
        target: ArtifactSet::new(
            "Target",
            Some(Artifact::new("Target", TARGET_INIT_CODE.to_vec())),
        ),
        version: version.to_string(),
        nonce: U256::from(nonce),
        allow_fallback: false,
    }
}

/// Prediction under the canonical singleton deployer.
pub fn canonical_prediction(inputs: &TwoPhaseInputs) -> TwoPhasePrediction {
    TwoPhasePredictor::new(DEFAULT_SINGLETON_DEPLOYER)
        .predict(inputs)
        .expect("fixture inputs predict")
}

/// A network with singleton, factory and target all deployed.
pub fn deployed_network(network: &str, chain_id: u64, prediction: &TwoPhasePrediction) -> InMemoryProbe {
    InMemoryProbe::new(network, chain_id)
        .with_code(prediction.singleton_deployer, vec![0x60u8, 0x01])
        .with_code(prediction.factory_address, vec![0x60u8, 0x02])
        .with_code(prediction.target_address, TARGET_RUNTIME.to_vec())
}

/// Probes by network name.
pub fn provider(probes: Vec<Arc<InMemoryProbe>>) -> Arc<dyn ProbeProvider> {
    let map: HashMap<String, Arc<dyn NetworkProbe>> = probes
        .into_iter()
        .map(|probe| {
            let name = probe.network().to_string();
            (name, probe as Arc<dyn NetworkProbe>)
        })
        .collect();
    Arc::new(map)
}
