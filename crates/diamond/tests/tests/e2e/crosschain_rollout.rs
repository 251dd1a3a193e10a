//! Cross-chain rollout: predict offline, then watch networks move from
//! pending to ready as the singleton, factory and target land.

use std::sync::Arc;

use diamond_crosschain::{
    CrossChainOutcome, CrossChainValidator, Finding, NetworkRegistry, NetworkStatus,
    RecommendedAction, RegistryEntry, RowStatus, ValidatorConfig,
};
use diamond_probe::InMemoryProbe;
use diamond_tests::{
    canonical_prediction, deployed_network, fast_probe_config, provider, two_phase_inputs,
    TARGET_RUNTIME,
};
use diamond_types::keccak256;

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

fn registry() -> NetworkRegistry {
    NetworkRegistry::new(vec![
        RegistryEntry::new("mainnet", 1),
        RegistryEntry::new("base", 8453),
        RegistryEntry::new("arbitrum", 42161),
        RegistryEntry::new("goerli", 5).with_status(NetworkStatus::Deprecated),
    ])
    .unwrap()
}

fn config() -> ValidatorConfig {
    ValidatorConfig::default().with_probe(fast_probe_config())
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[tokio::test]
async fn offline_prediction_is_identical_everywhere() {
    let inputs = two_phase_inputs("1.0.0", 1);
    let expected = canonical_prediction(&inputs);

    let report = CrossChainValidator::new(config().with_offline(true))
        .validate(&registry(), &inputs)
        .await
        .unwrap();

    assert_eq!(report.rows.len(), 3);
    assert_eq!(report.skipped, vec!["goerli".to_string()]);
    assert!(report.consistent_factory);
    assert!(report.consistent_target);
    assert_eq!(report.outcome(), CrossChainOutcome::Consistent);
    for row in &report.rows {
        assert_eq!(row.status, RowStatus::Predicted);
        assert_eq!(row.predicted_factory_address, expected.factory_address);
        assert_eq!(row.predicted_target_address, expected.target_address);
    }
}

#[test]
fn new_version_moves_the_target_not_the_factory() {
    let v1 = canonical_prediction(&two_phase_inputs("1.0.0", 1));
    let v2 = canonical_prediction(&two_phase_inputs("2.0.0", 1));

    assert_eq!(v1.factory_address, v2.factory_address);
    assert_ne!(v1.target_address, v2.target_address);
}

#[tokio::test]
async fn rollout_progresses_from_pending_to_ready() {
    let inputs = two_phase_inputs("1.0.0", 7);
    let prediction = canonical_prediction(&inputs);

    let mainnet = Arc::new(deployed_network("mainnet", 1, &prediction));
    let base = Arc::new(InMemoryProbe::new("base", 8453));
    let arbitrum = Arc::new(
        InMemoryProbe::new("arbitrum", 42161)
            .with_code(prediction.singleton_deployer, vec![0x60u8, 0x01]),
    );
    let validator = CrossChainValidator::new(config()).with_probes(provider(vec![
        Arc::clone(&mainnet),
        Arc::clone(&base),
        Arc::clone(&arbitrum),
    ]));

    let report = validator.validate(&registry(), &inputs).await.unwrap();
    assert_eq!(report.row("mainnet").unwrap().status, RowStatus::Ready);
    assert_eq!(report.row("base").unwrap().status, RowStatus::Pending);
    assert_eq!(report.row("arbitrum").unwrap().status, RowStatus::Pending);
    assert_eq!(report.outcome(), CrossChainOutcome::Consistent);

    let action = |network: &str| {
        report
            .recommendations
            .iter()
            .find(|r| r.network == network)
            .map(|r| r.action)
    };
    assert_eq!(action("base"), Some(RecommendedAction::DeploySingleton));
    assert_eq!(action("arbitrum"), Some(RecommendedAction::DeployFactory));
    assert_eq!(action("mainnet"), None);

    // Deploy the remaining pieces
    base.set_code(prediction.singleton_deployer, vec![0x60u8, 0x01]);
    for probe in [&base, &arbitrum] {
        probe.set_code(prediction.factory_address, vec![0x60u8, 0x02]);
        probe.set_code(prediction.target_address, TARGET_RUNTIME.to_vec());
    }

    let report = validator.validate(&registry(), &inputs).await.unwrap();
    for row in &report.rows {
        assert_eq!(row.status, RowStatus::Ready, "{} not ready", row.network);
    }
    assert!(report.recommendations.is_empty());
}

#[tokio::test]
async fn wrong_chain_is_a_hard_mismatch() {
    let inputs = two_phase_inputs("1.0.0", 1);
    let prediction = canonical_prediction(&inputs);

    let probes = provider(vec![
        Arc::new(deployed_network("mainnet", 1, &prediction)),
        // Endpoint for base actually serves optimism
        Arc::new(deployed_network("base", 10, &prediction)),
        Arc::new(deployed_network("arbitrum", 42161, &prediction)),
    ]);
    let report = CrossChainValidator::new(config())
        .with_probes(probes)
        .validate(&registry(), &inputs)
        .await
        .unwrap();

    let base = report.row("base").unwrap();
    assert_eq!(base.status, RowStatus::Mismatch);
    assert!(base.findings.iter().any(|f| matches!(
        f,
        Finding::ChainIdMismatch {
            expected: 8453,
            observed: 10
        }
    )));
    assert_eq!(report.row("mainnet").unwrap().status, RowStatus::Ready);
    assert_eq!(report.outcome(), CrossChainOutcome::Inconsistent);
}

#[tokio::test]
async fn foreign_target_code_is_flagged() {
    let inputs = two_phase_inputs("1.0.0", 1);
    let prediction = canonical_prediction(&inputs);

    let impostor = deployed_network("base", 8453, &prediction)
        .with_code(prediction.target_address, vec![0xfeu8, 0xfe]);
    let probes = provider(vec![
        Arc::new(deployed_network("mainnet", 1, &prediction)),
        Arc::new(impostor),
        Arc::new(deployed_network("arbitrum", 42161, &prediction)),
    ]);
    let report = CrossChainValidator::new(
        config().with_expected_target_codehash(keccak256(TARGET_RUNTIME)),
    )
    .with_probes(probes)
    .validate(&registry(), &inputs)
    .await
    .unwrap();

    let base = report.row("base").unwrap();
    assert_eq!(base.status, RowStatus::Mismatch);
    assert!(base
        .findings
        .iter()
        .any(|f| matches!(f, Finding::TargetCodeMismatch { .. })));
    assert_eq!(report.outcome(), CrossChainOutcome::Inconsistent);
}
