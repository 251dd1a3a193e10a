//! Compliance gate against an in-memory dispatcher built from the same
//! fixture as the manifest, with one side perturbed per test.

use std::sync::Arc;

use diamond_gate::{ComplianceGate, GateConfig, GateKind, GateReport, Violation};
use diamond_probe::{FailureMode, FailureScope, InMemoryProbe, NetworkProbe};
use diamond_tests::{fast_probe_config, selector, DiamondFixture, FacetFixture};
use diamond_types::{CheckStatus, LoupeFacet};

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

fn gate(strict: bool) -> ComplianceGate {
    ComplianceGate::new(
        GateConfig::default()
            .with_strict(strict)
            .with_probe(fast_probe_config()),
    )
    .unwrap()
}

async fn run(fixture: &DiamondFixture, probe: InMemoryProbe, strict: bool) -> GateReport {
    let manifest = fixture.manifest("1.0.0");
    let probe: Arc<dyn NetworkProbe> = Arc::new(probe);
    gate(strict)
        .run(&manifest, fixture.diamond, probe)
        .await
        .unwrap()
}

fn status(report: &GateReport, gate: GateKind) -> CheckStatus {
    report.check(gate).unwrap().status
}

fn single_facet(code_len: usize) -> DiamondFixture {
    DiamondFixture::new(vec![FacetFixture::new("BigFacet", 0x55, &[0xe1], code_len)])
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[tokio::test]
async fn compliant_dispatcher_passes_every_gate() {
    let fixture = DiamondFixture::standard();
    let report = run(&fixture, fixture.probe("mainnet", 1), false).await;

    for kind in GateKind::ALL {
        assert_eq!(status(&report, kind), CheckStatus::Pass, "{kind} did not pass");
    }
    assert!(report.passed());
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.network.as_deref(), Some("mainnet"));
}

#[tokio::test]
async fn size_boundaries() {
    // At the ceiling still passes, above the soft limit with a warning
    let cases = [
        (24_576, CheckStatus::Warn, 0),
        (24_577, CheckStatus::Fail, 12),
        (18_001, CheckStatus::Warn, 0),
        (18_000, CheckStatus::Pass, 0),
    ];

    for (size, expected, exit_code) in cases {
        let fixture = single_facet(size);
        let report = run(&fixture, fixture.probe("mainnet", 1), false).await;
        let check = report.check(GateKind::SizeCompliance).unwrap();

        assert_eq!(check.status, expected, "size {size}");
        assert_eq!(report.exit_code(), exit_code, "size {size}");
        assert_eq!(report.passed(), exit_code == 0, "size {size}");
        if size == 24_577 {
            assert!(check.violations.iter().any(|v| matches!(
                v,
                Violation::SizeLimitExceeded {
                    size: 24_577,
                    limit: 24_576,
                    ..
                }
            )));
        }
    }
}

#[tokio::test]
async fn rerouted_selector_fails_only_merkle_loupe() {
    let fixture = DiamondFixture::standard();
    let token = fixture.facets[0].address;
    let admin = fixture.facets[1].address;

    // 0xa2 now answered by AdminFacet: same selector set, different routing
    let mut loupe = fixture.loupe();
    for facet in loupe.iter_mut() {
        if facet.address == token {
            facet.selectors.retain(|s| *s != selector(0xa2));
        } else if facet.address == admin {
            facet.selectors.push(selector(0xa2));
        }
    }

    let report = run(&fixture, fixture.probe_with_loupe("mainnet", 1, loupe), false).await;

    assert_eq!(status(&report, GateKind::SelectorParity), CheckStatus::Pass);
    assert_eq!(status(&report, GateKind::CodehashParity), CheckStatus::Pass);
    assert_eq!(status(&report, GateKind::SizeCompliance), CheckStatus::Pass);
    assert_eq!(status(&report, GateKind::MerkleLoupe), CheckStatus::Fail);
    assert_eq!(report.failed_gates(), vec![GateKind::MerkleLoupe]);
    assert_eq!(report.exit_code(), 13);

    let check = report.check(GateKind::MerkleLoupe).unwrap();
    assert!(check.violations.iter().any(|v| matches!(
        v,
        Violation::RouteDivergence { selector: s, expected, observed }
            if *s == selector(0xa2) && *expected == token && *observed == admin
    )));
}

#[tokio::test]
async fn missing_selector_is_a_parity_failure() {
    let fixture = DiamondFixture::standard();
    let vault = fixture.facets[2].address;

    let mut loupe = fixture.loupe();
    for facet in loupe.iter_mut().filter(|f| f.address == vault) {
        facet.selectors.retain(|s| *s != selector(0xc3));
    }

    let report = run(&fixture, fixture.probe_with_loupe("mainnet", 1, loupe), false).await;

    assert_eq!(status(&report, GateKind::SelectorParity), CheckStatus::Fail);
    assert_eq!(status(&report, GateKind::MerkleLoupe), CheckStatus::Fail);
    // Lowest failing gate wins
    assert_eq!(report.exit_code(), 10);
    assert!(report
        .check(GateKind::SelectorParity)
        .unwrap()
        .violations
        .iter()
        .any(|v| matches!(v, Violation::MissingOnChain { selector: s, .. } if *s == selector(0xc3))));
}

#[tokio::test]
async fn swapped_facet_code_is_a_codehash_failure() {
    let fixture = DiamondFixture::standard();
    let probe = fixture.probe("mainnet", 1);
    probe.set_code(fixture.facets[1].address, vec![0x60u8, 0x60, 0x60]);

    let report = run(&fixture, probe, false).await;

    assert_eq!(status(&report, GateKind::CodehashParity), CheckStatus::Fail);
    assert_eq!(report.exit_code(), 11);
}

#[tokio::test]
async fn unreachable_network_depends_on_mode() {
    let fixture = DiamondFixture::standard();

    let lenient_probe = fixture.probe("mainnet", 1);
    lenient_probe.fail(FailureScope::All, FailureMode::Unreachable);
    let lenient = run(&fixture, lenient_probe, false).await;
    assert_eq!(status(&lenient, GateKind::MerkleLoupe), CheckStatus::Unknown);
    assert!(lenient.passed());
    assert_eq!(lenient.exit_code(), 0);

    let strict_probe = fixture.probe("mainnet", 1);
    strict_probe.fail(FailureScope::All, FailureMode::Unreachable);
    let strict = run(&fixture, strict_probe, true).await;
    assert!(strict.cancelled);
    assert!(!strict.passed());
    assert_eq!(strict.exit_code(), 10);
}

#[tokio::test]
async fn reserved_selector_in_business_facet_fails_parity() {
    let fixture = DiamondFixture::standard();
    let token = fixture.facets[0].address;

    let mut loupe = fixture.loupe();
    // Steal owner() from the management facet
    let owner = diamond_gate::RESERVED_SELECTORS[6];
    for facet in loupe.iter_mut() {
        facet.selectors.retain(|s| *s != owner);
    }
    loupe.retain(|f| !f.selectors.is_empty());
    loupe.insert(0, LoupeFacet::new(token, vec![owner]));

    let report = run(&fixture, fixture.probe_with_loupe("mainnet", 1, loupe), false).await;

    assert_eq!(status(&report, GateKind::SelectorParity), CheckStatus::Fail);
    assert!(report
        .check(GateKind::SelectorParity)
        .unwrap()
        .violations
        .iter()
        .any(|v| matches!(v, Violation::ReservedSelectorInFacet { .. })));
}
