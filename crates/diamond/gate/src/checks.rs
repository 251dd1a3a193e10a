//! The four compliance checks
//!
//! Each check is a pure function of the manifest, the observed live state and
//! the configuration. None of them short-circuits another; each reports its
//! own violations, warnings and unknowns.

use std::collections::HashSet;

use diamond_manifest::{merkle, Manifest};
use diamond_types::{Address, Selector};

use crate::config::GateConfig;
use crate::error::Violation;
use crate::observe::{LiveState, ObservedCode};
use crate::report::{GateCheck, GateKind};

/// Run all four checks.
pub fn evaluate(manifest: &Manifest, live: &LiveState, config: &GateConfig) -> Vec<GateCheck> {
    vec![
        selector_parity(manifest, live, config),
        codehash_parity(manifest, live),
        size_compliance(manifest, live, config),
        merkle_loupe(manifest, live, config),
    ]
}

/// Manifest selectors must equal the live table's business selectors.
///
/// Reserved selectors are excluded from the comparison; declaring one in a
/// business facet is always a violation, whether in the manifest or on-chain.
pub fn selector_parity(manifest: &Manifest, live: &LiveState, config: &GateConfig) -> GateCheck {
    let mut violations = Vec::new();
    let mut unknowns = Vec::new();
    let business: HashSet<Address> = manifest.facet_addresses().into_iter().collect();

    for route in &manifest.routes {
        if config.is_reserved(route.selector) {
            violations.push(Violation::ReservedSelectorInFacet {
                selector: route.selector,
                facet: manifest.facet_label(route.facet),
            });
        }
    }

    match live.live_routes() {
        Some(live_routes) => {
            let expected: HashSet<Selector> = manifest
                .selectors()
                .filter(|s| !config.is_reserved(*s))
                .collect();
            let observed: HashSet<Selector> = live_routes
                .iter()
                .map(|(s, _)| *s)
                .filter(|s| !config.is_reserved(*s))
                .collect();

            for route in &manifest.routes {
                if expected.contains(&route.selector) && !observed.contains(&route.selector) {
                    violations.push(Violation::MissingOnChain {
                        selector: route.selector,
                        facet: manifest.facet_label(route.facet),
                    });
                }
            }
            for (selector, facet) in &live_routes {
                if config.is_reserved(*selector) {
                    if business.contains(facet) {
                        violations.push(Violation::ReservedSelectorInFacet {
                            selector: *selector,
                            facet: manifest.facet_label(*facet),
                        });
                    }
                } else if !expected.contains(selector) {
                    violations.push(Violation::UnexpectedOnChain {
                        selector: *selector,
                        facet: manifest.facet_label(*facet),
                    });
                }
            }
        }
        None => unknowns.push(loupe_unknown(live)),
    }

    GateCheck::new(GateKind::SelectorParity, violations, Vec::new(), unknowns)
}

/// Every facet's observed runtime codehash must equal its declared one.
pub fn codehash_parity(manifest: &Manifest, live: &LiveState) -> GateCheck {
    let mut violations = Vec::new();
    let mut unknowns = Vec::new();

    for address in manifest.facet_addresses() {
        let facet = manifest.facet_label(address);
        let declared = manifest.facet(address).and_then(|record| record.code_hash);
        let Some(declared) = declared else {
            violations.push(Violation::MissingDeclaredCodehash { facet });
            continue;
        };

        match live.code(address) {
            Some(ObservedCode::Code { size: 0, .. }) => {
                violations.push(Violation::FacetNotDeployed { facet });
            }
            Some(ObservedCode::Code { hash, .. }) if *hash != declared => {
                violations.push(Violation::CodehashMismatch {
                    facet,
                    declared,
                    observed: *hash,
                });
            }
            Some(ObservedCode::Code { .. }) => {}
            other => unknowns.push(code_unknown(&facet, other)),
        }
    }

    GateCheck::new(GateKind::CodehashParity, violations, Vec::new(), unknowns)
}

/// Runtime size per facet against the hard ceiling and soft margin.
///
/// Deployed code is measured; otherwise the declared byte size is used.
pub fn size_compliance(manifest: &Manifest, live: &LiveState, config: &GateConfig) -> GateCheck {
    let limits = config.limits;
    let mut violations = Vec::new();
    let mut warnings = Vec::new();
    let mut unknowns = Vec::new();

    for address in manifest.facet_addresses() {
        let facet = manifest.facet_label(address);
        let observed = live.code(address);
        let size = match observed {
            Some(ObservedCode::Code { size, .. }) if *size > 0 => Some(*size),
            _ => manifest.facet(address).and_then(|record| record.byte_size),
        };
        let Some(size) = size else {
            unknowns.push(code_unknown(&facet, observed));
            continue;
        };

        if size > limits.hard_limit {
            violations.push(Violation::SizeLimitExceeded {
                facet,
                size,
                limit: limits.hard_limit,
            });
        } else if size > limits.soft_limit {
            warnings.push(format!(
                "Facet {facet} is {size} bytes, above the {}-byte soft limit",
                limits.soft_limit
            ));
        }
    }

    GateCheck::new(GateKind::SizeCompliance, violations, warnings, unknowns)
}

/// Rebuild the root from the live routing table and compare.
///
/// Live routes are laid out in manifest order; a manifest selector missing
/// on-chain contributes a zero-address leaf and on-chain business selectors
/// absent from the manifest are appended in loupe order.
pub fn merkle_loupe(manifest: &Manifest, live: &LiveState, config: &GateConfig) -> GateCheck {
    let Some(live_routes) = live.live_routes() else {
        return GateCheck::new(GateKind::MerkleLoupe, Vec::new(), Vec::new(), vec![loupe_unknown(live)]);
    };

    let lookup = |selector: Selector| {
        live_routes
            .iter()
            .find(|(s, _)| *s == selector)
            .map(|(_, facet)| *facet)
    };

    let mut rebuilt: Vec<(Selector, Address)> = Vec::with_capacity(manifest.routes.len());
    let mut divergences = Vec::new();
    for route in &manifest.routes {
        let observed = lookup(route.selector).unwrap_or(Address::ZERO);
        if observed != route.facet {
            divergences.push(Violation::RouteDivergence {
                selector: route.selector,
                expected: route.facet,
                observed,
            });
        }
        rebuilt.push((route.selector, observed));
    }
    for (selector, facet) in &live_routes {
        if config.is_reserved(*selector) || manifest.route(*selector).is_some() {
            continue;
        }
        divergences.push(Violation::RouteDivergence {
            selector: *selector,
            expected: Address::ZERO,
            observed: *facet,
        });
        rebuilt.push((*selector, *facet));
    }

    let leaves: Vec<_> = rebuilt
        .iter()
        .map(|(selector, facet)| merkle::leaf(*selector, *facet))
        .collect();
    let observed_root = merkle::build_root(&leaves);

    let mut violations = Vec::new();
    if observed_root != manifest.merkle_root {
        violations.push(Violation::RootMismatch {
            expected: manifest.merkle_root,
            observed: observed_root,
        });
        violations.extend(divergences);
    }

    GateCheck::new(GateKind::MerkleLoupe, violations, Vec::new(), Vec::new())
}

fn loupe_unknown(live: &LiveState) -> String {
    match &live.loupe {
        Err(error) => format!("Loupe unavailable: {error}"),
        Ok(_) => "Loupe unavailable".to_string(),
    }
}

fn code_unknown(facet: &str, observed: Option<&ObservedCode>) -> String {
    match observed {
        Some(ObservedCode::Failed { error }) => format!("Facet {facet} code unavailable: {error}"),
        Some(ObservedCode::Cancelled) => format!("Facet {facet} probe cancelled"),
        _ => format!("Facet {facet} not observed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diamond_manifest::{FacetDefinition, ManifestBuilder};
    use diamond_types::{keccak256, CheckStatus, LoupeFacet};

    use crate::config::{SizeLimits, RESERVED_SELECTORS};

    const CODE_A: [u8; 4] = [0x60, 0x80, 0x60, 0x01];
    const CODE_B: [u8; 4] = [0x60, 0x80, 0x60, 0x02];

    fn sel(byte: u8) -> Selector {
        Selector::new([byte; 4])
    }

    fn facet_a() -> Address {
        Address::repeat_byte(0x11)
    }

    fn facet_b() -> Address {
        Address::repeat_byte(0x22)
    }

    fn manifest() -> Manifest {
        ManifestBuilder::new("1.0.0")
            .facet(
                FacetDefinition::new("Alpha")
                    .with_address(facet_a())
                    .with_selector(sel(0xaa))
                    .with_selector(sel(0xab))
                    .with_code_hash(keccak256(CODE_A)),
            )
            .facet(
                FacetDefinition::new("Beta")
                    .with_address(facet_b())
                    .with_selector(sel(0xbb))
                    .with_code_hash(keccak256(CODE_B)),
            )
            .build()
            .unwrap()
            .seal()
    }

    fn cut_facet() -> LoupeFacet {
        LoupeFacet::new(Address::repeat_byte(0xcc), RESERVED_SELECTORS.to_vec())
    }

    fn live(loupe: Vec<LoupeFacet>) -> LiveState {
        LiveState {
            loupe: Ok(loupe),
            facets: vec![
                (facet_a(), ObservedCode::from_code(&CODE_A)),
                (facet_b(), ObservedCode::from_code(&CODE_B)),
            ],
            cancelled: false,
        }
    }

    fn matching_loupe() -> Vec<LoupeFacet> {
        vec![
            cut_facet(),
            LoupeFacet::new(facet_a(), vec![sel(0xaa), sel(0xab)]),
            LoupeFacet::new(facet_b(), vec![sel(0xbb)]),
        ]
    }

    #[test]
    fn test_matching_system_passes_every_gate() {
        let checks = evaluate(&manifest(), &live(matching_loupe()), &GateConfig::default());
        for check in checks {
            assert_eq!(check.status, CheckStatus::Pass, "{:?}", check);
        }
    }

    #[test]
    fn test_selector_parity_symmetric_difference() {
        let loupe = vec![
            cut_facet(),
            LoupeFacet::new(facet_a(), vec![sel(0xaa), sel(0xab)]),
            LoupeFacet::new(facet_b(), vec![sel(0xbc)]),
        ];
        let check = selector_parity(&manifest(), &live(loupe), &GateConfig::default());
        assert_eq!(check.status, CheckStatus::Fail);
        assert_eq!(
            check.violations,
            vec![
                Violation::MissingOnChain {
                    selector: sel(0xbb),
                    facet: manifest().facet_label(facet_b()),
                },
                Violation::UnexpectedOnChain {
                    selector: sel(0xbc),
                    facet: manifest().facet_label(facet_b()),
                },
            ]
        );
    }

    #[test]
    fn test_reserved_selector_in_business_facet() {
        let owner = RESERVED_SELECTORS[6];
        let loupe = vec![
            LoupeFacet::new(facet_a(), vec![sel(0xaa), sel(0xab), owner]),
            LoupeFacet::new(facet_b(), vec![sel(0xbb)]),
        ];
        let check = selector_parity(&manifest(), &live(loupe), &GateConfig::default());
        assert!(matches!(
            check.violations.as_slice(),
            [Violation::ReservedSelectorInFacet { selector, .. }] if *selector == owner
        ));

        let declared = ManifestBuilder::new("1.0.0")
            .facet(
                FacetDefinition::new("Ownable")
                    .with_address(facet_a())
                    .with_function("owner()"),
            )
            .build()
            .unwrap()
            .seal();
        let check = selector_parity(&declared, &LiveState::unobserved(&declared), &GateConfig::default());
        assert_eq!(check.status, CheckStatus::Fail);
        assert!(matches!(
            check.violations[0],
            Violation::ReservedSelectorInFacet { .. }
        ));
    }

    #[test]
    fn test_codehash_mismatch_is_hard() {
        let mut state = live(matching_loupe());
        state.facets[1].1 = ObservedCode::from_code(&[0xfe]);
        let check = codehash_parity(&manifest(), &state);
        assert_eq!(check.status, CheckStatus::Fail);
        assert!(matches!(
            &check.violations[0],
            Violation::CodehashMismatch { declared, observed, .. }
                if *declared == keccak256(CODE_B) && *observed == keccak256([0xfeu8])
        ));
    }

    #[test]
    fn test_missing_declared_codehash_fails() {
        let manifest = ManifestBuilder::new("1.0.0")
            .facet(FacetDefinition::new("Alpha").with_address(facet_a()).with_selector(sel(0xaa)))
            .build()
            .unwrap()
            .seal();
        let check = codehash_parity(&manifest, &live(matching_loupe()));
        assert_eq!(
            check.violations,
            vec![Violation::MissingDeclaredCodehash {
                facet: manifest.facet_label(facet_a())
            }]
        );
    }

    #[test]
    fn test_undeployed_and_unreachable_facets() {
        let mut state = live(matching_loupe());
        state.facets[0].1 = ObservedCode::from_code(&[]);
        state.facets[1].1 = ObservedCode::Failed {
            error: "timed out".into(),
        };
        let check = codehash_parity(&manifest(), &state);
        assert_eq!(check.status, CheckStatus::Fail);
        assert!(matches!(check.violations[0], Violation::FacetNotDeployed { .. }));
        assert_eq!(check.unknowns.len(), 1);
        assert!(check.unknowns[0].contains("timed out"));
    }

    fn sized(size: usize) -> Manifest {
        ManifestBuilder::new("1.0.0")
            .facet(
                FacetDefinition::new("Sized")
                    .with_address(facet_a())
                    .with_selector(sel(0xaa))
                    .with_byte_size(size),
            )
            .build()
            .unwrap()
            .seal()
    }

    #[test]
    fn test_size_boundaries() {
        let config = GateConfig::default().with_limits(SizeLimits::new(24_576, 18_000).unwrap());

        let at_ceiling = sized(24_576);
        let check = size_compliance(&at_ceiling, &LiveState::unobserved(&at_ceiling), &config);
        assert_eq!(check.violations, vec![]);

        let over = sized(24_577);
        let check = size_compliance(&over, &LiveState::unobserved(&over), &config);
        assert_eq!(check.status, CheckStatus::Fail);
        assert!(matches!(
            check.violations[0],
            Violation::SizeLimitExceeded { size: 24_577, limit: 24_576, .. }
        ));

        let soft = sized(18_001);
        let check = size_compliance(&soft, &LiveState::unobserved(&soft), &config);
        assert_eq!(check.status, CheckStatus::Warn);
        assert_eq!(check.warnings.len(), 1);

        let fine = sized(18_000);
        let check = size_compliance(&fine, &LiveState::unobserved(&fine), &config);
        assert_eq!(check.status, CheckStatus::Pass);
    }

    #[test]
    fn test_observed_size_takes_precedence() {
        let manifest = sized(100);
        let mut state = LiveState::unobserved(&manifest);
        state.facets[0].1 = ObservedCode::from_code(&vec![0u8; 24_577]);
        let check = size_compliance(&manifest, &state, &GateConfig::default());
        assert_eq!(check.status, CheckStatus::Fail);
    }

    #[test]
    fn test_merkle_loupe_reports_divergent_selector() {
        let loupe = vec![
            cut_facet(),
            LoupeFacet::new(facet_a(), vec![sel(0xaa)]),
            LoupeFacet::new(facet_b(), vec![sel(0xbb), sel(0xab)]),
        ];
        let check = merkle_loupe(&manifest(), &live(loupe), &GateConfig::default());
        assert_eq!(check.status, CheckStatus::Fail);
        assert!(matches!(check.violations[0], Violation::RootMismatch { .. }));
        assert_eq!(
            check.violations[1..],
            [Violation::RouteDivergence {
                selector: sel(0xab),
                expected: facet_a(),
                observed: facet_b(),
            }]
        );
    }

    #[test]
    fn test_merkle_loupe_ignores_loupe_order() {
        let loupe = vec![
            LoupeFacet::new(facet_b(), vec![sel(0xbb)]),
            LoupeFacet::new(facet_a(), vec![sel(0xab), sel(0xaa)]),
            cut_facet(),
        ];
        let check = merkle_loupe(&manifest(), &live(loupe), &GateConfig::default());
        assert_eq!(check.status, CheckStatus::Pass);
    }

    #[test]
    fn test_merkle_loupe_extra_and_missing_selectors() {
        let loupe = vec![
            LoupeFacet::new(facet_a(), vec![sel(0xaa), sel(0xab)]),
            LoupeFacet::new(facet_b(), vec![sel(0xbc)]),
        ];
        let check = merkle_loupe(&manifest(), &live(loupe), &GateConfig::default());
        assert_eq!(
            check.violations[1..],
            [
                Violation::RouteDivergence {
                    selector: sel(0xbb),
                    expected: facet_b(),
                    observed: Address::ZERO,
                },
                Violation::RouteDivergence {
                    selector: sel(0xbc),
                    expected: Address::ZERO,
                    observed: facet_b(),
                },
            ]
        );
    }

    #[test]
    fn test_unavailable_loupe_is_unknown_not_failure() {
        let mut state = live(matching_loupe());
        state.loupe = Err("execution reverted".into());
        let checks = evaluate(&manifest(), &state, &GateConfig::default());
        assert_eq!(checks[0].status, CheckStatus::Unknown);
        assert_eq!(checks[1].status, CheckStatus::Pass);
        assert_eq!(checks[2].status, CheckStatus::Pass);
        assert_eq!(checks[3].status, CheckStatus::Unknown);
        assert!(checks[3].unknowns[0].contains("execution reverted"));
    }
}
