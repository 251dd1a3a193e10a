//! Manifest lifecycle: build, seal, prove, persist, tamper, upgrade, commit.

use diamond_manifest::merkle::{self, hash_pair};
use diamond_manifest::{
    plan_upgrade, FacetCutAction, FacetDefinition, Manifest, ManifestBuilder, ManifestError,
    RoutingCommitment,
};
use diamond_tests::{facet_address, selector, DiamondFixture, FacetFixture};
use diamond_types::{Address, Selector};

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

fn two_routes(a: Address, b: Address) -> Manifest {
    ManifestBuilder::new("1.0.0")
        .facet(
            FacetDefinition::new("FacetA")
                .with_address(a)
                .with_selector("0xaaaaaaaa".parse().unwrap()),
        )
        .facet(
            FacetDefinition::new("FacetB")
                .with_address(b)
                .with_selector("0xbbbbbbbb".parse().unwrap()),
        )
        .build()
        .unwrap()
        .seal()
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[test]
fn two_route_root_is_the_pair_hash() {
    let a = Address::repeat_byte(0x01);
    let b = Address::repeat_byte(0x02);
    let manifest = two_routes(a, b);

    let leaf0 = merkle::leaf("0xaaaaaaaa".parse().unwrap(), a);
    let leaf1 = merkle::leaf("0xbbbbbbbb".parse().unwrap(), b);
    assert_eq!(manifest.leaves, vec![leaf0, leaf1]);
    assert_eq!(manifest.merkle_root, hash_pair(&leaf0, &leaf1));

    let proof = manifest.proof_for("0xaaaaaaaa".parse().unwrap()).unwrap();
    assert_eq!(proof.index, 0);
    assert_eq!(proof.proof, vec![leaf1]);
    assert!(proof.verify());
    assert!(merkle::verify(&leaf0, &proof.proof, &manifest.merkle_root));
}

#[test]
fn any_address_bit_flip_moves_the_root() {
    let a = Address::repeat_byte(0x01);
    let b = Address::repeat_byte(0x02);
    let root = two_routes(a, b).merkle_root;

    for byte in 0..20 {
        for bit in 0..8 {
            let mut flipped = [0x01u8; 20];
            flipped[byte] ^= 1 << bit;
            let moved = two_routes(Address::from(flipped), b).merkle_root;
            assert_ne!(moved, root, "flip of byte {byte} bit {bit} kept the root");
        }
    }

    let mut flipped = [0x02u8; 20];
    flipped[19] ^= 0x80;
    assert_ne!(two_routes(a, Address::from(flipped)).merkle_root, root);
}

#[test]
fn collision_names_both_facets() {
    let shared: Selector = "0x12345678".parse().unwrap();
    let result = ManifestBuilder::new("1.0.0")
        .facet(
            FacetDefinition::new("FacetA")
                .with_address(facet_address(0x0a))
                .with_selector(shared),
        )
        .facet(
            FacetDefinition::new("FacetB")
                .with_address(facet_address(0x0b))
                .with_selector(shared),
        )
        .build();

    match result {
        Err(ManifestError::SelectorCollision {
            selector,
            facet_a,
            facet_b,
        }) => {
            assert_eq!(selector, shared);
            assert!(facet_a.starts_with("FacetA"));
            assert!(facet_b.starts_with("FacetB"));
        }
        other => panic!("expected a selector collision, got {other:?}"),
    }
}

#[test]
fn saved_manifest_loads_and_detects_tampering() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("manifest.json");
    let manifest = DiamondFixture::standard().manifest("1.0.0");

    manifest.save(&path).unwrap();
    let loaded = Manifest::load(&path).unwrap();
    assert_eq!(loaded.merkle_root, manifest.merkle_root);
    assert_eq!(loaded.routes, manifest.routes);
    assert_eq!(loaded.digest().unwrap(), manifest.digest().unwrap());

    let mut json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    json["routes"][0]["facet"] = serde_json::Value::String(format!("0x{}", "99".repeat(20)));
    std::fs::write(&path, serde_json::to_string_pretty(&json).unwrap()).unwrap();

    let err = Manifest::load(&path).unwrap_err();
    assert!(matches!(err, ManifestError::IntegrityMismatch { .. }), "{err}");
}

#[test]
fn every_route_has_a_verifying_proof() {
    let manifest = DiamondFixture::standard().manifest("1.0.0");
    assert_eq!(manifest.routes.len(), 6);

    for route in &manifest.routes {
        let proof = manifest.proof_for(route.selector).unwrap();
        assert_eq!(proof.facet, route.facet);
        assert!(proof.verify(), "proof for {} failed", route.selector);
    }
    assert!(matches!(
        manifest.proof_for(selector(0xee)),
        Err(ManifestError::SelectorNotFound(_))
    ));
}

#[test]
fn upgrade_plan_and_commitment() {
    let v1 = DiamondFixture::new(vec![
        FacetFixture::new("TokenFacet", 0x11, &[0xa1, 0xa2], 1_024),
        FacetFixture::new("AdminFacet", 0x22, &[0xb1], 1_024),
    ])
    .manifest("1.0.0");

    // 0xa1 unchanged, 0xa2 moves to AdminV2, 0xb1 removed, 0xc1 added
    let v2 = DiamondFixture::new(vec![
        FacetFixture::new("TokenFacet", 0x11, &[0xa1], 1_024),
        FacetFixture::new("AdminV2", 0x44, &[0xa2, 0xc1], 1_024),
    ])
    .manifest("2.0.0");

    let plan = plan_upgrade(&v1, &v2).unwrap();
    assert_eq!(plan.from_version, "1.0.0");
    assert_eq!(plan.to_version, "2.0.0");
    assert_eq!(plan.count(FacetCutAction::Add), 1);
    assert_eq!(plan.count(FacetCutAction::Replace), 1);
    assert_eq!(plan.count(FacetCutAction::Remove), 1);
    assert_eq!(plan.unchanged, 1);

    let removal = plan
        .cuts
        .iter()
        .find(|cut| cut.action == FacetCutAction::Remove)
        .unwrap();
    assert_eq!(removal.facet_address, Address::ZERO);
    assert_eq!(removal.selectors, vec![selector(0xb1)]);

    assert!(matches!(
        plan_upgrade(&v1, &v1),
        Err(ManifestError::VersionNotAdvanced { .. })
    ));

    let commitment = RoutingCommitment::new(&v2, 5, 4).unwrap();
    assert_eq!(commitment.epoch, 5);
    assert_eq!(commitment.merkle_root, v2.merkle_root);
    assert!(commitment.matches(&v2));
    assert!(!commitment.matches(&v1));

    assert!(matches!(
        RoutingCommitment::new(&v2, 4, 4),
        Err(ManifestError::EpochNotInFuture { epoch: 4, active: 4 })
    ));
}
