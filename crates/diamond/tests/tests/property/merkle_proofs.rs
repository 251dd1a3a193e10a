//! Property tests: every route's inclusion proof verifies against the root,
//! and no other leaf does.

use diamond_manifest::merkle::{self, MerkleTree};
use diamond_manifest::{FacetDefinition, ManifestBuilder};
use diamond_types::{Address, Selector, B256};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn arb_hash() -> impl Strategy<Value = B256> {
    any::<[u8; 32]>().prop_map(B256::from)
}

fn arb_leaves() -> impl Strategy<Value = Vec<B256>> {
    prop::collection::vec(arb_hash(), 1..40)
}

/// Distinct selectors, each routed to one of a handful of facets.
fn arb_routes() -> impl Strategy<Value = Vec<(Selector, u8)>> {
    prop::collection::btree_map(any::<[u8; 4]>(), 1u8..5, 1..30).prop_map(|routes| {
        routes
            .into_iter()
            .map(|(bytes, facet)| (Selector::new(bytes), facet))
            .collect()
    })
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn every_leaf_proof_verifies(leaves in arb_leaves()) {
        let tree = MerkleTree::new(&leaves);
        let root = tree.root();
        prop_assert_eq!(root, merkle::build_root(&leaves));

        for (index, leaf) in leaves.iter().enumerate() {
            let proof = tree.proof(index).unwrap();
            prop_assert!(merkle::verify(leaf, &proof, &root), "leaf {} of {}", index, leaves.len());
        }
        prop_assert!(tree.proof(leaves.len()).is_err());
    }

    #[test]
    fn tampered_leaf_fails_its_proof(
        leaves in arb_leaves(),
        pick in any::<prop::sample::Index>(),
        byte in 0usize..32,
        bit in 0u8..8,
    ) {
        let index = pick.index(leaves.len());
        let tree = MerkleTree::new(&leaves);
        let proof = tree.proof(index).unwrap();

        let mut tampered = leaves[index];
        tampered.0[byte] ^= 1 << bit;
        prop_assert!(!merkle::verify(&tampered, &proof, &tree.root()));
    }

    #[test]
    fn changing_any_leaf_moves_the_root(
        leaves in arb_leaves(),
        pick in any::<prop::sample::Index>(),
        replacement in arb_hash(),
    ) {
        let index = pick.index(leaves.len());
        prop_assume!(leaves[index] != replacement);

        let mut changed = leaves.clone();
        changed[index] = replacement;
        prop_assert_ne!(merkle::build_root(&leaves), merkle::build_root(&changed));
    }

    #[test]
    fn manifest_proofs_verify(routes in arb_routes()) {
        let builder = (1u8..5).fold(ManifestBuilder::new("1.0.0"), |builder, facet| {
            let selectors: Vec<Selector> = routes
                .iter()
                .filter(|(_, f)| *f == facet)
                .map(|(s, _)| *s)
                .collect();
            if selectors.is_empty() {
                return builder;
            }
            builder.facet(selectors.into_iter().fold(
                FacetDefinition::new(format!("Facet{facet}")).with_address(Address::repeat_byte(facet)),
                |definition, selector| definition.with_selector(selector),
            ))
        });
        let manifest = builder.build().unwrap().seal();

        prop_assert_eq!(manifest.routes.len(), routes.len());
        prop_assert!(manifest.verify_integrity().is_ok());
        for route in &manifest.routes {
            let proof = manifest.proof_for(route.selector).unwrap();
            prop_assert!(proof.verify());
            prop_assert_eq!(proof.leaf, merkle::leaf(route.selector, route.facet));
        }
    }
}
