//! Property tests: CREATE2 prediction and salt derivation are pure functions
//! of their inputs, and sensitive to every one of them.

use diamond_address::{
    derive_salt, init_code_hash, predict_address, predict_address_from_code, SaltInputs,
    SaltPolicy, U256,
};
use diamond_types::{keccak256, Address, B256};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn arb_address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::from)
}

fn arb_hash() -> impl Strategy<Value = B256> {
    any::<[u8; 32]>().prop_map(B256::from)
}

fn arb_init_code() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..256)
}

fn arb_version() -> impl Strategy<Value = String> {
    (0u32..10, 0u32..20, 0u32..50).prop_map(|(a, b, c)| format!("{a}.{b}.{c}"))
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn prediction_is_deterministic(
        deployer in arb_address(),
        salt in arb_hash(),
        code in arb_init_code(),
    ) {
        let from_code = predict_address_from_code(deployer, salt, &code).unwrap();
        let hash = init_code_hash(&code).unwrap();
        prop_assert_eq!(hash, keccak256(&code));
        prop_assert_eq!(from_code, predict_address(deployer, salt, hash));
        prop_assert_eq!(from_code, predict_address_from_code(deployer, salt, &code).unwrap());
    }

    #[test]
    fn every_input_moves_the_address(
        deployer in arb_address(),
        other_deployer in arb_address(),
        salt in arb_hash(),
        other_salt in arb_hash(),
        hash in arb_hash(),
        other_hash in arb_hash(),
    ) {
        let base = predict_address(deployer, salt, hash);
        if deployer != other_deployer {
            prop_assert_ne!(base, predict_address(other_deployer, salt, hash));
        }
        if salt != other_salt {
            prop_assert_ne!(base, predict_address(deployer, other_salt, hash));
        }
        if hash != other_hash {
            prop_assert_ne!(base, predict_address(deployer, salt, other_hash));
        }
    }

    #[test]
    fn target_salt_tracks_nonce_and_version(
        code in arb_init_code(),
        version in arb_version(),
        other_version in arb_version(),
        nonce in any::<u64>(),
        other_nonce in any::<u64>(),
    ) {
        let salt = |version: &str, nonce: u64| {
            let inputs = SaltInputs::new(code.clone(), version, U256::from(nonce));
            derive_salt(SaltPolicy::TargetGlobalV1, &inputs, None).unwrap()
        };

        let base = salt(&version, nonce);
        prop_assert_eq!(base, salt(&version, nonce));
        if nonce != other_nonce {
            prop_assert_ne!(base, salt(&version, other_nonce));
        }
        if version != other_version {
            prop_assert_ne!(base, salt(&other_version, nonce));
        }
    }

    #[test]
    fn factory_salt_ignores_target_content(
        code in arb_init_code(),
        other_code in arb_init_code(),
        nonce in any::<u64>(),
    ) {
        let salt = |code: &[u8], nonce: u64| {
            let inputs = SaltInputs::new(code.to_vec(), "1.0.0", U256::from(nonce));
            derive_salt(SaltPolicy::FactoryV1, &inputs, None).unwrap()
        };
        prop_assert_eq!(salt(&code, nonce), salt(&other_code, nonce.wrapping_add(1)));
    }
}
