//! Property tests: a selector depends only on the function name and the
//! canonical parameter types, never on spacing, keywords or parameter names.

use diamond_manifest::Signature;
use diamond_types::{keccak256, Selector};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// (declared type, canonical type)
fn arb_type() -> impl Strategy<Value = (&'static str, &'static str)> {
    prop_oneof![
        Just(("address", "address")),
        Just(("uint256", "uint256")),
        Just(("uint", "uint256")),
        Just(("int", "int256")),
        Just(("bool", "bool")),
        Just(("bytes32", "bytes32")),
        Just(("bytes", "bytes")),
        Just(("string", "string")),
        Just(("uint8[]", "uint8[]")),
        Just(("address[2]", "address[2]")),
        Just(("uint256 []", "uint256[]")),
        Just(("uint [ 3 ]", "uint256[3]")),
        Just(("bytes32[ ] [2]", "bytes32[][2]")),
    ]
}

fn arb_name() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9_]{0,12}".prop_filter("keyword", |name| name != "function")
}

fn arb_space() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(""), Just(" "), Just("  "), Just("\t")]
}

/// Array dimensions written with `pad` before and inside each bracket.
fn padded_dims(dims: &[Option<u8>], pad: &str) -> (String, String) {
    let mut declared = String::new();
    let mut canonical = String::new();
    for dim in dims {
        let size = dim.map(|n| n.to_string()).unwrap_or_default();
        declared.push_str(&format!("{pad}[{pad}{size}{pad}]"));
        canonical.push_str(&format!("[{size}]"));
    }
    (declared, canonical)
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn declaration_noise_does_not_change_the_selector(
        name in arb_name(),
        params in prop::collection::vec((arb_type(), "[a-z]{1,8}"), 0..5),
        keyword in any::<bool>(),
        pad in arb_space(),
    ) {
        let canonical = format!(
            "{name}({})",
            params.iter().map(|((_, ty), _)| *ty).collect::<Vec<_>>().join(",")
        );
        let declared = format!(
            "{}{name}{pad}({pad}{}{pad})",
            if keyword { "function " } else { "" },
            params
                .iter()
                .map(|((ty, _), param)| format!("{ty} {param}"))
                .collect::<Vec<_>>()
                .join(&format!("{pad},{pad}"))
        );

        let parsed = Signature::parse(&declared).unwrap();
        prop_assert_eq!(parsed.canonical(), canonical.clone());

        let hash = keccak256(canonical.as_bytes());
        let expected = Selector::new([hash[0], hash[1], hash[2], hash[3]]);
        prop_assert_eq!(parsed.selector(), expected);
        prop_assert_eq!(Signature::parse(&canonical).unwrap().selector(), expected);
    }

    #[test]
    fn array_spacing_does_not_change_the_selector(
        name in arb_name(),
        (declared_ty, canonical_ty) in arb_type(),
        dims in prop::collection::vec(prop::option::of(1u8..9), 1..3),
        pad in arb_space(),
        param in "[a-z]{1,8}",
    ) {
        let (declared_dims, canonical_dims) = padded_dims(&dims, pad);
        let declared = format!("{name}({declared_ty}{declared_dims} {param})");
        let canonical = format!("{name}({canonical_ty}{canonical_dims})");

        let parsed = Signature::parse(&declared).unwrap();
        prop_assert_eq!(parsed.canonical(), canonical.clone());
        prop_assert_eq!(parsed.selector(), Signature::parse(&canonical).unwrap().selector());
    }

    #[test]
    fn selector_text_round_trips(bytes in any::<[u8; 4]>()) {
        let selector = Selector::new(bytes);
        let text = selector.to_string();
        prop_assert_eq!(text.len(), 10);
        prop_assert_eq!(text.parse::<Selector>().unwrap(), selector);
    }
}
