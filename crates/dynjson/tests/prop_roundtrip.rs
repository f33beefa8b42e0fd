/// Property-based roundtrip tests.
///
/// `serde_json` acts as the oracle: a generated document is written by
/// `serde_json`, read and re-written by dynjson, and read back by
/// `serde_json`, which must see the same document. Strings additionally get
/// a code-unit-exact check, including lone surrogates `serde_json` cannot
/// represent.
use proptest::prelude::*;
use serde_json::{Map, Number, Value};

use dynjson::{parse, stringify, stringify_with, JsString};

// ============================================================================
// Strategies
// ============================================================================

fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-zA-Z_][a-zA-Z0-9_]{0,12}",
        1 => any::<String>(),
    ]
}

fn arb_json_string() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,30}",
        any::<String>(),
        Just(String::new()),
        Just("say \"hi\"\\".to_string()),
        Just("line1\nline2\r\t\u{8}\u{c}".to_string()),
        Just("\u{0}\u{1f}\u{7f}\u{85}\u{2028}".to_string()),
    ]
}

fn arb_json_integer() -> impl Strategy<Value = Value> {
    (-9_007_199_254_740_991i64..=9_007_199_254_740_991i64)
        .prop_map(|n| Value::Number(Number::from(n)))
}

/// Floats built as `mantissa / 10^n`, skipping whole numbers (those come
/// back as integers).
fn arb_json_float() -> impl Strategy<Value = Value> {
    (-100_000_000i64..100_000_000i64, 1u32..8u32).prop_filter_map(
        "whole numbers are integers",
        |(mantissa, decimals)| {
            let f = mantissa as f64 / 10f64.powi(decimals as i32);
            if f.fract() == 0.0 {
                return None;
            }
            Number::from_f64(f).map(Value::Number)
        },
    )
}

fn arb_primitive() -> impl Strategy<Value = Value> {
    prop_oneof![
        3 => arb_json_string().prop_map(Value::String),
        3 => arb_json_integer(),
        2 => arb_json_float(),
        1 => any::<bool>().prop_map(Value::Bool),
        1 => Just(Value::Null),
    ]
}

fn arb_document() -> impl Strategy<Value = Value> {
    arb_primitive().prop_recursive(5, 96, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            prop::collection::vec((arb_key(), inner), 0..8)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn compact_roundtrip_matches_serde(doc in arb_document()) {
        let input = serde_json::to_string(&doc).unwrap();
        let value = parse(&input).unwrap();
        let output = stringify(&value).unwrap().unwrap();
        let back: Value = serde_json::from_str(&output).unwrap();
        prop_assert_eq!(back, doc);
    }

    #[test]
    fn pretty_roundtrip_matches_serde(doc in arb_document(), indent in 1i32..=12) {
        let input = serde_json::to_string_pretty(&doc).unwrap();
        let value = parse(&input).unwrap();
        let output = stringify_with(&value, None, indent).unwrap().unwrap();
        let back: Value = serde_json::from_str(&output).unwrap();
        prop_assert_eq!(back, doc);
    }

    #[test]
    fn compact_output_matches_serde_for_integers_and_strings(
        doc in prop::collection::vec(
            prop_oneof![
                arb_json_integer(),
                arb_json_string().prop_map(Value::String),
            ],
            0..10,
        )
    ) {
        // Without floats the two writers agree byte for byte.
        let doc = Value::Array(doc);
        let expected = serde_json::to_string(&doc).unwrap();
        let output = stringify(&parse(&expected).unwrap()).unwrap().unwrap();
        prop_assert_eq!(output, expected);
    }

    #[test]
    fn output_is_a_fixed_point(doc in arb_document()) {
        let input = serde_json::to_string(&doc).unwrap();
        let once = stringify(&parse(&input).unwrap()).unwrap().unwrap();
        let twice = stringify(&parse(&once).unwrap()).unwrap().unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn strings_roundtrip_by_code_unit(units in prop::collection::vec(any::<u16>(), 0..40)) {
        let text = stringify(&JsString::from(units.clone()).into()).unwrap().unwrap();
        let back = parse(&text).unwrap();
        prop_assert_eq!(back.as_string().map(JsString::as_units), Some(units.as_slice()));
    }

    #[test]
    fn arbitrary_text_never_panics(text in any::<String>()) {
        let _ = parse(&text);
    }

    #[test]
    fn json_like_text_never_panics(text in "[\\[\\]{}:,\"0-9a-z.eE+\\- \\\\]{0,40}") {
        let _ = parse(&text);
    }
}
