//! `proptest` strategies for generating document trees.

use proptest::collection::{hash_map, vec};
use proptest::prelude::*;

use crate::document::Document;
use crate::value::Value;

/// A document key: short, possibly empty, possibly non-ASCII.
pub fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z_][a-z0-9_]{0,8}",
        Just(String::new()),
        Just("caf\u{e9}".to_owned()),
        Just("5".to_owned()),
    ]
}

/// A finite number: integers, fractions, and large magnitudes.
pub fn arb_number() -> impl Strategy<Value = f64> {
    prop_oneof![
        (-1_000_000i64..1_000_000).prop_map(|n| n as f64),
        (-1e6f64..1e6),
        Just(0.0),
        Just(1e300),
        Just(-2.5e-300),
    ]
}

/// A string, including the whitespace controls JSON escapes but none of
/// the controls the JSON projection drops.
pub fn arb_string() -> impl Strategy<Value = String> {
    "[^\\x00-\\x08\\x0b\\x0e-\\x1f]{0,12}"
}

/// A scalar value of any kind.
pub fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        arb_number().prop_map(Value::Number),
        arb_string().prop_map(Value::String),
    ]
}

/// Any value, nesting lists and documents up to a few levels.
pub fn arb_value() -> impl Strategy<Value = Value> {
    arb_scalar().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            vec(inner.clone(), 0..6).prop_map(Value::List),
            hash_map(arb_key(), inner, 0..6)
                .prop_map(|entries| Value::Document(entries.into_iter().collect())),
        ]
    })
}

/// A document whose values are drawn from [`arb_value`].
pub fn arb_document() -> impl Strategy<Value = Document> {
    hash_map(arb_key(), arb_value(), 0..8).prop_map(|entries| entries.into_iter().collect())
}
