//! Property tests for canonical encoding and attestation tokens
//!
//! Encoding must not depend on key insertion order, and tokens for the same
//! payload must differ whenever the attesting identity differs.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use genii_core::{encode, sign, LedgerSecret, Payload, PayloadValue};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn arb_leaf() -> impl Strategy<Value = PayloadValue> {
    prop_oneof![
        Just(PayloadValue::Null),
        any::<bool>().prop_map(PayloadValue::from),
        any::<i64>().prop_map(PayloadValue::from),
        (-1.0e9f64..1.0e9f64).prop_map(PayloadValue::from),
        "[ -~\u{e9}\u{1f600}]{0,12}".prop_map(PayloadValue::from),
    ]
}

fn arb_value() -> impl Strategy<Value = PayloadValue> {
    arb_leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(PayloadValue::Sequence),
            prop::collection::btree_map("[a-z_]{1,6}", inner, 0..4).prop_map(|m| {
                PayloadValue::Mapping(m.into_iter().collect::<Payload>())
            }),
        ]
    })
}

fn arb_entries() -> impl Strategy<Value = BTreeMap<String, PayloadValue>> {
    prop::collection::btree_map("[a-zA-Z0-9_]{1,8}", arb_value(), 0..8)
}

/// Rebuild every mapping, nested ones included, in a different insertion order
fn permuted(value: &PayloadValue, seed: u64) -> PayloadValue {
    match value {
        PayloadValue::Mapping(map) => PayloadValue::Mapping(permuted_mapping(map, seed)),
        PayloadValue::Sequence(items) => {
            PayloadValue::Sequence(items.iter().map(|item| permuted(item, seed)).collect())
        }
        leaf => leaf.clone(),
    }
}

fn permuted_mapping(map: &Payload, seed: u64) -> Payload {
    let mut entries: Vec<(String, PayloadValue)> = map
        .iter()
        .map(|(key, value)| (key.clone(), permuted(value, seed.rotate_left(7))))
        .collect();
    if seed & 1 == 0 {
        entries.reverse();
    }
    if !entries.is_empty() {
        let by = (seed as usize) % entries.len();
        entries.rotate_left(by);
    }
    entries.into_iter().collect()
}

proptest! {
    /// Encoding is independent of insertion order
    #[test]
    fn encoding_ignores_insertion_order(entries in arb_entries(), seed in any::<u64>()) {
        let forward: Payload = entries.clone().into_iter().collect();
        let reversed: Payload = entries.clone().into_iter().rev().collect();

        let mut rotated: Vec<_> = entries.into_iter().collect();
        if !rotated.is_empty() {
            let by = (seed as usize) % rotated.len();
            rotated.rotate_left(by);
        }
        let rotated: Payload = rotated.into_iter().collect();

        let a = encode(&forward).unwrap();
        prop_assert_eq!(&a, &encode(&reversed).unwrap());
        prop_assert_eq!(&a, &encode(&rotated).unwrap());
    }

    /// Nested mappings are sorted too, not only the top level
    #[test]
    fn nested_encoding_ignores_insertion_order(entries in arb_entries(), seed in any::<u64>()) {
        let forward: Payload = entries.into_iter().collect();
        let reordered = permuted_mapping(&forward, seed);
        let reversed = permuted_mapping(&forward, seed & !1);

        let a = encode(&forward).unwrap();
        prop_assert_eq!(&a, &encode(&reordered).unwrap());
        prop_assert_eq!(&a, &encode(&reversed).unwrap());
    }

    /// Canonical output never contains non-ASCII bytes
    #[test]
    fn encoding_is_ascii(entries in arb_entries()) {
        let payload: Payload = entries.into_iter().collect();
        let bytes = encode(&payload).unwrap();
        prop_assert!(bytes.as_bytes().is_ascii());
    }

    /// Canonical output is a JSON object with the same top-level keys
    #[test]
    fn encoding_is_valid_json(entries in arb_entries()) {
        let payload: Payload = entries.into_iter().collect();
        let text = encode(&payload).unwrap().to_string();
        let parsed = Payload::from_json_str(&text).unwrap();
        prop_assert_eq!(parsed.len(), payload.len());
        for (key, _) in payload.iter() {
            prop_assert!(parsed.get(key).is_some());
        }
    }

    /// Distinct identities never share a token for the same payload
    #[test]
    fn roles_are_separated(
        entries in arb_entries(),
        a in "[A-Z_0-9]{1,12}",
        b in "[A-Z_0-9]{1,12}",
    ) {
        prop_assume!(a != b);
        let payload: Payload = entries.into_iter().collect();
        let canonical = encode(&payload).unwrap();
        let secret = LedgerSecret::new("property-secret").unwrap();
        prop_assert_ne!(sign(&canonical, &a, &secret), sign(&canonical, &b, &secret));
    }
}

#[test]
fn nested_mapping_order_does_not_change_encoding() {
    let forward = Payload::new().with(
        "limits",
        Payload::new()
            .with("daily", 10)
            .with("weekly", Payload::new().with("b", 2).with("a", 1)),
    );
    let backward = Payload::new().with(
        "limits",
        Payload::new()
            .with("weekly", Payload::new().with("a", 1).with("b", 2))
            .with("daily", 10),
    );
    assert_eq!(encode(&forward).unwrap(), encode(&backward).unwrap());
    assert_eq!(
        encode(&forward).unwrap().to_string(),
        r#"{"limits": {"daily": 10, "weekly": {"a": 1, "b": 2}}}"#
    );
}

#[test]
fn actor_and_auditor_tokens_differ() {
    let canonical = encode(&Payload::new().with("spend", 500)).unwrap();
    let secret = LedgerSecret::new("s3cret").unwrap();
    assert_ne!(
        sign(&canonical, "actor", &secret),
        sign(&canonical, "auditor", &secret)
    );
}

#[test]
fn secret_changes_token() {
    let canonical = encode(&Payload::new().with("spend", 500)).unwrap();
    let one = LedgerSecret::new("one").unwrap();
    let two = LedgerSecret::new("two").unwrap();
    assert_ne!(
        sign(&canonical, "MKT_PA_001", &one),
        sign(&canonical, "MKT_PA_001", &two)
    );
}
