#![cfg(feature = "serde")]

//! Integration tests for serde support.
//!
//! Keyed sequences serialize as maps, indexed sequences and sets as
//! sequences, and nesting recurses through the values.

use lazyseq::prelude::*;
use rstest::rstest;
use serde_json::json;

// =============================================================================
// Sequences
// =============================================================================

#[rstest]
fn test_keyed_to_json() {
    let seq = Seq::from_entries([("a", 1), ("b", 2)]);
    assert_eq!(seq.to_json().unwrap(), json!({ "a": 1, "b": 2 }));
}

#[rstest]
fn test_keyed_serializes_in_order() {
    let seq = Seq::from_entries([("z", 1), ("a", 2)]);
    assert_eq!(serde_json::to_string(&seq).unwrap(), r#"{"z":1,"a":2}"#);
}

#[rstest]
fn test_indexed_to_json() {
    let seq = IndexedSeq::from_values([1, 2, 3]).reverse();
    assert_eq!(seq.to_json().unwrap(), json!([3, 2, 1]));
}

#[rstest]
fn test_filtered_indexed_serializes_unknown_length() {
    let seq = IndexedSeq::from_values(1..=6).filter(|value, _| value % 3 == 0);
    assert_eq!(serde_json::to_string(&seq).unwrap(), "[3,6]");
}

#[rstest]
fn test_nested_sequences_recurse() {
    let groups = Seq::from_entries([("a", 1), ("b", 2), ("c", 3)]).group_by(|value, _| value % 2);
    assert_eq!(
        groups.to_json().unwrap(),
        json!({ "1": { "a": 1, "c": 3 }, "0": { "b": 2 } })
    );
}

#[rstest]
fn test_indexed_of_keyed() {
    let seq = IndexedSeq::from_values([Seq::from_entries([("k", "v")])]);
    assert_eq!(seq.to_json().unwrap(), json!([{ "k": "v" }]));
}

#[rstest]
fn test_non_string_keys_fail() {
    let seq = Seq::from_entries([((1, 2), 3)]);
    assert!(seq.to_json().is_err());
}

// =============================================================================
// Persistent collections
// =============================================================================

#[rstest]
fn test_set_to_json() {
    let json = PersistentSet::from_values([5, 5, 6]).to_json().unwrap();
    let mut members: Vec<i64> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|member| member.as_i64().unwrap())
        .collect();
    members.sort_unstable();
    assert_eq!(members, vec![5, 6]);
}

#[rstest]
fn test_hashmap_serializes_as_object() {
    let map = PersistentHashMap::new().insert("x".to_string(), 1).insert("y".to_string(), 2);
    let value = serde_json::to_value(&map).unwrap();
    assert_eq!(value, json!({ "x": 1, "y": 2 }));
}

#[rstest]
fn test_sequence_of_sets() {
    let seq = IndexedSeq::from_values([PersistentSet::from_values(["only"])]);
    assert_eq!(seq.to_json().unwrap(), json!([["only"]]));
}
