//! Integration tests for Display and Debug implementations.
//!
//! Every collection renders its entries with `Debug`, so strings come out
//! quoted and nested sequences render recursively.

#![cfg(all(feature = "sequence", feature = "persistent"))]

use lazyseq::prelude::*;

// =============================================================================
// Keyed sequences
// =============================================================================

#[test]
fn test_keyed_display() {
    let seq = Seq::from_entries([("a", 1), ("b", 2)]);
    assert_eq!(format!("{seq}"), r#"Seq { "a": 1, "b": 2 }"#);
}

#[test]
fn test_keyed_display_quotes_string_values() {
    let seq = Seq::from_entries([(1, "one".to_string())]);
    assert_eq!(seq.to_string(), r#"Seq { 1: "one" }"#);
}

#[test]
fn test_keyed_display_after_filter() {
    let seq = Seq::from_entries([("a", 1), ("b", 2), ("c", 3)]).filter(|value, _| *value > 1);
    assert_eq!(seq.to_string(), r#"Seq { "b": 2, "c": 3 }"#);
}

#[test]
fn test_empty_keyed_display() {
    assert_eq!(Seq::<&str, i32>::empty().to_string(), "Seq {}");
}

// =============================================================================
// Indexed sequences
// =============================================================================

#[test]
fn test_indexed_display() {
    assert_eq!(IndexedSeq::from_values([1, 2, 3]).to_string(), "Seq [ 1, 2, 3 ]");
}

#[test]
fn test_indexed_debug_matches_display() {
    let seq = IndexedSeq::from_values(['x']);
    assert_eq!(format!("{seq:?}"), "Seq [ 'x' ]");
}

#[test]
fn test_grouped_display_nests() {
    let groups = IndexedSeq::from_values([1, 2, 3]).group_by(|value, _| value % 2 == 0);
    assert_eq!(groups.to_string(), "Seq { false: Seq [ 1, 3 ], true: Seq [ 2 ] }");
}

#[test]
fn test_nested_keyed_in_indexed() {
    let nested = IndexedSeq::from_values([Seq::from_entries([("k", 'v')])]);
    assert_eq!(nested.to_string(), r#"Seq [ Seq { "k": 'v' } ]"#);
}

// =============================================================================
// Persistent collections
// =============================================================================

#[test]
fn test_set_display() {
    assert_eq!(PersistentSet::from_values(["only"]).to_string(), r#"Set { "only" }"#);
    assert_eq!(PersistentSet::<u8>::new().to_string(), "Set {}");
}

#[test]
fn test_set_display_lists_every_member() {
    let rendered = PersistentSet::from_values([1, 2]).to_string();
    assert!(rendered == "Set { 1, 2 }" || rendered == "Set { 2, 1 }");
}

#[test]
fn test_set_inside_sequence() {
    let seq = IndexedSeq::from_values([PersistentSet::from_values([7])]);
    assert_eq!(seq.to_string(), "Seq [ Set { 7 } ]");
}

#[test]
fn test_hashmap_debug() {
    let map = PersistentHashMap::singleton(1, "one");
    assert_eq!(format!("{map:?}"), r#"{1: "one"}"#);
}
