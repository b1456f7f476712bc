#![cfg(feature = "sequence")]
//! Integration tests for keyed sequences.

use lazyseq::prelude::*;
use rstest::rstest;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

fn abc() -> Seq<&'static str, i32> {
    Seq::from_entries([("a", 1), ("b", 2), ("c", 3)])
}

// =============================================================================
// Construction
// =============================================================================

#[rstest]
fn test_from_entries_keeps_order_and_length() {
    let seq = abc();
    assert_eq!(seq.length(), Some(3));
    assert_eq!(seq.keys().to_vec(), vec!["a", "b", "c"]);
    assert_eq!(seq.to_vec(), vec![1, 2, 3]);
}

#[rstest]
fn test_from_btree_map_iterates_sorted() {
    let map = BTreeMap::from([("z", 26), ("a", 1)]);
    let seq: Seq<_, _> = map.into();
    assert_eq!(seq.keys().to_vec(), vec!["a", "z"]);
}

#[rstest]
fn test_collect_builds_keyed_sequence() {
    let seq: Seq<char, usize> = "hey".chars().zip(0..).collect();
    assert_eq!(seq.get(&'y'), Some(2));
}

#[rstest]
fn test_macro_builds_keyed_sequence() {
    let seq = lazyseq::seq! { "x" => 10, "y" => 20 };
    assert_eq!(seq.get(&"y"), Some(20));
    assert_eq!(seq.length(), Some(2));
}

// =============================================================================
// Transformations
// =============================================================================

#[rstest]
fn test_filter_to_object() {
    let object: BTreeMap<_, _> = abc().filter(|value, _| *value > 1).to_object();
    assert_eq!(object, BTreeMap::from([("b", 2), ("c", 3)]));
}

#[rstest]
fn test_filter_length_unknown_until_traversed() {
    let filtered = abc().filter(|value, _| *value != 2);
    assert_eq!(filtered.length(), None);
    assert_eq!(filtered.count(), 2);
    filtered.cache_result();
    assert_eq!(filtered.length(), Some(2));
}

#[rstest]
fn test_map_sees_keys() {
    let labelled = abc().map(|value, key| format!("{key}={value}"));
    assert_eq!(labelled.join(","), "a=1,b=2,c=3");
}

#[rstest]
fn test_reverse_keeps_keys() {
    let reversed = abc().reverse();
    assert_eq!(reversed.keys().to_vec(), vec!["c", "b", "a"]);
    assert_eq!(reversed.get(&"a"), Some(1));
}

#[rstest]
fn test_concat_appends_and_reverses_operands() {
    let joined = abc().concat([Seq::from_entries([("d", 4)]), Seq::empty()]);
    assert_eq!(joined.length(), Some(4));
    assert_eq!(joined.to_vec(), vec![1, 2, 3, 4]);
    assert_eq!(joined.reverse().to_vec(), vec![4, 3, 2, 1]);
}

#[rstest]
fn test_concat_with_unknown_operand_has_unknown_length() {
    let joined = abc().concat([abc().filter(|value, _| *value > 2)]);
    assert_eq!(joined.length(), None);
    assert_eq!(joined.count(), 4);
}

#[rstest]
#[case(0, vec![])]
#[case(2, vec![1, 2])]
#[case(5, vec![1, 2, 3])]
fn test_take(#[case] count: usize, #[case] expected: Vec<i32>) {
    assert_eq!(abc().take(count).to_vec(), expected);
}

#[rstest]
#[case(0, vec![1, 2, 3])]
#[case(1, vec![2, 3])]
#[case(5, vec![])]
fn test_skip(#[case] count: usize, #[case] expected: Vec<i32>) {
    assert_eq!(abc().skip(count).to_vec(), expected);
}

#[rstest]
fn test_take_last_and_skip_last() {
    assert_eq!(abc().take_last(2).to_vec(), vec![2, 3]);
    assert_eq!(abc().skip_last(2).to_vec(), vec![1]);
}

#[rstest]
fn test_while_and_until_variants() {
    assert_eq!(abc().take_while(|value, _| *value < 3).to_vec(), vec![1, 2]);
    assert_eq!(abc().take_until(|value, _| *value == 2).to_vec(), vec![1]);
    assert_eq!(abc().skip_while(|value, _| *value < 2).to_vec(), vec![2, 3]);
    assert_eq!(abc().skip_until(|value, _| *value == 3).to_vec(), vec![3]);
}

#[rstest]
#[case(0, Some(2), vec![("a", 1), ("b", 2)])]
#[case(1, None, vec![("b", 2), ("c", 3)])]
#[case(-1, None, vec![("c", 3)])]
#[case(0, Some(-2), vec![("a", 1)])]
#[case(2, Some(1), vec![])]
fn test_slice_keeps_keys(
    #[case] begin: isize,
    #[case] end: Option<isize>,
    #[case] expected: Vec<(&'static str, i32)>,
) {
    assert_eq!(abc().slice(begin, end).to_object::<Vec<_>>(), expected);
}

#[rstest]
fn test_slice_whole_range_returns_self() {
    let seq = abc();
    assert!(seq.slice(0, None).ptr_eq(&seq));
}

#[rstest]
fn test_negative_slice_of_unknown_length() {
    let filtered = abc().filter(|value, _| *value > 1);
    assert_eq!(filtered.slice(-1, None).to_object::<Vec<_>>(), vec![("c", 3)]);
}

#[rstest]
fn test_flip_swaps_roles() {
    let flipped = abc().flip();
    assert_eq!(flipped.get(&2), Some("b"));
    assert_eq!(flipped.flip().to_object::<Vec<_>>(), abc().to_object::<Vec<_>>());
}

#[rstest]
fn test_entries_and_to_keyed_are_inverse() {
    let seq = abc();
    let pairs = seq.entries();
    assert_eq!(pairs.to_vec(), vec![("a", 1), ("b", 2), ("c", 3)]);
    assert!(pairs.to_keyed().equals(&seq));
}

#[rstest]
fn test_group_by_first_occurrence_order() {
    let seq = Seq::from_entries([("a", 3), ("b", 2), ("c", 5), ("d", 4)]);
    let groups = seq.group_by(|value, _| value % 2 == 0);

    assert_eq!(groups.keys().to_vec(), vec![false, true]);
    let odd = groups.get(&false).map(|bucket| bucket.to_object::<Vec<_>>());
    assert_eq!(odd, Some(vec![("a", 3), ("c", 5)]));
}

// =============================================================================
// Queries
// =============================================================================

#[rstest]
fn test_find_variants() {
    let seq = Seq::from_entries([("a", 1), ("b", 2), ("c", 1)]);
    assert_eq!(seq.find_key(|value, _| *value == 1), Some("a"));
    assert_eq!(seq.find_last_key(|value, _| *value == 1), Some("c"));
    assert_eq!(seq.find(|value, _| *value > 5), None);
}

#[rstest]
fn test_get_distinguishes_absent_from_stored_none() {
    let seq = Seq::from_entries([("present", None::<i32>)]);
    assert_eq!(seq.get(&"present"), Some(None));
    assert_eq!(seq.get(&"absent"), None);
    assert!(seq.has(&"present"));
}

#[rstest]
fn test_folds_run_in_both_directions() {
    let forward = abc().reduce(String::new(), |text, value, key| format!("{text}{key}{value}"));
    let backward = abc().reduce_right(String::new(), |text, value, key| format!("{text}{key}{value}"));
    assert_eq!(forward, "a1b2c3");
    assert_eq!(backward, "c3b2a1");
}

#[rstest]
fn test_every_and_some() {
    assert!(abc().every(|value, _| *value > 0));
    assert!(!abc().every(|value, _| *value > 1));
    assert!(abc().some(|_, key| *key == "b"));
    assert!(!Seq::<i32, i32>::empty().some(|_, _| true));
}

#[rstest]
fn test_first_and_last() {
    assert_eq!(abc().first(), Some(1));
    assert_eq!(abc().last(), Some(3));
    assert_eq!(Seq::<i32, i32>::empty().last(), None);
}

#[rstest]
fn test_equals_compares_keys_and_values() {
    assert!(abc().equals(&abc()));
    assert!(!abc().equals(&abc().map(|value, _| value * 2)));
    assert!(!abc().equals(&abc().flip().flip().reverse()));
}

#[rstest]
fn test_for_each_reports_visited_count() {
    let mut seen = Vec::new();
    let visited = abc().for_each(|value, _| {
        seen.push(value);
        value < 2
    });
    assert_eq!(visited, 1);
    assert_eq!(seen, vec![1, 2]);
    assert_eq!(abc().for_each(|_, _| ()), 3);
}

// =============================================================================
// Caching
// =============================================================================

#[rstest]
fn test_cache_result_runs_producer_once() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let mapped = abc().map(move |value, _| {
        counter.set(counter.get() + 1);
        value * 10
    });

    mapped.cache_result();
    mapped.cache_result();
    assert_eq!(mapped.to_vec(), vec![10, 20, 30]);
    assert_eq!(mapped.reverse().to_vec(), vec![30, 20, 10]);
    assert_eq!(mapped.find_last_key(|value, _| *value == 10), Some("a"));
    assert_eq!(calls.get(), 3);
}

#[rstest]
fn test_uncached_pipeline_recomputes_per_traversal() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let mapped = abc().map(move |value, _| {
        counter.set(counter.get() + 1);
        *value
    });

    mapped.to_vec();
    mapped.to_vec();
    assert_eq!(calls.get(), 6);
}

#[rstest]
fn test_take_while_stops_source_after_deciding_entry() {
    let seq = Seq::from_entries((0..100).map(|number| (number, number))).map(|value, _| {
        assert!(*value <= 3, "visited {value} past the cutoff");
        *value
    });
    assert_eq!(seq.take_while(|value, _| *value < 3).to_vec(), vec![0, 1, 2]);
    assert_eq!(seq.find_key(|value, _| *value == 3), Some(3));
    assert!(seq.some(|value, _| *value == 2));
}
