//! Queries and reductions shared by every sequence-like type.
//!
//! Anything that can hand out a [`Seq`] view implements [`Sequence`] and
//! gets lookups, folds, conversions and equality for free. Lookups return
//! [`Option`], so a stored `None` or empty value is never mistaken for
//! absence, and every lookup stops the traversal at the deciding entry.

use std::fmt;

use super::indexed::{IndexedSeq, join_sparse};
use super::protocol::{Direction, IndexOrder, Seq, Step, Visitor};

/// The query surface of a lazy sequence.
///
/// Implementors only provide [`Sequence::as_seq`]; every other method has a
/// default built on the iteration protocol. "Last" variants walk backward
/// and report the indices an indexed sequence would report walking forward.
///
/// # Examples
///
/// ```rust
/// use lazyseq::prelude::*;
///
/// let seq = IndexedSeq::from_values([3, 1, 4, 1, 5]);
///
/// assert_eq!(seq.find(|value, _| *value > 3), Some(4));
/// assert_eq!(seq.find_last_key(|value, _| *value == 1), Some(3));
/// assert!(seq.some(|value, _| *value == 5));
/// assert!(!seq.every(|value, _| *value > 1));
/// assert_eq!(seq.reduce(0, |sum, value, _| sum + value), 14);
/// assert_eq!(seq.join("-"), "3-1-4-1-5");
/// ```
pub trait Sequence<K, V>
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    /// A keyed view over the same entries.
    fn as_seq(&self) -> Seq<K, V>;

    /// The number of entries, if known without traversing.
    fn length(&self) -> Option<usize> {
        self.as_seq().length()
    }

    /// Runs the iteration protocol. See [`Seq::iterate`].
    fn iterate(
        &self,
        visit: &mut Visitor<'_, K, V>,
        direction: Direction,
        order: IndexOrder,
    ) -> usize {
        self.as_seq().iterate(visit, direction, order)
    }

    /// Calls `visit` on every entry in order. A visitor returning `false`
    /// (or [`Step::Stop`]) ends the traversal.
    ///
    /// Returns the number of entries visited, or the length when the
    /// traversal completed.
    fn for_each<F, R>(&self, mut visit: F) -> usize
    where
        F: FnMut(V, K) -> R,
        R: Into<Step>,
    {
        self.iterate(
            &mut |value, key| visit(value, key).into(),
            Direction::Forward,
            IndexOrder::Natural,
        )
    }

    /// The first entry satisfying `predicate`.
    fn find_entry<P>(&self, mut predicate: P) -> Option<(K, V)>
    where
        P: FnMut(&V, &K) -> bool,
    {
        let mut found = None;
        self.iterate(
            &mut |value, key| {
                if predicate(&value, &key) {
                    found = Some((key, value));
                    Step::Stop
                } else {
                    Step::Continue
                }
            },
            Direction::Forward,
            IndexOrder::Natural,
        );
        found
    }

    /// The last entry satisfying `predicate`.
    fn find_last_entry<P>(&self, mut predicate: P) -> Option<(K, V)>
    where
        P: FnMut(&V, &K) -> bool,
    {
        let mut found = None;
        self.iterate(
            &mut |value, key| {
                if predicate(&value, &key) {
                    found = Some((key, value));
                    Step::Stop
                } else {
                    Step::Continue
                }
            },
            Direction::Backward,
            IndexOrder::Flipped,
        );
        found
    }

    /// The first value satisfying `predicate`.
    fn find<P>(&self, predicate: P) -> Option<V>
    where
        P: FnMut(&V, &K) -> bool,
    {
        self.find_entry(predicate).map(|(_, value)| value)
    }

    /// The key of the first value satisfying `predicate`.
    fn find_key<P>(&self, predicate: P) -> Option<K>
    where
        P: FnMut(&V, &K) -> bool,
    {
        self.find_entry(predicate).map(|(key, _)| key)
    }

    /// The last value satisfying `predicate`.
    fn find_last<P>(&self, predicate: P) -> Option<V>
    where
        P: FnMut(&V, &K) -> bool,
    {
        self.find_last_entry(predicate).map(|(_, value)| value)
    }

    /// The key of the last value satisfying `predicate`.
    fn find_last_key<P>(&self, predicate: P) -> Option<K>
    where
        P: FnMut(&V, &K) -> bool,
    {
        self.find_last_entry(predicate).map(|(key, _)| key)
    }

    /// The value stored under `key`.
    fn get(&self, key: &K) -> Option<V>
    where
        K: PartialEq,
    {
        self.find(|_, candidate| candidate == key)
    }

    /// Returns `true` if an entry is stored under `key`.
    fn has(&self, key: &K) -> bool
    where
        K: PartialEq,
    {
        self.find_key(|_, candidate| candidate == key).is_some()
    }

    /// Returns `true` if some entry holds `value`.
    fn contains(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.find_key(|candidate, _| candidate == value).is_some()
    }

    /// The first value.
    fn first(&self) -> Option<V> {
        self.find(|_, _| true)
    }

    /// The last value.
    fn last(&self) -> Option<V> {
        self.find_last(|_, _| true)
    }

    /// Returns `true` if every entry satisfies `predicate`. Stops at the
    /// first failure.
    fn every<P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&V, &K) -> bool,
    {
        self.find_key(|value, key| !predicate(value, key)).is_none()
    }

    /// Returns `true` if some entry satisfies `predicate`. Stops at the
    /// first match.
    fn some<P>(&self, predicate: P) -> bool
    where
        P: FnMut(&V, &K) -> bool,
    {
        self.find_key(predicate).is_some()
    }

    /// Folds the entries first to last.
    fn reduce<A, F>(&self, initial: A, mut reducer: F) -> A
    where
        F: FnMut(A, V, K) -> A,
    {
        collect_entries(self, Direction::Forward, IndexOrder::Natural)
            .into_iter()
            .fold(initial, |accumulator, (key, value)| {
                reducer(accumulator, value, key)
            })
    }

    /// Folds the entries last to first.
    fn reduce_right<A, F>(&self, initial: A, mut reducer: F) -> A
    where
        F: FnMut(A, V, K) -> A,
    {
        collect_entries(self, Direction::Backward, IndexOrder::Flipped)
            .into_iter()
            .fold(initial, |accumulator, (key, value)| {
                reducer(accumulator, value, key)
            })
    }

    /// The display of every value joined by `separator`.
    fn join(&self, separator: &str) -> String
    where
        V: fmt::Display,
    {
        let mut joined = String::new();
        let mut first = true;
        self.for_each(|value, _| {
            if !first {
                joined.push_str(separator);
            }
            first = false;
            joined.push_str(&value.to_string());
        });
        joined
    }

    /// The number of entries, counted by a full traversal.
    fn count(&self) -> usize {
        let mut counted = 0;
        self.for_each(|_, _| counted += 1);
        counted
    }

    /// Returns `true` when there is no entry.
    fn is_empty(&self) -> bool {
        match self.length() {
            Some(0) => true,
            _ => self.find_key(|_, _| true).is_none(),
        }
    }

    /// The values, in order.
    fn to_vec(&self) -> Vec<V> {
        let mut values = Vec::with_capacity(self.length().unwrap_or(0));
        self.for_each(|value, _| values.push(value));
        values
    }

    /// Collects the `(key, value)` pairs into any collection.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::prelude::*;
    /// use std::collections::BTreeMap;
    ///
    /// let seq = Seq::from_entries([("a", 1), ("b", 2), ("c", 3)]);
    /// let object: BTreeMap<_, _> = seq.filter(|value, _| *value > 1).to_object();
    ///
    /// assert_eq!(object, BTreeMap::from([("b", 2), ("c", 3)]));
    /// ```
    fn to_object<M>(&self) -> M
    where
        M: FromIterator<(K, V)>,
    {
        collect_entries(self, Direction::Forward, IndexOrder::Natural)
            .into_iter()
            .collect()
    }

    /// Builds any collection that knows how to read a sequence.
    fn to_collection<C>(&self) -> C
    where
        C: FromSequence<K, V>,
    {
        C::from_sequence(self)
    }

    /// Entry-wise equality, keys included.
    ///
    /// Two handles on the same node are equal without a traversal, and
    /// sequences whose known lengths differ are unequal without one.
    /// Otherwise this side is materialised and compared against a forward
    /// traversal of `other` that stops at the first mismatch.
    fn equals<S>(&self, other: &S) -> bool
    where
        S: Sequence<K, V> + ?Sized,
        K: PartialEq,
        V: PartialEq,
    {
        let this = self.as_seq();
        let that = other.as_seq();
        if this.ptr_eq(&that) {
            return true;
        }
        if let (Some(left), Some(right)) = (this.length(), that.length()) {
            if left != right {
                return false;
            }
            if left == 0 {
                return true;
            }
        }
        let entries = this.cached_entries();
        let mut position = 0;
        let mut equal = true;
        that.iterate(
            &mut |value, key| match entries.get(position) {
                Some((expected_key, expected_value))
                    if *expected_key == key && *expected_value == value =>
                {
                    position += 1;
                    Step::Continue
                }
                _ => {
                    equal = false;
                    Step::Stop
                }
            },
            Direction::Forward,
            IndexOrder::Natural,
        );
        equal && position == entries.len()
    }
}

/// Builds a concrete collection from any sequence.
///
/// This is the seam through which the engine produces collections it knows
/// nothing about: `to_collection::<C>()` defers to `C::from_sequence`.
pub trait FromSequence<K, V>: Sized
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    /// Reads every entry of `sequence`.
    fn from_sequence<S>(sequence: &S) -> Self
    where
        S: Sequence<K, V> + ?Sized;
}

fn collect_entries<K, V, S>(sequence: &S, direction: Direction, order: IndexOrder) -> Vec<(K, V)>
where
    K: Clone + 'static,
    V: Clone + 'static,
    S: Sequence<K, V> + ?Sized,
{
    let mut entries = Vec::with_capacity(sequence.length().unwrap_or(0));
    sequence.iterate(
        &mut |value, key| {
            entries.push((key, value));
            Step::Continue
        },
        direction,
        order,
    );
    entries
}

impl<K, V> Sequence<K, V> for Seq<K, V>
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    fn as_seq(&self) -> Self {
        self.clone()
    }

    fn length(&self) -> Option<usize> {
        Self::length(self)
    }

    fn iterate(
        &self,
        visit: &mut Visitor<'_, K, V>,
        direction: Direction,
        order: IndexOrder,
    ) -> usize {
        Self::iterate(self, visit, direction, order)
    }
}

impl<V> Sequence<usize, V> for IndexedSeq<V>
where
    V: Clone + 'static,
{
    fn as_seq(&self) -> Seq<usize, V> {
        self.as_keyed().clone()
    }

    fn length(&self) -> Option<usize> {
        Self::length(self)
    }

    fn iterate(
        &self,
        visit: &mut Visitor<'_, usize, V>,
        direction: Direction,
        order: IndexOrder,
    ) -> usize {
        Self::iterate(self, visit, direction, order)
    }

    /// Repeats `separator` across the gaps of a sparse sequence, so values
    /// land at their index positions.
    fn join(&self, separator: &str) -> String
    where
        V: fmt::Display,
    {
        join_sparse(self, separator)
    }
}

impl<K, V> FromSequence<K, V> for Seq<K, V>
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    fn from_sequence<S>(sequence: &S) -> Self
    where
        S: Sequence<K, V> + ?Sized,
    {
        sequence.as_seq()
    }
}

impl<K, V> FromSequence<K, V> for IndexedSeq<V>
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    fn from_sequence<S>(sequence: &S) -> Self
    where
        S: Sequence<K, V> + ?Sized,
    {
        sequence.as_seq().values()
    }
}

impl<K, V> FromSequence<K, V> for Vec<V>
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    fn from_sequence<S>(sequence: &S) -> Self
    where
        S: Sequence<K, V> + ?Sized,
    {
        sequence.to_vec()
    }
}
