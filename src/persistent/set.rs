//! Persistent (immutable) hash set.
//!
//! This module provides [`PersistentSet`], an immutable set stored as a
//! `PersistentHashMap<T, ()>`, and [`TransientSet`], its mutable builder.
//!
//! Bulk operations ([`PersistentSet::union`], [`PersistentSet::intersect`],
//! [`PersistentSet::difference`]) accept any number of operand sequences
//! and apply every edit inside one transient scope. Edits that change
//! nothing hand back a set sharing the original root.
//!
//! # Examples
//!
//! ```rust
//! use lazyseq::prelude::*;
//!
//! let set = PersistentSet::from_values([1, 2, 3]);
//!
//! let grown = set.union(&[IndexedSeq::from_values([3, 4]), IndexedSeq::from_values([5])]);
//! assert_eq!(grown.len(), 5);
//! assert_eq!(set.len(), 3);
//!
//! let common = grown.intersect(&[IndexedSeq::from_values([2, 4, 6])]);
//! assert_eq!(common, PersistentSet::from_values([2, 4]));
//!
//! let rest = grown.difference(&[common.as_seq()]);
//! assert_eq!(rest, PersistentSet::from_values([1, 3, 5]));
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use super::{PersistentHashMap, PersistentHashMapIterator, TransientHashMap};
use crate::diagnostics;
use crate::sequence::{
    Direction, FromSequence, IndexOrder, IndexedSeq, Produce, Seq, Sequence, Step, Visitor,
    write_entries,
};

// =============================================================================
// PersistentSet Definition
// =============================================================================

/// A persistent (immutable) hash set.
///
/// Each member acts as both key and value when the set is read as a
/// [`Sequence`], so the whole query API applies.
///
/// # Time Complexity
///
/// | Operation    | Complexity        |
/// |--------------|-------------------|
/// | `has`        | O(log32 N)        |
/// | `add`        | O(log32 N)        |
/// | `delete`     | O(log32 N)        |
/// | `len`        | O(1)              |
/// | `transient`  | O(1)              |
/// | `union`      | O(M log32 N)      |
#[derive(Clone)]
pub struct PersistentSet<T> {
    map: PersistentHashMap<T, ()>,
}

impl<T> PersistentSet<T> {
    /// Creates a new empty set.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: PersistentHashMap::new(),
        }
    }

    /// Alias of [`PersistentSet::new`].
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::new()
    }

    /// Returns the number of members.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the set has no members.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns `true` when both sets share the same root node. All empty
    /// sets count as one shared empty set.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.map.ptr_eq(&other.map)
    }

    /// Returns an iterator over the members.
    #[must_use]
    pub fn iter(&self) -> PersistentSetIterator<'_, T> {
        PersistentSetIterator {
            entries: self.map.iter(),
        }
    }

    /// Converts into a transient set in O(1).
    #[inline]
    #[must_use]
    pub fn transient(self) -> TransientSet<T> {
        TransientSet {
            map: self.map.transient(),
        }
    }
}

impl<T: Clone + Hash + Eq> PersistentSet<T> {
    /// Creates a set from the given values; duplicates collapse.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::persistent::PersistentSet;
    ///
    /// let set = PersistentSet::from_values(["a", "b", "a"]);
    /// assert_eq!(set.len(), 2);
    /// ```
    #[must_use]
    pub fn from_values<I: IntoIterator<Item = T>>(values: I) -> Self {
        values.into_iter().collect()
    }

    /// Returns `true` if `value` is a member.
    pub fn has<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(value)
    }

    /// Returns the stored member equal to `value`.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get_key_value(value).map(|(member, ())| member)
    }

    /// Returns a set with `value` added. Adding a member already present
    /// returns a set sharing this one's root.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::persistent::PersistentSet;
    ///
    /// let set = PersistentSet::from_values([1, 2]);
    /// assert!(set.add(2).ptr_eq(&set));
    /// assert_eq!(set.add(3).len(), 3);
    /// ```
    #[must_use]
    pub fn add(&self, value: T) -> Self {
        if self.has(&value) {
            return self.clone();
        }
        Self {
            map: self.map.insert(value, ()),
        }
    }

    /// Returns a set without `value`. Deleting a non-member returns a set
    /// sharing this one's root.
    #[must_use]
    pub fn delete<Q>(&self, value: &Q) -> Self
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        Self {
            map: self.map.remove(value),
        }
    }

    /// Returns the empty set.
    #[must_use]
    pub fn clear(&self) -> Self {
        if self.is_empty() {
            return self.clone();
        }
        Self::new()
    }

    /// Runs `mutate` against a transient copy and returns the result.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::persistent::PersistentSet;
    ///
    /// let set = PersistentSet::from_values([1, 2, 3]);
    /// let edited = set.with_mutations(|transient| {
    ///     transient.add(4);
    ///     transient.delete(&1);
    /// });
    /// assert_eq!(edited, PersistentSet::from_values([2, 3, 4]));
    /// assert_eq!(set.len(), 3);
    /// ```
    #[must_use]
    pub fn with_mutations<F>(&self, mutate: F) -> Self
    where
        F: FnOnce(&mut TransientSet<T>),
    {
        let mut transient = self.clone().transient();
        mutate(&mut transient);
        transient.persistent()
    }

    fn contains_all(&self, other: &Self) -> bool {
        other.len() <= self.len() && other.iter().all(|member| self.has(member))
    }
}

impl<T: Clone + Hash + Eq + 'static> PersistentSet<T> {
    /// Returns `true` if every member of this set is among the values of
    /// `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::prelude::*;
    ///
    /// let set = PersistentSet::from_values([1, 2]);
    /// assert!(set.is_subset(&IndexedSeq::from_values([3, 2, 1])));
    /// assert!(!set.is_subset(&Seq::from_entries([("a", 1)])));
    /// ```
    #[must_use]
    pub fn is_subset<K, S>(&self, other: &S) -> bool
    where
        K: Clone + 'static,
        S: Sequence<K, T> + ?Sized,
    {
        let values: Self = other.to_collection();
        values.contains_all(self)
    }

    /// Returns `true` if every value of `other` is a member of this set.
    /// Stops at the first value that is not.
    #[must_use]
    pub fn is_superset<K, S>(&self, other: &S) -> bool
    where
        K: Clone + 'static,
        S: Sequence<K, T> + ?Sized,
    {
        other.every(|value, _| self.has(value))
    }

    /// Adds every value of every operand.
    ///
    /// With no operands, returns this set unchanged.
    #[must_use]
    pub fn union<K, S>(&self, others: &[S]) -> Self
    where
        K: Clone + 'static,
        S: Sequence<K, T>,
    {
        if others.is_empty() {
            return self.clone();
        }
        self.with_mutations(|transient| {
            for other in others {
                other.for_each(|value, _| {
                    transient.add(value);
                });
            }
        })
    }

    /// Keeps the members found among the values of every operand.
    ///
    /// With no operands, returns this set unchanged.
    #[must_use]
    pub fn intersect<K, S>(&self, others: &[S]) -> Self
    where
        K: Clone + 'static,
        S: Sequence<K, T>,
    {
        if others.is_empty() {
            return self.clone();
        }
        let operands: Vec<Self> = others.iter().map(|other| other.to_collection()).collect();
        self.with_mutations(|transient| {
            for member in self.iter() {
                if !operands.iter().all(|operand| operand.has(member)) {
                    transient.delete(member);
                }
            }
        })
    }

    /// Removes every member found among the values of any operand.
    ///
    /// With no operands, returns this set unchanged.
    #[must_use]
    pub fn difference<K, S>(&self, others: &[S]) -> Self
    where
        K: Clone + 'static,
        S: Sequence<K, T>,
    {
        if others.is_empty() {
            return self.clone();
        }
        self.with_mutations(|transient| {
            for other in others {
                other.for_each(|value, _| {
                    transient.delete(&value);
                });
            }
        })
    }
}

// =============================================================================
// TransientSet Definition
// =============================================================================

/// The mutable builder behind [`PersistentSet::with_mutations`].
///
/// Not `Clone`, `Send` or `Sync`.
pub struct TransientSet<T> {
    map: TransientHashMap<T, ()>,
}

impl<T> TransientSet<T> {
    /// Creates an empty transient set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: TransientHashMap::new(),
        }
    }

    /// Returns the number of members.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the set has no members.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Removes every member.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Seals the transient into a persistent set in O(1).
    #[must_use]
    pub fn persistent(self) -> PersistentSet<T> {
        diagnostics::sealed("set", self.map.len());
        PersistentSet {
            map: self.map.into_persistent(),
        }
    }
}

impl<T: Clone + Hash + Eq> TransientSet<T> {
    /// Adds `value`; returns `true` if it was not already a member.
    pub fn add(&mut self, value: T) -> bool {
        if self.map.contains_key(&value) {
            return false;
        }
        self.map.insert(value, ());
        true
    }

    /// Removes `value`; returns `true` if it was a member.
    pub fn delete<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.remove(value).is_some()
    }

    /// Returns `true` if `value` is a member.
    pub fn has<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(value)
    }
}

impl<T> Default for TransientSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

static_assertions::assert_not_impl_any!(TransientSet<i32>: Send, Sync, Clone);

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over the members of a [`PersistentSet`].
pub struct PersistentSetIterator<'a, T> {
    entries: PersistentHashMapIterator<'a, T, ()>,
}

impl<'a, T> Iterator for PersistentSetIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(|(member, ())| member)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<T> DoubleEndedIterator for PersistentSetIterator<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back().map(|(member, ())| member)
    }
}

impl<T> ExactSizeIterator for PersistentSetIterator<'_, T> {}

// =============================================================================
// Sequence Integration
// =============================================================================

/// Produces each member as both key and value.
struct SetLeaf<T> {
    set: PersistentSet<T>,
}

impl<T: Clone> Produce<T, T> for SetLeaf<T> {
    fn produce(
        &self,
        _this: &Seq<T, T>,
        visit: &mut Visitor<'_, T, T>,
        direction: Direction,
        _order: IndexOrder,
    ) -> usize {
        let mut visited = 0;
        let mut emit = |member: &T| {
            let step = visit(member.clone(), member.clone());
            if !step.is_stop() {
                visited += 1;
            }
            step
        };
        let stopped = match direction {
            Direction::Forward => self.set.iter().any(|member| emit(member).is_stop()),
            Direction::Backward => self.set.iter().rev().any(|member| emit(member).is_stop()),
        };
        if stopped { visited } else { self.set.len() }
    }
}

impl<T: Clone + Hash + Eq + 'static> Sequence<T, T> for PersistentSet<T> {
    fn as_seq(&self) -> Seq<T, T> {
        Seq::from_producer(SetLeaf { set: self.clone() }, Some(self.len()))
    }

    fn length(&self) -> Option<usize> {
        Some(self.len())
    }

    fn get(&self, key: &T) -> Option<T>
    where
        T: PartialEq,
    {
        self.map.get_key_value(key).map(|(member, ())| member.clone())
    }

    fn has(&self, key: &T) -> bool
    where
        T: PartialEq,
    {
        self.map.contains_key(key)
    }

    fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.map.contains_key(value)
    }

    /// Membership equality: `other` must hold exactly the members of this
    /// set, each as both key and value, in any order.
    fn equals<S>(&self, other: &S) -> bool
    where
        S: Sequence<T, T> + ?Sized,
        T: PartialEq,
    {
        if other.length().is_some_and(|length| length != self.len()) {
            return false;
        }
        let mut seen = TransientSet::new();
        let members = other.every(|value, key| {
            let member = value == key && self.has(value);
            if member {
                seen.add(value.clone());
            }
            member
        });
        members && seen.len() == self.len()
    }
}

impl<K, T> FromSequence<K, T> for PersistentSet<T>
where
    K: Clone + 'static,
    T: Clone + Hash + Eq + 'static,
{
    fn from_sequence<S>(sequence: &S) -> Self
    where
        S: Sequence<K, T> + ?Sized,
    {
        let mut transient = TransientSet::new();
        sequence.iterate(
            &mut |value, _| {
                transient.add(value);
                Step::Continue
            },
            Direction::Forward,
            IndexOrder::Natural,
        );
        transient.persistent()
    }
}

impl<K, V> Seq<K, V>
where
    K: Clone + 'static,
    V: Clone + Hash + Eq + 'static,
{
    /// Collects the values into a [`PersistentSet`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::prelude::*;
    ///
    /// let set = Seq::from_entries([("a", 1), ("b", 1), ("c", 2)]).to_set();
    /// assert_eq!(set, PersistentSet::from_values([1, 2]));
    /// ```
    pub fn to_set(&self) -> PersistentSet<V> {
        self.to_collection()
    }
}

impl<V: Clone + Hash + Eq + 'static> IndexedSeq<V> {
    /// Collects the values into a [`PersistentSet`].
    pub fn to_set(&self) -> PersistentSet<V> {
        self.to_collection()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for PersistentSet<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Hash + Eq> FromIterator<T> for PersistentSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut transient = TransientSet::new();
        for value in iter {
            transient.add(value);
        }
        PersistentSet {
            map: transient.map.into_persistent(),
        }
    }
}

impl<'a, T> IntoIterator for &'a PersistentSet<T> {
    type Item = &'a T;
    type IntoIter = PersistentSetIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone + Hash + Eq> PartialEq for PersistentSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (self.len() == other.len() && self.contains_all(other))
    }
}

impl<T: Clone + Hash + Eq> Eq for PersistentSet<T> {}

impl<T> fmt::Display for PersistentSet<T>
where
    T: fmt::Debug + Clone + Hash + Eq + 'static,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_entries(formatter, self, "Set", ('{', '}'), |formatter, _, member| {
            write!(formatter, "{member:?}")
        })
    }
}

impl<T> fmt::Debug for PersistentSet<T>
where
    T: fmt::Debug + Clone + Hash + Eq + 'static,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, formatter)
    }
}

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for PersistentSet<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<T: serde::Serialize> PersistentSet<T> {
    /// Converts the set into a JSON array.
    ///
    /// # Errors
    ///
    /// Fails when a member cannot be represented as JSON.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_add_and_delete_are_persistent() {
        let set = PersistentSet::new().add(1).add(2);
        let removed = set.delete(&1);

        assert!(set.has(&1));
        assert!(!removed.has(&1));
        assert!(removed.has(&2));
    }

    #[rstest]
    fn test_no_op_edits_share_root() {
        let set = PersistentSet::from_values([1, 2, 3]);
        assert!(set.add(1).ptr_eq(&set));
        assert!(set.delete(&9).ptr_eq(&set));
        assert!(set.with_mutations(|_| {}).ptr_eq(&set));
    }

    #[rstest]
    fn test_bulk_operations_without_operands_return_self() {
        let set = PersistentSet::from_values(['a', 'b']);
        let none: [IndexedSeq<char>; 0] = [];
        assert!(set.union(&none).ptr_eq(&set));
        assert!(set.intersect(&none).ptr_eq(&set));
        assert!(set.difference(&none).ptr_eq(&set));
    }

    #[rstest]
    fn test_intersect_requires_every_operand() {
        let set = PersistentSet::from_values([1, 2, 3, 4]);
        let result = set.intersect(&[
            IndexedSeq::from_values([1, 2, 3]),
            IndexedSeq::from_values([2, 3, 9]),
        ]);
        assert_eq!(result, PersistentSet::from_values([2, 3]));
    }

    #[rstest]
    fn test_difference_reads_values_of_keyed_operands() {
        let set = PersistentSet::from_values([1, 2, 3]);
        let keyed = Seq::from_entries([("x", 3), ("y", 1)]);
        assert_eq!(set.difference(&[keyed]), PersistentSet::from_values([2]));
    }

    #[rstest]
    fn test_get_returns_stored_member() {
        let set = PersistentSet::from_values(["left".to_string()]);
        assert_eq!(set.get("left"), Some(&"left".to_string()));
        assert_eq!(set.get("right"), None);
    }

    #[rstest]
    fn test_transient_reports_changes() {
        let mut transient = PersistentSet::from_values([1]).transient();
        assert!(!transient.add(1));
        assert!(transient.add(2));
        assert!(transient.delete(&1));
        assert!(!transient.delete(&1));
        assert_eq!(transient.len(), 1);
        transient.clear();
        assert!(transient.persistent().is_empty());
    }

    #[rstest]
    fn test_subset_and_superset() {
        let small = PersistentSet::from_values([1, 2]);
        let large = PersistentSet::from_values([1, 2, 3]);
        assert!(small.is_subset(&large));
        assert!(large.is_superset(&small));
        assert!(!large.is_subset(&small));
    }

    #[rstest]
    fn test_sequence_members_are_keys_and_values() {
        let set = PersistentSet::from_values([7]);
        assert_eq!(set.find_key(|value, _| *value == 7), Some(7));
        assert!(Sequence::contains(&set, &7));
        assert_eq!(set.to_vec(), vec![7]);
    }

    #[rstest]
    fn test_renders_members() {
        assert_eq!(PersistentSet::from_values(["a"]).to_string(), r#"Set { "a" }"#);
        assert_eq!(PersistentSet::<i32>::new().to_string(), "Set {}");
    }
}
