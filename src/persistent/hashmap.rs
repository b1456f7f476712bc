//! Persistent (immutable) hash map based on HAMT.
//!
//! This module provides [`PersistentHashMap`], an immutable hash map that
//! uses structural sharing, and [`TransientHashMap`], its exclusively-owned
//! mutable counterpart for batching edits.
//!
//! # Overview
//!
//! `PersistentHashMap` is a Hash Array Mapped Trie: a 32-way branching trie
//! navigated by successive 5-bit chunks of the key's hash.
//!
//! - O(log32 N) get, insert and remove
//! - O(1) len, `is_empty` and conversion to and from a transient
//!
//! Edits go through [`Rc::make_mut`]: a node shared with another version is
//! copied on the way down, a node owned by the edited version alone is
//! changed in place. A persistent edit therefore copies exactly one path,
//! and a transient copies each path at most once however many edits it
//! absorbs.
//!
//! # Examples
//!
//! ```rust
//! use lazyseq::persistent::PersistentHashMap;
//!
//! let map = PersistentHashMap::new()
//!     .insert("one".to_string(), 1)
//!     .insert("two".to_string(), 2);
//!
//! let updated = map.insert("one".to_string(), 100);
//! assert_eq!(map.get("one"), Some(&1));
//! assert_eq!(updated.get("one"), Some(&100));
//!
//! let mut transient = updated.transient();
//! transient.remove("two");
//! transient.insert("three".to_string(), 3);
//! let sealed = transient.persistent();
//! assert_eq!(sealed.len(), 2);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::mem;
use std::rc::Rc;

use crate::diagnostics;
use crate::sequence::{
    Direction, FromSequence, IndexOrder, Produce, Seq, Sequence, Step, Visitor,
};

// =============================================================================
// Constants
// =============================================================================

/// Bits of the hash consumed per trie level.
const BITS_PER_LEVEL: usize = 5;

/// Bit mask for extracting a slot index within a node.
const MASK: u64 = (1 << BITS_PER_LEVEL) - 1;

// =============================================================================
// Hash computation
// =============================================================================

/// Computes the hash of a key with the hasher selected by crate features.
#[cfg(feature = "fxhash")]
fn compute_hash<Q: Hash + ?Sized>(key: &Q) -> u64 {
    let mut hasher = rustc_hash::FxHasher::default();
    key.hash(&mut hasher);
    hasher.finish()
}

/// Computes the hash of a key with the hasher selected by crate features.
#[cfg(all(feature = "ahash", not(feature = "fxhash")))]
fn compute_hash<Q: Hash + ?Sized>(key: &Q) -> u64 {
    let mut hasher = ahash::AHasher::default();
    key.hash(&mut hasher);
    hasher.finish()
}

/// Computes the hash of a key with the hasher selected by crate features.
#[cfg(not(any(feature = "fxhash", feature = "ahash")))]
fn compute_hash<Q: Hash + ?Sized>(key: &Q) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

/// Extracts the slot index at a given depth from a hash.
#[inline]
const fn hash_index(hash: u64, depth: usize) -> u32 {
    ((hash >> (depth * BITS_PER_LEVEL)) & MASK) as u32
}

/// Position of `bit` among the occupied slots of `bitmap`.
#[inline]
const fn slot_position(bitmap: u32, bit: u32) -> usize {
    (bitmap & (bit - 1)).count_ones() as usize
}

// =============================================================================
// Node Definition
// =============================================================================

/// Internal node structure for the HAMT.
#[derive(Clone)]
enum Node<K, V> {
    /// Bitmap-indexed branch; `children` holds one child per set bit.
    Branch {
        bitmap: u32,
        children: Vec<Child<K, V>>,
    },
    /// Keys whose full hashes are equal.
    Collision { hash: u64, entries: Vec<(K, V)> },
}

/// A child in a branch node.
#[derive(Clone)]
enum Child<K, V> {
    Entry { hash: u64, key: K, value: V },
    Node(Rc<Node<K, V>>),
}

/// What a subtree shrank to after a removal.
enum Remainder<K, V> {
    Empty,
    Single(Child<K, V>),
    Subtree,
}

impl<K, V> Node<K, V> {
    const fn empty() -> Self {
        Self::Branch {
            bitmap: 0,
            children: Vec::new(),
        }
    }

    fn collect_entries<'a>(&'a self, entries: &mut Vec<(&'a K, &'a V)>) {
        match self {
            Self::Branch { children, .. } => {
                for child in children {
                    match child {
                        Child::Entry { key, value, .. } => entries.push((key, value)),
                        Child::Node(subnode) => subnode.collect_entries(entries),
                    }
                }
            }
            Self::Collision {
                entries: collision_entries,
                ..
            } => {
                entries.extend(collision_entries.iter().map(|(key, value)| (key, value)));
            }
        }
    }
}

impl<K: Clone + Eq, V: Clone> Node<K, V> {
    fn get<Q>(&self, key: &Q, hash: u64, depth: usize) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        match self {
            Self::Branch { bitmap, children } => {
                let bit = 1u32 << hash_index(hash, depth);
                if bitmap & bit == 0 {
                    return None;
                }
                match &children[slot_position(*bitmap, bit)] {
                    Child::Entry {
                        hash: entry_hash,
                        key: entry_key,
                        value,
                    } => (*entry_hash == hash && entry_key.borrow() == key)
                        .then_some((entry_key, value)),
                    Child::Node(subnode) => subnode.get(key, hash, depth + 1),
                }
            }
            Self::Collision {
                hash: collision_hash,
                entries,
            } => {
                if *collision_hash != hash {
                    return None;
                }
                entries
                    .iter()
                    .find(|(entry_key, _)| entry_key.borrow() == key)
                    .map(|(entry_key, value)| (entry_key, value))
            }
        }
    }

    /// Builds the smallest subtree holding two entries with distinct keys.
    fn pair(first: (u64, K, V), second: (u64, K, V), depth: usize) -> Self {
        if first.0 == second.0 {
            return Self::Collision {
                hash: first.0,
                entries: vec![(first.1, first.2), (second.1, second.2)],
            };
        }
        let mut node = Self::empty();
        node.insert(first.1, first.2, first.0, depth);
        node.insert(second.1, second.2, second.0, depth);
        node
    }

    /// Inserts in place, returning the value previously stored under `key`.
    fn insert(&mut self, key: K, value: V, hash: u64, depth: usize) -> Option<V> {
        if let Self::Collision {
            hash: collision_hash,
            ..
        } = self
            && *collision_hash != hash
        {
            let collision_hash = *collision_hash;
            let collision = mem::replace(self, Self::empty());
            *self = Self::Branch {
                bitmap: 1 << hash_index(collision_hash, depth),
                children: vec![Child::Node(Rc::new(collision))],
            };
        }

        match self {
            Self::Branch { bitmap, children } => {
                let bit = 1u32 << hash_index(hash, depth);
                let position = slot_position(*bitmap, bit);
                if *bitmap & bit == 0 {
                    *bitmap |= bit;
                    children.insert(position, Child::Entry { hash, key, value });
                    return None;
                }
                match &mut children[position] {
                    Child::Node(subnode) => {
                        Rc::make_mut(subnode).insert(key, value, hash, depth + 1)
                    }
                    Child::Entry {
                        hash: entry_hash,
                        key: entry_key,
                        value: entry_value,
                    } if *entry_hash == hash && *entry_key == key => {
                        Some(mem::replace(entry_value, value))
                    }
                    slot => {
                        let displaced = mem::replace(slot, Child::Node(Rc::new(Self::empty())));
                        if let Child::Entry {
                            hash: entry_hash,
                            key: entry_key,
                            value: entry_value,
                        } = displaced
                        {
                            *slot = Child::Node(Rc::new(Self::pair(
                                (entry_hash, entry_key, entry_value),
                                (hash, key, value),
                                depth + 1,
                            )));
                        }
                        None
                    }
                }
            }
            Self::Collision { entries, .. } => {
                if let Some((_, existing)) =
                    entries.iter_mut().find(|(entry_key, _)| *entry_key == key)
                {
                    return Some(mem::replace(existing, value));
                }
                entries.push((key, value));
                None
            }
        }
    }

    /// Removes in place, returning the removed value.
    fn remove<Q>(&mut self, key: &Q, hash: u64, depth: usize) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        match self {
            Self::Branch { bitmap, children } => {
                let bit = 1u32 << hash_index(hash, depth);
                if *bitmap & bit == 0 {
                    return None;
                }
                let position = slot_position(*bitmap, bit);
                if let Child::Node(subnode) = &mut children[position] {
                    let subnode = Rc::make_mut(subnode);
                    let removed = subnode.remove(key, hash, depth + 1)?;
                    match subnode.remainder() {
                        Remainder::Empty => {
                            children.remove(position);
                            *bitmap &= !bit;
                        }
                        Remainder::Single(entry) => children[position] = entry,
                        Remainder::Subtree => {}
                    }
                    return Some(removed);
                }
                let matches = matches!(
                    &children[position],
                    Child::Entry { hash: entry_hash, key: entry_key, .. }
                        if *entry_hash == hash && entry_key.borrow() == key
                );
                if !matches {
                    return None;
                }
                *bitmap &= !bit;
                match children.remove(position) {
                    Child::Entry { value, .. } => Some(value),
                    Child::Node(_) => None,
                }
            }
            Self::Collision {
                hash: collision_hash,
                entries,
            } => {
                if *collision_hash != hash {
                    return None;
                }
                let position = entries
                    .iter()
                    .position(|(entry_key, _)| entry_key.borrow() == key)?;
                Some(entries.remove(position).1)
            }
        }
    }

    /// Whether this subtree can be folded into its parent slot.
    fn remainder(&self) -> Remainder<K, V> {
        match self {
            Self::Branch { children, .. } => match children.as_slice() {
                [] => Remainder::Empty,
                [entry @ Child::Entry { .. }] => Remainder::Single(entry.clone()),
                _ => Remainder::Subtree,
            },
            Self::Collision { hash, entries } => match entries.as_slice() {
                [] => Remainder::Empty,
                [(key, value)] => Remainder::Single(Child::Entry {
                    hash: *hash,
                    key: key.clone(),
                    value: value.clone(),
                }),
                _ => Remainder::Subtree,
            },
        }
    }
}

// =============================================================================
// PersistentHashMap Definition
// =============================================================================

/// A persistent (immutable) hash map based on HAMT.
///
/// # Time Complexity
///
/// | Operation      | Complexity        |
/// |----------------|-------------------|
/// | `new`          | O(1)              |
/// | `get`          | O(log32 N)        |
/// | `insert`       | O(log32 N)        |
/// | `remove`       | O(log32 N)        |
/// | `contains_key` | O(log32 N)        |
/// | `len`          | O(1)              |
/// | `transient`    | O(1)              |
///
/// # Examples
///
/// ```rust
/// use lazyseq::persistent::PersistentHashMap;
///
/// let map = PersistentHashMap::singleton("key".to_string(), 42);
/// assert_eq!(map.get("key"), Some(&42));
/// ```
#[derive(Clone)]
pub struct PersistentHashMap<K, V> {
    root: Rc<Node<K, V>>,
    length: usize,
}

impl<K, V> PersistentHashMap<K, V> {
    /// Creates a new empty map.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Rc::new(Node::empty()),
            length: 0,
        }
    }

    /// Returns the number of entries in the map.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns `true` when both maps share the same root node. All empty
    /// maps count as one shared empty map.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.root, &other.root) || (self.is_empty() && other.is_empty())
    }

    /// Returns an iterator over key-value pairs, in trie order.
    #[must_use]
    pub fn iter(&self) -> PersistentHashMapIterator<'_, K, V> {
        let mut entries = Vec::with_capacity(self.length);
        self.root.collect_entries(&mut entries);
        PersistentHashMapIterator {
            entries: entries.into_iter(),
        }
    }

    /// Returns an iterator over keys.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over values.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    /// Converts into a transient map in O(1). Nodes still shared with other
    /// versions are copied on their first edit.
    #[inline]
    #[must_use]
    pub fn transient(self) -> TransientHashMap<K, V> {
        TransientHashMap {
            root: self.root,
            length: self.length,
            _not_send: PhantomData,
        }
    }
}

impl<K: Clone + Hash + Eq, V: Clone> PersistentHashMap<K, V> {
    /// Creates a map holding one entry.
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self {
        Self::new().insert(key, value)
    }

    /// Returns a reference to the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("key".to_string(), 42);
    /// assert_eq!(map.get("key"), Some(&42));
    /// assert_eq!(map.get("other"), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// Returns the stored key and value for `key`.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.root.get(key, compute_hash(key), 0)
    }

    /// Returns `true` if the map contains `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).is_some()
    }

    /// Returns a new map with `key` bound to `value`.
    ///
    /// Only the path from the root to the edited slot is copied; every
    /// other node is shared with `self`.
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        let mut transient = self.clone().transient();
        transient.insert(key, value);
        transient.into_persistent()
    }

    /// Returns a new map without `key`. Removing an absent key returns a
    /// map sharing the root of `self`.
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if !self.contains_key(key) {
            return self.clone();
        }
        let mut transient = self.clone().transient();
        transient.remove(key);
        transient.into_persistent()
    }
}

// =============================================================================
// TransientHashMap Definition
// =============================================================================

/// An exclusively-owned, mutable view of a [`PersistentHashMap`].
///
/// Edits mutate nodes this transient owns alone and copy nodes it still
/// shares, so a batch of edits costs at most one copy per touched node.
/// Transients are neither `Send` nor `Sync` and cannot be cloned.
///
/// # Examples
///
/// ```rust
/// use lazyseq::persistent::PersistentHashMap;
///
/// let mut transient = PersistentHashMap::new().transient();
/// for number in 0..100 {
///     transient.insert(number, number * number);
/// }
/// let map = transient.persistent();
/// assert_eq!(map.len(), 100);
/// assert_eq!(map.get(&9), Some(&81));
/// ```
pub struct TransientHashMap<K, V> {
    root: Rc<Node<K, V>>,
    length: usize,
    _not_send: PhantomData<*const ()>,
}

impl<K, V> TransientHashMap<K, V> {
    /// Creates an empty transient map.
    #[must_use]
    pub fn new() -> Self {
        PersistentHashMap::new().transient()
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.root = Rc::new(Node::empty());
        self.length = 0;
    }

    pub(super) fn into_persistent(self) -> PersistentHashMap<K, V> {
        PersistentHashMap {
            root: self.root,
            length: self.length,
        }
    }

    /// Seals the transient into a persistent map in O(1).
    #[must_use]
    pub fn persistent(self) -> PersistentHashMap<K, V> {
        diagnostics::sealed("hash map", self.length);
        self.into_persistent()
    }
}

impl<K: Clone + Hash + Eq, V: Clone> TransientHashMap<K, V> {
    /// Returns a reference to the value stored under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.root
            .get(key, compute_hash(key), 0)
            .map(|(_, value)| value)
    }

    /// Returns `true` if the map contains `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Binds `key` to `value`, returning the previous value.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = compute_hash(&key);
        let previous = Rc::make_mut(&mut self.root).insert(key, value, hash, 0);
        if previous.is_none() {
            self.length += 1;
        }
        previous
    }

    /// Removes `key`, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if !self.contains_key(key) {
            return None;
        }
        let removed = Rc::make_mut(&mut self.root).remove(key, compute_hash(key), 0);
        if removed.is_some() {
            self.length -= 1;
        }
        removed
    }
}

impl<K, V> Default for TransientHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

static_assertions::assert_not_impl_any!(TransientHashMap<i32, i32>: Send, Sync);

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over key-value pairs of a [`PersistentHashMap`].
pub struct PersistentHashMapIterator<'a, K, V> {
    entries: std::vec::IntoIter<(&'a K, &'a V)>,
}

impl<'a, K, V> Iterator for PersistentHashMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for PersistentHashMapIterator<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back()
    }
}

impl<K, V> ExactSizeIterator for PersistentHashMapIterator<'_, K, V> {}

// =============================================================================
// Sequence Integration
// =============================================================================

/// Produces the entries of a map, in trie order.
struct MapLeaf<K, V> {
    map: PersistentHashMap<K, V>,
}

impl<K: Clone, V: Clone> Produce<K, V> for MapLeaf<K, V> {
    fn produce(
        &self,
        _this: &Seq<K, V>,
        visit: &mut Visitor<'_, K, V>,
        direction: Direction,
        _order: IndexOrder,
    ) -> usize {
        let mut visited = 0;
        let mut emit = |(key, value): (&K, &V)| {
            let step = visit(value.clone(), key.clone());
            if !step.is_stop() {
                visited += 1;
            }
            step
        };
        let stopped = match direction {
            Direction::Forward => self.map.iter().any(|entry| emit(entry).is_stop()),
            Direction::Backward => self.map.iter().rev().any(|entry| emit(entry).is_stop()),
        };
        if stopped { visited } else { self.map.len() }
    }
}

impl<K, V> Sequence<K, V> for PersistentHashMap<K, V>
where
    K: Clone + Hash + Eq + 'static,
    V: Clone + 'static,
{
    fn as_seq(&self) -> Seq<K, V> {
        Seq::from_producer(MapLeaf { map: self.clone() }, Some(self.length))
    }

    fn length(&self) -> Option<usize> {
        Some(self.length)
    }

    fn get(&self, key: &K) -> Option<V>
    where
        K: PartialEq,
    {
        self.get_key_value(key).map(|(_, value)| value.clone())
    }

    fn has(&self, key: &K) -> bool
    where
        K: PartialEq,
    {
        self.contains_key(key)
    }

    /// Entry equality in any order: `other` must bind exactly the keys of
    /// this map, each to an equal value.
    fn equals<S>(&self, other: &S) -> bool
    where
        S: Sequence<K, V> + ?Sized,
        K: PartialEq,
        V: PartialEq,
    {
        if other.length().is_some_and(|length| length != self.length) {
            return false;
        }
        let mut seen = TransientHashMap::new();
        let bound = other.every(|value, key| {
            let matches = self
                .get_key_value(key)
                .is_some_and(|(_, stored)| stored == value);
            if matches {
                seen.insert(key.clone(), ());
            }
            matches
        });
        bound && seen.len() == self.length
    }
}

impl<K, V> FromSequence<K, V> for PersistentHashMap<K, V>
where
    K: Clone + Hash + Eq + 'static,
    V: Clone + 'static,
{
    fn from_sequence<S>(sequence: &S) -> Self
    where
        S: Sequence<K, V> + ?Sized,
    {
        let mut transient = TransientHashMap::new();
        sequence.iterate(
            &mut |value, key| {
                transient.insert(key, value);
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
    K: Clone + Hash + Eq + 'static,
    V: Clone + 'static,
{
    /// Collects the entries into a [`PersistentHashMap`]; later keys win.
    pub fn to_map(&self) -> PersistentHashMap<K, V> {
        self.to_collection()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for PersistentHashMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Hash + Eq, V: Clone> FromIterator<(K, V)> for PersistentHashMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut transient = TransientHashMap::new();
        for (key, value) in iter {
            transient.insert(key, value);
        }
        transient.into_persistent()
    }
}

impl<'a, K, V> IntoIterator for &'a PersistentHashMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = PersistentHashMapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Clone + Hash + Eq, V: Clone + PartialEq> PartialEq for PersistentHashMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        if self.length != other.length {
            return false;
        }
        self.ptr_eq(other)
            || self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: Clone + Hash + Eq, V: Clone + Eq> Eq for PersistentHashMap<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for PersistentHashMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(feature = "serde")]
impl<K, V> serde::Serialize for PersistentHashMap<K, V>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// A key whose hash is fixed, to force collisions.
    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Colliding(u32);

    impl Hash for Colliding {
        fn hash<H: Hasher>(&self, state: &mut H) {
            0u8.hash(state);
        }
    }

    #[rstest]
    fn test_new_creates_empty() {
        let map: PersistentHashMap<String, i32> = PersistentHashMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
    }

    #[rstest]
    fn test_insert_overwrite_keeps_original() {
        let map1 = PersistentHashMap::new().insert("key".to_string(), 1);
        let map2 = map1.insert("key".to_string(), 2);

        assert_eq!(map1.get("key"), Some(&1));
        assert_eq!(map2.get("key"), Some(&2));
        assert_eq!(map2.len(), 1);
    }

    #[rstest]
    fn test_many_inserts_and_removes() {
        let map: PersistentHashMap<i32, i32> = (0..2000).map(|number| (number, -number)).collect();
        assert_eq!(map.len(), 2000);
        assert!((0..2000).all(|number| map.get(&number) == Some(&-number)));

        let halved = (0..2000)
            .step_by(2)
            .fold(map.clone(), |map, number| map.remove(&number));
        assert_eq!(halved.len(), 1000);
        assert_eq!(halved.get(&4), None);
        assert_eq!(halved.get(&5), Some(&-5));
        assert_eq!(map.len(), 2000);
    }

    #[rstest]
    fn test_remove_absent_key_shares_root() {
        let map = PersistentHashMap::singleton(1, 1);
        assert!(map.remove(&2).ptr_eq(&map));
    }

    #[rstest]
    fn test_collisions_are_kept_apart() {
        let map = PersistentHashMap::new()
            .insert(Colliding(1), 'a')
            .insert(Colliding(2), 'b')
            .insert(Colliding(3), 'c');
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&Colliding(2)), Some(&'b'));

        let removed = map.remove(&Colliding(1)).remove(&Colliding(3));
        assert_eq!(removed.len(), 1);
        assert_eq!(removed.get(&Colliding(2)), Some(&'b'));
        assert_eq!(removed.get(&Colliding(1)), None);
    }

    #[rstest]
    fn test_transient_batches_edits() {
        let base: PersistentHashMap<i32, i32> = (0..10).map(|number| (number, number)).collect();
        let mut transient = base.clone().transient();
        assert_eq!(transient.insert(3, 30), Some(3));
        assert_eq!(transient.remove(&4), Some(4));
        assert_eq!(transient.remove(&40), None);
        assert_eq!(transient.len(), 9);

        let edited = transient.persistent();
        assert_eq!(edited.get(&3), Some(&30));
        assert_eq!(base.get(&3), Some(&3));
        assert_eq!(base.get(&4), Some(&4));
    }

    #[rstest]
    fn test_transient_clear() {
        let mut transient = PersistentHashMap::singleton("a", 1).transient();
        transient.clear();
        assert!(transient.is_empty());
        assert!(transient.persistent().is_empty());
    }

    #[rstest]
    fn test_iter_runs_both_ways() {
        let map: PersistentHashMap<i32, i32> = (0..50).map(|number| (number, number)).collect();
        let forward: Vec<_> = map.keys().copied().collect();
        let mut backward: Vec<_> = map.keys().rev().copied().collect();
        backward.reverse();
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 50);
    }

    #[rstest]
    fn test_eq_ignores_insertion_order() {
        let map1 = PersistentHashMap::new().insert("a", 1).insert("b", 2);
        let map2 = PersistentHashMap::new().insert("b", 2).insert("a", 1);
        assert_eq!(map1, map2);
    }

    #[rstest]
    fn test_sequence_view_and_back() {
        let map = PersistentHashMap::new().insert("a", 1).insert("b", 2);
        let doubled = map.as_seq().map(|value, _| value * 2).to_map();
        assert_eq!(doubled.get("b"), Some(&4));
        assert_eq!(Sequence::get(&map, &"a"), Some(1));
    }
}
