//! Transformations of keyed sequences.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::rc::Rc;

use smallvec::smallvec;

use super::bounds::{is_whole, resolve_begin, resolve_end};
use super::indexed::IndexedSeq;
use super::leaf::{EmptyLeaf, EntriesLeaf};
use super::operators::{
    Bounded, Concatenated, Filtered, Flipped, Grouped, Limit, Mapped, Operands, Reversed,
    Skipping, Tally,
};
use super::protocol::{Seq, replay_keyed};

impl<K, V> Seq<K, V>
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    /// Creates a keyed sequence over the given entries, in order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::prelude::*;
    ///
    /// let seq = Seq::from_entries([("a", 1), ("b", 2)]);
    /// assert_eq!(seq.length(), Some(2));
    /// assert_eq!(seq.get(&"b"), Some(2));
    /// ```
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let entries: Rc<[(K, V)]> = entries.into_iter().collect();
        let length = entries.len();
        Self::from_producer(
            EntriesLeaf::new(entries, length, replay_keyed::<K, V>),
            Some(length),
        )
    }

    /// Creates a sequence with no entries.
    pub fn empty() -> Self {
        Self::from_producer(EmptyLeaf, Some(0))
    }

    /// Transforms every value, keeping keys and length.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::prelude::*;
    ///
    /// let seq = Seq::from_entries([("a", 1), ("b", 2)]).map(|value, key| format!("{key}{value}"));
    /// assert_eq!(seq.to_vec(), vec!["a1".to_string(), "b2".to_string()]);
    /// ```
    pub fn map<U, F>(&self, mapper: F) -> Seq<K, U>
    where
        U: Clone + 'static,
        F: Fn(&V, &K) -> U + 'static,
    {
        Seq::from_producer(
            Mapped {
                source: self.clone(),
                mapper: Box::new(mapper),
            },
            self.length(),
        )
    }

    /// Keeps the entries matching `predicate`, with their keys.
    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: Fn(&V, &K) -> bool + 'static,
    {
        Self::from_producer(
            Filtered {
                source: self.clone(),
                predicate: Box::new(predicate),
                tally: Tally::Visited,
            },
            None,
        )
    }

    /// Walks the entries last to first.
    pub fn reverse(&self) -> Self {
        Self::from_producer(
            Reversed {
                source: self.clone(),
                toggle_order: false,
            },
            self.length(),
        )
    }

    /// Appends `others` after this sequence.
    ///
    /// The length is the sum of the operand lengths, or unknown if any of
    /// them is unknown.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::prelude::*;
    ///
    /// let left = Seq::from_entries([("a", 1)]);
    /// let right = Seq::from_entries([("b", 2), ("c", 3)]);
    /// let joined = left.concat([right]);
    ///
    /// assert_eq!(joined.length(), Some(3));
    /// assert_eq!(joined.reverse().to_vec(), vec![3, 2, 1]);
    /// ```
    pub fn concat<I, S>(&self, others: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Self>,
    {
        let mut operands: Operands<Self> = smallvec![self.clone()];
        operands.extend(others.into_iter().map(Into::into));
        if operands.len() == 1 {
            return self.clone();
        }
        let length = operands.iter().map(Self::length).sum();
        Self::from_producer(Concatenated { operands }, length)
    }

    /// The first `count` entries. `take(0)` never touches the source.
    pub fn take(&self, count: usize) -> Self {
        Self::from_producer(
            Bounded {
                source: self.clone(),
                limit: Limit::Count(count),
                tally: Tally::Visited,
            },
            self.length().map(|length| length.min(count)),
        )
    }

    /// Entries up to, not including, the first one failing `predicate`.
    pub fn take_while<P>(&self, predicate: P) -> Self
    where
        P: Fn(&V, &K) -> bool + 'static,
    {
        Self::from_producer(
            Bounded {
                source: self.clone(),
                limit: Limit::While(Box::new(predicate)),
                tally: Tally::Visited,
            },
            None,
        )
    }

    /// Entries up to, not including, the first one satisfying `predicate`.
    pub fn take_until<P>(&self, predicate: P) -> Self
    where
        P: Fn(&V, &K) -> bool + 'static,
    {
        self.take_while(move |value, key| !predicate(value, key))
    }

    /// Everything after the first `count` entries.
    pub fn skip(&self, count: usize) -> Self {
        if count == 0 {
            return self.clone();
        }
        Self::from_producer(
            Skipping {
                source: self.clone(),
                limit: Limit::Count(count),
                tally: Tally::Visited,
            },
            self.length().map(|length| length.saturating_sub(count)),
        )
    }

    /// Everything from the first entry failing `predicate` on.
    pub fn skip_while<P>(&self, predicate: P) -> Self
    where
        P: Fn(&V, &K) -> bool + 'static,
    {
        Self::from_producer(
            Skipping {
                source: self.clone(),
                limit: Limit::While(Box::new(predicate)),
                tally: Tally::Visited,
            },
            None,
        )
    }

    /// Everything from the first entry satisfying `predicate` on.
    pub fn skip_until<P>(&self, predicate: P) -> Self
    where
        P: Fn(&V, &K) -> bool + 'static,
    {
        self.skip_while(move |value, key| !predicate(value, key))
    }

    /// The last `count` entries.
    pub fn take_last(&self, count: usize) -> Self {
        self.reverse().take(count).reverse()
    }

    /// Everything except the last `count` entries.
    pub fn skip_last(&self, count: usize) -> Self {
        self.reverse().skip(count).reverse()
    }

    /// The entries in `[begin, end)`. Negative bounds count from the end.
    ///
    /// Returns `self` when the range covers everything. A negative bound on
    /// a sequence of unknown length goes through an indexed view, which
    /// materialises the source to learn its length.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::prelude::*;
    ///
    /// let seq = Seq::from_entries([("a", 1), ("b", 2), ("c", 3), ("d", 4)]);
    /// assert_eq!(seq.slice(1, Some(-1)).to_object::<Vec<_>>(), vec![("b", 2), ("c", 3)]);
    /// ```
    pub fn slice(&self, begin: isize, end: Option<isize>) -> Self {
        let length = self.length();
        if is_whole(begin, end, length) {
            return self.clone();
        }
        let (Some(begin), Some(end)) = (resolve_begin(begin, length), resolve_end(end, length))
        else {
            return self.entries().slice(begin, end).to_keyed();
        };
        let skipped = self.skip(begin);
        match end {
            Some(end) if length != Some(end) => skipped.take(end.saturating_sub(begin)),
            _ => skipped,
        }
    }

    /// Swaps keys and values.
    pub fn flip(&self) -> Seq<V, K> {
        Seq::from_producer(
            Flipped {
                source: self.clone(),
            },
            self.length(),
        )
    }

    /// The `(key, value)` pairs as an indexed sequence. A materialised
    /// sequence hands over its recorded entries directly.
    pub fn entries(&self) -> IndexedSeq<(K, V)> {
        match self.peek_cache() {
            Some(entries) => IndexedSeq::from_shared(entries),
            None => self.map(|value, key| (key.clone(), value.clone())).values(),
        }
    }

    /// The keys, densely indexed.
    pub fn keys(&self) -> IndexedSeq<K> {
        self.map(|_, key| key.clone()).values()
    }

    /// The values, densely indexed.
    pub fn values(&self) -> IndexedSeq<V> {
        IndexedSeq::reindexed(self.clone(), self.length())
    }

    /// Buckets the entries by `grouper`, in order of first occurrence.
    ///
    /// Every entry is seen before the first bucket is produced.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::prelude::*;
    ///
    /// let seq = Seq::from_entries([("a", 1), ("b", 2), ("c", 3)]);
    /// let groups = seq.group_by(|value, _| value % 2);
    ///
    /// assert_eq!(groups.keys().to_vec(), vec![1, 0]);
    /// assert_eq!(groups.get(&1).map(|bucket| bucket.to_vec()), Some(vec![1, 3]));
    /// ```
    pub fn group_by<G, F>(&self, grouper: F) -> Seq<G, Self>
    where
        G: Hash + Eq + Clone + 'static,
        F: Fn(&V, &K) -> G + 'static,
    {
        Seq::from_producer(
            Grouped {
                source: self.clone(),
                grouper: Box::new(grouper),
                assemble: |entries, _| Self::from_entries(entries),
            },
            None,
        )
    }
}

impl<K, V> Default for Seq<K, V>
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    fn default() -> Self {
        Self::empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Seq<K, V>
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(entries: I) -> Self {
        Self::from_entries(entries)
    }
}

impl<K, V> From<BTreeMap<K, V>> for Seq<K, V>
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    fn from(map: BTreeMap<K, V>) -> Self {
        Self::from_entries(map)
    }
}

impl<K, V, S> From<HashMap<K, V, S>> for Seq<K, V>
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    fn from(map: HashMap<K, V, S>) -> Self {
        Self::from_entries(map)
    }
}

impl<V> From<IndexedSeq<V>> for Seq<usize, V>
where
    V: Clone + 'static,
{
    fn from(indexed: IndexedSeq<V>) -> Self {
        indexed.as_keyed().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{Direction, IndexOrder, Sequence, Step};
    use rstest::rstest;

    fn letters() -> Seq<&'static str, i32> {
        Seq::from_entries([("a", 1), ("b", 2), ("c", 3), ("d", 4)])
    }

    #[rstest]
    fn test_filter_keeps_keys() {
        let odd = letters().filter(|value, _| value % 2 == 1);
        assert_eq!(odd.to_object::<Vec<_>>(), vec![("a", 1), ("c", 3)]);
        assert_eq!(odd.length(), None);
    }

    #[rstest]
    fn test_take_stops_after_the_last_entry() {
        let mut seen = 0;
        let first_two = letters().take(2);
        let total = first_two.iterate(
            &mut |_, _| {
                seen += 1;
                Step::Continue
            },
            Direction::Forward,
            IndexOrder::Natural,
        );
        assert_eq!((seen, total), (2, 2));
        assert_eq!(first_two.length(), Some(2));
    }

    #[rstest]
    fn test_reversed_take_materialises_the_prefix() {
        let prefix = letters().take_while(|value, _| *value < 3);
        assert_eq!(prefix.reverse().to_vec(), vec![2, 1]);
        assert_eq!(prefix.length(), Some(2));
    }

    #[rstest]
    fn test_skip_while_then_reverse() {
        let rest = letters().skip_while(|value, _| *value < 3);
        assert_eq!(rest.reverse().keys().to_vec(), vec!["d", "c"]);
    }

    #[rstest]
    #[case(0, None, vec![1, 2, 3, 4])]
    #[case(1, Some(3), vec![2, 3])]
    #[case(-2, None, vec![3, 4])]
    #[case(0, Some(-3), vec![1])]
    #[case(3, Some(1), vec![])]
    fn test_slices(#[case] begin: isize, #[case] end: Option<isize>, #[case] expected: Vec<i32>) {
        assert_eq!(letters().slice(begin, end).to_vec(), expected);
    }

    #[rstest]
    fn test_slice_with_negative_bound_on_unknown_length() {
        let unknown = letters().filter(|_, _| true);
        let tail = unknown.slice(-2, None);
        assert_eq!(tail.to_object::<Vec<_>>(), vec![("c", 3), ("d", 4)]);
    }

    #[rstest]
    fn test_whole_slice_returns_the_same_sequence() {
        let seq = letters();
        assert!(seq.slice(0, None).ptr_eq(&seq));
    }

    #[rstest]
    fn test_take_last_and_skip_last() {
        assert_eq!(letters().take_last(2).to_vec(), vec![3, 4]);
        assert_eq!(letters().skip_last(3).to_vec(), vec![1]);
    }

    #[rstest]
    fn test_flip_swaps_roles() {
        let flipped = letters().flip();
        assert_eq!(flipped.get(&3), Some("c"));
    }

    #[rstest]
    fn test_entries_of_a_cached_sequence_share_the_cache() {
        let seq = letters().map(|value, _| value * 10);
        seq.cache_result();
        assert_eq!(seq.entries().to_vec(), vec![("a", 10), ("b", 20), ("c", 30), ("d", 40)]);
    }

    #[rstest]
    fn test_entries_round_trip_through_to_keyed() {
        let restored = letters().entries().to_keyed();
        assert!(restored.equals(&letters()));
    }

    #[rstest]
    fn test_group_by_preserves_first_occurrence() {
        let groups = letters().group_by(|value, _| *value > 2);
        assert_eq!(groups.keys().to_vec(), vec![false, true]);
        let high = groups.get(&true).map(|bucket| bucket.to_object::<Vec<_>>());
        assert_eq!(high, Some(vec![("c", 3), ("d", 4)]));
    }

    #[rstest]
    fn test_concat_accepts_maps() {
        let extra: BTreeMap<&str, i32> = [("e", 5)].into_iter().collect();
        assert_eq!(letters().concat([extra]).length(), Some(5));
    }
}
