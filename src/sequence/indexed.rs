//! Sequences keyed by a dense, order-significant index.
//!
//! [`IndexedSeq`] wraps a `Seq<usize, V>` together with a
//! `reversed_indices` flag: set when a reversal kept the original numbers,
//! so that the indices reported by a forward traversal descend. Every
//! operator that renumbers or slices consults the flag; operators that keep
//! indices pass it on.

use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use smallvec::smallvec;

use super::bounds::{is_whole, offset, resolve_begin, resolved_length};
use super::leaf::{ArrayLeaf, EmptyLeaf, EntriesLeaf};
use super::operators::{
    Bounded, Filtered, Flipped, Grouped, IndexedConcatenated, Limit, Mapped, Operands, Predicate,
    Reversed, Skipping, Sliced, Tally, Unpaired, Valued,
};
use super::protocol::{
    Direction, IndexOrder, IndexPolicy, Produce, Seq, Step, Visitor, replay_indexed,
};
use super::query::Sequence;

/// A lazy sequence of values numbered by position.
///
/// Operators that may drop or reorder entries take an [`IndexPolicy`] in
/// their `_with` variant: [`IndexPolicy::Reindex`] (the default) renumbers
/// densely from zero, [`IndexPolicy::Maintain`] keeps the source numbers.
///
/// # Examples
///
/// ```rust
/// use lazyseq::prelude::*;
///
/// let seq = IndexedSeq::from_values([10, 20, 30, 40]);
///
/// let kept = seq.filter_with(|value, _| *value > 15, IndexPolicy::Maintain);
/// assert_eq!(kept.find_key(|value, _| *value == 30), Some(2));
///
/// let renumbered = seq.filter(|value, _| *value > 15);
/// assert_eq!(renumbered.find_key(|value, _| *value == 30), Some(1));
/// ```
pub struct IndexedSeq<V> {
    inner: Seq<usize, V>,
    reversed_indices: bool,
}

impl<V> Clone for IndexedSeq<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            reversed_indices: self.reversed_indices,
        }
    }
}

impl<V> IndexedSeq<V>
where
    V: Clone + 'static,
{
    fn from_node<P>(producer: P, length: Option<usize>, reversed_indices: bool) -> Self
    where
        P: Produce<usize, V> + 'static,
    {
        Self {
            inner: Seq::with_replay(producer, length, replay_indexed::<V>),
            reversed_indices,
        }
    }

    /// Creates a sequence over `values`, indexed `0..n`.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
    {
        Self::from_shared(values.into_iter().collect())
    }

    pub(crate) fn from_shared(values: Rc<[V]>) -> Self {
        let length = values.len();
        Self::from_node(ArrayLeaf::new(values), Some(length), false)
    }

    /// A one-element sequence.
    pub fn scalar(value: V) -> Self {
        Self::from_values([value])
    }

    /// A sequence with no entries.
    pub fn empty() -> Self {
        Self::from_node(EmptyLeaf, Some(0), false)
    }

    /// Stored entries at explicit indices over a span of `length`.
    pub(crate) fn sparse(entries: Vec<(usize, V)>, length: usize) -> Self {
        Self::from_node(
            EntriesLeaf::new(Rc::from(entries), length, replay_indexed::<V>),
            Some(length),
            false,
        )
    }

    /// Like [`Self::sparse`] for entries recorded with descending indices.
    fn sparse_descending(entries: Vec<(usize, V)>, length: usize) -> Self {
        Self {
            reversed_indices: true,
            ..Self::sparse(entries, length)
        }
    }

    /// Renumbers any sequence densely. `length` is only kept for keyed
    /// sources, whose entry count equals their length.
    pub(crate) fn reindexed<K>(source: Seq<K, V>, length: Option<usize>) -> Self
    where
        K: Clone + 'static,
    {
        Self::from_node(Valued { source }, length, false)
    }

    /// The index span, if known without traversing.
    #[inline]
    pub fn length(&self) -> Option<usize> {
        self.inner.length()
    }

    /// Returns `true` when a forward traversal reports descending indices.
    #[inline]
    pub const fn reversed_indices(&self) -> bool {
        self.reversed_indices
    }

    /// The underlying keyed view.
    #[inline]
    pub const fn as_keyed(&self) -> &Seq<usize, V> {
        &self.inner
    }

    /// See [`Seq::iterate`].
    pub fn iterate(
        &self,
        visit: &mut Visitor<'_, usize, V>,
        direction: Direction,
        order: IndexOrder,
    ) -> usize {
        self.inner.iterate(visit, direction, order)
    }

    /// See [`Seq::cache_result`].
    pub fn cache_result(&self) -> &Self {
        self.inner.cache_result();
        self
    }

    /// Returns `true` when both handles share the same node.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.inner.ptr_eq(&other.inner) && self.reversed_indices == other.reversed_indices
    }

    /// Transforms every value, keeping indices and length.
    pub fn map<U, F>(&self, mapper: F) -> IndexedSeq<U>
    where
        U: Clone + 'static,
        F: Fn(&V, &usize) -> U + 'static,
    {
        IndexedSeq::from_node(
            Mapped {
                source: self.inner.clone(),
                mapper: Box::new(mapper),
            },
            self.length(),
            self.reversed_indices,
        )
    }

    /// Keeps the matching values, renumbered from zero.
    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: Fn(&V, &usize) -> bool + 'static,
    {
        self.filter_with(predicate, IndexPolicy::Reindex)
    }

    /// Keeps the matching values. With [`IndexPolicy::Maintain`] the result
    /// keeps the source indices, gaps included, and the source length.
    pub fn filter_with<P>(&self, predicate: P, policy: IndexPolicy) -> Self
    where
        P: Fn(&V, &usize) -> bool + 'static,
    {
        let predicate: Predicate<usize, V> = Box::new(predicate);
        match policy {
            IndexPolicy::Reindex => Self::reindexed(
                Seq::from_producer(
                    Filtered {
                        source: self.inner.clone(),
                        predicate,
                        tally: Tally::Visited,
                    },
                    None,
                ),
                None,
            ),
            IndexPolicy::Maintain => Self::from_node(
                Filtered {
                    source: self.inner.clone(),
                    predicate,
                    tally: Tally::Span,
                },
                self.length(),
                self.reversed_indices,
            ),
        }
    }

    /// Walks the values last to first, renumbered from the new head.
    pub fn reverse(&self) -> Self {
        self.reverse_with(IndexPolicy::Reindex)
    }

    /// Walks the values last to first. With [`IndexPolicy::Maintain`] every
    /// value keeps the index it had, so indices descend.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::prelude::*;
    ///
    /// let seq = IndexedSeq::from_values(['a', 'b', 'c']);
    /// let kept = seq.reverse_with(IndexPolicy::Maintain);
    ///
    /// assert_eq!(kept.to_vec(), vec!['c', 'b', 'a']);
    /// assert_eq!(kept.index_of(&'c'), Some(2));
    /// assert_eq!(seq.reverse().index_of(&'c'), Some(0));
    /// ```
    pub fn reverse_with(&self, policy: IndexPolicy) -> Self {
        let maintain = policy.maintains();
        Self::from_node(
            Reversed {
                source: self.inner.clone(),
                toggle_order: maintain,
            },
            self.length(),
            self.reversed_indices ^ maintain,
        )
    }

    /// Appends `others`, shifting their indices past this sequence.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::prelude::*;
    ///
    /// let seq = IndexedSeq::from_values([1, 2]).concat([vec![3], vec![4, 5]]);
    /// assert_eq!(seq.length(), Some(5));
    /// assert_eq!(seq.get(&3), Some(4));
    /// ```
    pub fn concat<I, S>(&self, others: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Self>,
    {
        let mut operands: Operands<(Seq<usize, V>, bool)> =
            smallvec![(self.inner.clone(), self.reversed_indices)];
        operands.extend(others.into_iter().map(|other| {
            let other: Self = other.into();
            (other.inner, other.reversed_indices)
        }));
        if operands.len() == 1 {
            return self.clone();
        }
        let length = operands.iter().map(|(operand, _)| operand.length()).sum();
        Self::from_node(IndexedConcatenated { operands }, length, false)
    }

    /// The values in `[begin, end)`, renumbered from zero. Negative bounds
    /// count from the end.
    pub fn slice(&self, begin: isize, end: Option<isize>) -> Self {
        self.slice_with(begin, end, IndexPolicy::Reindex)
    }

    /// The values in `[begin, end)`.
    ///
    /// Returns `self` when the range covers everything. Negative bounds on
    /// a sequence of unknown length materialise the source once.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::prelude::*;
    ///
    /// let seq = IndexedSeq::from_values([1, 2, 3, 4, 5]);
    /// assert_eq!(seq.slice(-2, None).to_vec(), vec![4, 5]);
    ///
    /// let kept = seq.slice_with(1, Some(3), IndexPolicy::Maintain);
    /// assert_eq!(kept.find_key(|value, _| *value == 3), Some(2));
    /// ```
    pub fn slice_with(&self, begin: isize, end: Option<isize>, policy: IndexPolicy) -> Self {
        let length = self.length();
        if is_whole(begin, end, length) {
            return self.clone();
        }
        let sliced_length = if policy.maintains() {
            length
        } else {
            resolved_length(begin, end, length)
        };
        Self::from_node(
            Sliced {
                source: self.inner.clone(),
                reversed_indices: self.reversed_indices,
                begin,
                end,
                policy,
            },
            sliced_length,
            self.reversed_indices,
        )
    }

    /// The first `count` values.
    pub fn take(&self, count: usize) -> Self {
        self.slice(0, Some(offset(count)))
    }

    /// Everything after the first `count` values, renumbered from zero.
    pub fn skip(&self, count: usize) -> Self {
        self.skip_with(count, IndexPolicy::Reindex)
    }

    /// Everything after the first `count` values.
    pub fn skip_with(&self, count: usize, policy: IndexPolicy) -> Self {
        self.slice_with(offset(count), None, policy)
    }

    /// The last `count` values, renumbered from zero.
    pub fn take_last(&self, count: usize) -> Self {
        self.take_last_with(count, IndexPolicy::Reindex)
    }

    /// The last `count` values.
    pub fn take_last_with(&self, count: usize, policy: IndexPolicy) -> Self {
        self.reverse_with(policy)
            .slice_with(0, Some(offset(count)), policy)
            .reverse_with(policy)
    }

    /// Everything except the last `count` values, renumbered from zero.
    pub fn skip_last(&self, count: usize) -> Self {
        self.skip_last_with(count, IndexPolicy::Reindex)
    }

    /// Everything except the last `count` values.
    pub fn skip_last_with(&self, count: usize, policy: IndexPolicy) -> Self {
        self.reverse_with(policy)
            .slice_with(offset(count), None, policy)
            .reverse_with(policy)
    }

    /// Values up to, not including, the first one failing `predicate`.
    pub fn take_while<P>(&self, predicate: P) -> Self
    where
        P: Fn(&V, &usize) -> bool + 'static,
    {
        self.take_while_with(predicate, IndexPolicy::Reindex)
    }

    /// Values up to, not including, the first one failing `predicate`.
    pub fn take_while_with<P>(&self, predicate: P, policy: IndexPolicy) -> Self
    where
        P: Fn(&V, &usize) -> bool + 'static,
    {
        let limit = Limit::While(Box::new(predicate));
        match policy {
            IndexPolicy::Reindex => Self::reindexed(
                Seq::from_producer(
                    Bounded {
                        source: self.inner.clone(),
                        limit,
                        tally: Tally::Visited,
                    },
                    None,
                ),
                None,
            ),
            IndexPolicy::Maintain => Self::from_node(
                Bounded {
                    source: self.inner.clone(),
                    limit,
                    tally: Tally::Span,
                },
                self.length(),
                self.reversed_indices,
            ),
        }
    }

    /// Values up to, not including, the first one satisfying `predicate`.
    pub fn take_until<P>(&self, predicate: P) -> Self
    where
        P: Fn(&V, &usize) -> bool + 'static,
    {
        self.take_while(move |value, index| !predicate(value, index))
    }

    /// Everything from the first value failing `predicate` on, renumbered
    /// from zero.
    pub fn skip_while<P>(&self, predicate: P) -> Self
    where
        P: Fn(&V, &usize) -> bool + 'static,
    {
        self.skip_while_with(predicate, IndexPolicy::Reindex)
    }

    /// Everything from the first value failing `predicate` on.
    pub fn skip_while_with<P>(&self, predicate: P, policy: IndexPolicy) -> Self
    where
        P: Fn(&V, &usize) -> bool + 'static,
    {
        let limit = Limit::While(Box::new(predicate));
        match policy {
            IndexPolicy::Reindex => Self::reindexed(
                Seq::from_producer(
                    Skipping {
                        source: self.inner.clone(),
                        limit,
                        tally: Tally::Visited,
                    },
                    None,
                ),
                None,
            ),
            IndexPolicy::Maintain => Self::from_node(
                Skipping {
                    source: self.inner.clone(),
                    limit,
                    tally: Tally::Span,
                },
                self.length(),
                self.reversed_indices,
            ),
        }
    }

    /// Everything from the first value satisfying `predicate` on.
    pub fn skip_until<P>(&self, predicate: P) -> Self
    where
        P: Fn(&V, &usize) -> bool + 'static,
    {
        self.skip_while(move |value, index| !predicate(value, index))
    }

    /// Removes `remove` values at `index` and inserts `values` there.
    /// A negative `index` counts from the end.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::prelude::*;
    ///
    /// let seq = IndexedSeq::from_values([1, 2, 3, 4]);
    /// assert_eq!(seq.splice(1, 2, vec![9]).to_vec(), vec![1, 9, 4]);
    /// assert_eq!(seq.splice(-1, 0, vec![7, 8]).to_vec(), vec![1, 2, 3, 7, 8, 4]);
    /// ```
    pub fn splice<S>(&self, index: isize, remove: usize, values: S) -> Self
    where
        S: Into<Self>,
    {
        let values: Self = values.into();
        if remove == 0 && values.length() == Some(0) {
            return self.clone();
        }
        let index = match usize::try_from(index) {
            Ok(index) => index,
            Err(_) => {
                self.cache_result();
                resolve_begin(index, self.length()).unwrap_or(0)
            }
        };
        self.take(index)
            .concat([values, self.skip(index.saturating_add(remove))])
    }

    /// Buckets the values by `grouper`, each bucket renumbered from zero.
    pub fn group_by<G, F>(&self, grouper: F) -> Seq<G, Self>
    where
        G: Hash + Eq + Clone + 'static,
        F: Fn(&V, &usize) -> G + 'static,
    {
        self.group_by_with(grouper, IndexPolicy::Reindex)
    }

    /// Buckets the values by `grouper`, in order of first occurrence. With
    /// [`IndexPolicy::Maintain`] each bucket keeps the source indices and
    /// span.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::prelude::*;
    ///
    /// let seq = IndexedSeq::from_values([1, 2, 3, 4]);
    /// let groups = seq.group_by_with(|value, _| value % 2 == 0, IndexPolicy::Maintain);
    /// let even = groups.get(&true).map(|bucket| bucket.keys().to_vec());
    ///
    /// assert_eq!(even, Some(vec![1, 3]));
    /// ```
    pub fn group_by_with<G, F>(&self, grouper: F, policy: IndexPolicy) -> Seq<G, Self>
    where
        G: Hash + Eq + Clone + 'static,
        F: Fn(&V, &usize) -> G + 'static,
    {
        let assemble: fn(Vec<(usize, V)>, usize) -> Self = match policy {
            IndexPolicy::Reindex => {
                |entries, _| Self::from_values(entries.into_iter().map(|(_, value)| value))
            }
            IndexPolicy::Maintain if self.reversed_indices => Self::sparse_descending,
            IndexPolicy::Maintain => Self::sparse,
        };
        Seq::from_producer(
            Grouped {
                source: self.inner.clone(),
                grouper: Box::new(grouper),
                assemble,
            },
            None,
        )
    }

    /// Values become keys and indices become values.
    pub fn flip(&self) -> Seq<V, usize> {
        Seq::from_producer(
            Flipped {
                source: self.inner.clone(),
            },
            self.length(),
        )
    }

    /// The `(index, value)` pairs, densely indexed.
    pub fn entries(&self) -> IndexedSeq<(usize, V)> {
        match self.inner.peek_cache() {
            Some(entries) => IndexedSeq::from_shared(entries),
            None => self.map(|value, index| (*index, value.clone())).values(),
        }
    }

    /// The indices, densely indexed.
    pub fn keys(&self) -> IndexedSeq<usize> {
        self.map(|_, index| *index).values()
    }

    /// The values renumbered densely from zero.
    pub fn values(&self) -> Self {
        Self::reindexed(self.inner.clone(), None)
    }

    /// The index of the first value equal to `value`.
    pub fn index_of(&self, value: &V) -> Option<usize>
    where
        V: PartialEq,
    {
        self.find_key(|candidate, _| candidate == value)
    }

    /// The index of the last value equal to `value`.
    pub fn last_index_of(&self, value: &V) -> Option<usize>
    where
        V: PartialEq,
    {
        self.find_last_key(|candidate, _| candidate == value)
    }

    /// The index of the first value satisfying `predicate`.
    pub fn find_index<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&V, &usize) -> bool,
    {
        self.find_key(predicate)
    }

    /// The index of the last value satisfying `predicate`.
    pub fn find_last_index<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&V, &usize) -> bool,
    {
        self.find_last_key(predicate)
    }
}

impl<K, V> IndexedSeq<(K, V)>
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    /// Reads the pairs back as a keyed sequence; the inverse of
    /// [`Seq::entries`].
    pub fn to_keyed(&self) -> Seq<K, V> {
        Seq::from_producer(
            Unpaired {
                source: self.inner.clone(),
            },
            self.length(),
        )
    }
}

/// Joins the display of every value with `separator`, repeating it across
/// the gaps of a sparse sequence.
pub(crate) fn join_sparse<V: fmt::Display + Clone + 'static>(
    seq: &IndexedSeq<V>,
    separator: &str,
) -> String {
    let mut joined = String::new();
    let mut previous = 0;
    seq.iterate(
        &mut |value, index| {
            joined.push_str(&separator.repeat(index.saturating_sub(previous)));
            previous = index;
            joined.push_str(&value.to_string());
            Step::Continue
        },
        Direction::Forward,
        IndexOrder::descending(seq.reversed_indices()),
    );
    if let Some(length) = seq.length()
        && length > 0
        && previous < length - 1
    {
        joined.push_str(&separator.repeat(length - 1 - previous));
    }
    joined
}

impl<V> Default for IndexedSeq<V>
where
    V: Clone + 'static,
{
    fn default() -> Self {
        Self::empty()
    }
}

impl<V> FromIterator<V> for IndexedSeq<V>
where
    V: Clone + 'static,
{
    fn from_iter<I: IntoIterator<Item = V>>(values: I) -> Self {
        Self::from_values(values)
    }
}

impl<V> From<Vec<V>> for IndexedSeq<V>
where
    V: Clone + 'static,
{
    fn from(values: Vec<V>) -> Self {
        Self::from_shared(Rc::from(values))
    }
}

impl<V> From<&[V]> for IndexedSeq<V>
where
    V: Clone + 'static,
{
    fn from(values: &[V]) -> Self {
        Self::from_shared(Rc::from(values))
    }
}

impl<V, const N: usize> From<[V; N]> for IndexedSeq<V>
where
    V: Clone + 'static,
{
    fn from(values: [V; N]) -> Self {
        Self::from_values(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn indexed(seq: &IndexedSeq<char>, direction: Direction, order: IndexOrder) -> Vec<(usize, char)> {
        let mut seen = Vec::new();
        seq.iterate(
            &mut |value, index| {
                seen.push((index, value));
                Step::Continue
            },
            direction,
            order,
        );
        seen
    }

    fn abcd() -> IndexedSeq<char> {
        IndexedSeq::from_values(['a', 'b', 'c', 'd'])
    }

    #[rstest]
    #[case(Direction::Forward, IndexOrder::Natural, vec![(0, 'a'), (1, 'b'), (2, 'c'), (3, 'd')])]
    #[case(Direction::Forward, IndexOrder::Flipped, vec![(3, 'a'), (2, 'b'), (1, 'c'), (0, 'd')])]
    #[case(Direction::Backward, IndexOrder::Natural, vec![(0, 'd'), (1, 'c'), (2, 'b'), (3, 'a')])]
    #[case(Direction::Backward, IndexOrder::Flipped, vec![(3, 'd'), (2, 'c'), (1, 'b'), (0, 'a')])]
    fn test_leaf_honours_every_traversal(
        #[case] direction: Direction,
        #[case] order: IndexOrder,
        #[case] expected: Vec<(usize, char)>,
    ) {
        assert_eq!(indexed(&abcd(), direction, order), expected);
    }

    #[rstest]
    fn test_maintained_reverse_reports_original_indices() {
        let reversed = abcd().reverse_with(IndexPolicy::Maintain);
        assert!(reversed.reversed_indices());
        assert_eq!(
            indexed(&reversed, Direction::Forward, IndexOrder::Natural),
            vec![(3, 'd'), (2, 'c'), (1, 'b'), (0, 'a')]
        );
    }

    #[rstest]
    fn test_reindexed_reverse_counts_from_new_head() {
        let reversed = abcd().reverse();
        assert!(!reversed.reversed_indices());
        assert_eq!(
            indexed(&reversed, Direction::Forward, IndexOrder::Natural),
            vec![(0, 'd'), (1, 'c'), (2, 'b'), (3, 'a')]
        );
    }

    #[rstest]
    fn test_maintained_filter_keeps_gaps_and_length() {
        let kept = abcd().filter_with(|value, _| *value != 'b', IndexPolicy::Maintain);
        assert_eq!(kept.length(), Some(4));
        assert_eq!(
            indexed(&kept, Direction::Forward, IndexOrder::Natural),
            vec![(0, 'a'), (2, 'c'), (3, 'd')]
        );
        assert_eq!(
            indexed(&kept, Direction::Backward, IndexOrder::Flipped),
            vec![(3, 'd'), (2, 'c'), (0, 'a')]
        );
    }

    #[rstest]
    fn test_flipped_filter_materialises_for_its_length() {
        let kept = abcd().filter(|value, _| *value != 'b');
        assert_eq!(
            indexed(&kept, Direction::Forward, IndexOrder::Flipped),
            vec![(2, 'a'), (1, 'c'), (0, 'd')]
        );
        assert_eq!(kept.length(), Some(3));
    }

    #[rstest]
    fn test_slice_over_reversed_indices() {
        let reversed = abcd().reverse_with(IndexPolicy::Maintain);
        let sliced = reversed.slice(1, Some(3));
        assert_eq!(sliced.to_vec(), vec!['c', 'b']);
        let kept = reversed.slice_with(1, Some(3), IndexPolicy::Maintain);
        assert_eq!(
            indexed(&kept, Direction::Forward, IndexOrder::Natural),
            vec![(2, 'c'), (1, 'b')]
        );
    }

    #[rstest]
    fn test_slice_backward_materialises() {
        let sliced = abcd().slice(1, None);
        assert_eq!(
            indexed(&sliced, Direction::Backward, IndexOrder::Natural),
            vec![(0, 'd'), (1, 'c'), (2, 'b')]
        );
    }

    #[rstest]
    fn test_concat_normalises_reversed_operands() {
        let joined = abcd().concat([IndexedSeq::from_values(['x', 'y']).reverse_with(IndexPolicy::Maintain)]);
        assert_eq!(
            indexed(&joined, Direction::Forward, IndexOrder::Natural),
            vec![(0, 'a'), (1, 'b'), (2, 'c'), (3, 'd'), (4, 'y'), (5, 'x')]
        );
        assert_eq!(
            indexed(&joined, Direction::Backward, IndexOrder::Flipped),
            vec![(5, 'x'), (4, 'y'), (3, 'd'), (2, 'c'), (1, 'b'), (0, 'a')]
        );
    }

    #[rstest]
    fn test_take_last_with_maintain_keeps_tail_indices() {
        let tail = abcd().take_last_with(2, IndexPolicy::Maintain);
        assert_eq!(
            indexed(&tail, Direction::Forward, IndexOrder::Natural),
            vec![(2, 'c'), (3, 'd')]
        );
    }

    #[rstest]
    fn test_skip_while_with_maintain() {
        let rest = abcd().skip_while_with(|value, _| *value < 'c', IndexPolicy::Maintain);
        assert_eq!(
            indexed(&rest, Direction::Forward, IndexOrder::Natural),
            vec![(2, 'c'), (3, 'd')]
        );
    }

    #[rstest]
    fn test_join_repeats_separator_over_gaps() {
        let kept = abcd().filter_with(|value, _| *value == 'b', IndexPolicy::Maintain);
        assert_eq!(join_sparse(&kept, ","), ",b,,");
    }

    #[rstest]
    fn test_to_keyed_inverts_entries() {
        let restored = abcd().entries().to_keyed();
        assert_eq!(restored.get(&2), Some('c'));
    }

    #[rstest]
    fn test_group_by_renumbers_buckets() {
        let groups = abcd().group_by(|value, _| *value < 'c');
        let low = groups.get(&false).map(|bucket| bucket.entries().to_vec());
        assert_eq!(low, Some(vec![(0, 'c'), (1, 'd')]));
    }
}
