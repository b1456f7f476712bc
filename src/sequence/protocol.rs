//! The iteration protocol shared by every sequence shape.
//!
//! A sequence is a node that knows how to *produce* its entries by pushing
//! them, one at a time, into a visitor callback. The visitor may end the
//! traversal early by returning [`Step::Stop`]. Every producer also honours
//! a [`Direction`] and, for indexed sequences, an [`IndexOrder`] that
//! decides whether reported indices count from the head or the tail.
//!
//! Nodes memoize through [`OnceCell`]: once a sequence has been
//! materialised with `cache_result`, every later traversal replays the
//! recorded entries and the producer is never consulted again.

use std::cell::OnceCell;
use std::ops::Not;
use std::rc::Rc;

/// The signal a visitor returns after each entry.
///
/// Visitors returning `()` or `bool` convert through [`From`]: `()` always
/// continues, `false` stops.
///
/// # Examples
///
/// ```rust
/// use lazyseq::sequence::Step;
///
/// assert_eq!(Step::from(()), Step::Continue);
/// assert_eq!(Step::from(false), Step::Stop);
/// assert!(Step::Stop.is_stop());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Step {
    /// Keep producing entries.
    #[default]
    Continue,
    /// End the traversal after the current entry.
    Stop,
}

impl Step {
    /// Returns `true` for [`Step::Stop`].
    #[inline]
    pub const fn is_stop(self) -> bool {
        matches!(self, Self::Stop)
    }
}

impl From<()> for Step {
    #[inline]
    fn from((): ()) -> Self {
        Self::Continue
    }
}

impl From<bool> for Step {
    #[inline]
    fn from(keep_going: bool) -> Self {
        if keep_going { Self::Continue } else { Self::Stop }
    }
}

/// Which end of the sequence a traversal starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// From the first entry toward the last.
    #[default]
    Forward,
    /// From the last entry toward the first.
    Backward,
}

impl Direction {
    /// Returns `true` for [`Direction::Backward`].
    #[inline]
    pub const fn is_backward(self) -> bool {
        matches!(self, Self::Backward)
    }
}

impl Not for Direction {
    type Output = Self;

    #[inline]
    fn not(self) -> Self::Output {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

/// How an indexed producer numbers the entries it reports.
///
/// With [`IndexOrder::Natural`] a forward traversal reports `0, 1, 2, ...`.
/// [`IndexOrder::Flipped`] reports `length - 1 - natural` instead. A
/// backward traversal counts from the tail, so direction and order cancel:
/// the natural index is reported for forward+natural and backward+flipped.
///
/// Keyed producers ignore the order entirely.
///
/// # Examples
///
/// ```rust
/// use lazyseq::sequence::{Direction, IndexOrder};
///
/// assert_eq!(IndexOrder::Natural.report(Direction::Forward, 0, 4), 0);
/// assert_eq!(IndexOrder::Flipped.report(Direction::Forward, 0, 4), 4);
/// assert_eq!(IndexOrder::Natural.report(Direction::Backward, 4, 4), 0);
/// assert_eq!(IndexOrder::Flipped.report(Direction::Backward, 4, 4), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexOrder {
    /// Indices count from the head.
    #[default]
    Natural,
    /// Indices count from the tail.
    Flipped,
}

impl IndexOrder {
    /// Returns `true` for [`IndexOrder::Flipped`].
    #[inline]
    pub const fn is_flipped(self) -> bool {
        matches!(self, Self::Flipped)
    }

    /// Toggles the order when `condition` holds.
    #[inline]
    #[must_use]
    pub const fn flipped_if(self, condition: bool) -> Self {
        match (self, condition) {
            (order, false) => order,
            (Self::Natural, true) => Self::Flipped,
            (Self::Flipped, true) => Self::Natural,
        }
    }

    /// The order that reports indices descending when `descending` is set.
    #[inline]
    pub const fn descending(descending: bool) -> Self {
        Self::Natural.flipped_if(descending)
    }

    /// The index to report for the entry at `natural` position.
    ///
    /// `max_index` is `length - 1` of the producing sequence.
    #[inline]
    pub const fn report(self, direction: Direction, natural: usize, max_index: usize) -> usize {
        if direction.is_backward() == self.is_flipped() {
            natural
        } else {
            max_index - natural
        }
    }
}

/// Whether an indexed operator renumbers its output or keeps the source's
/// indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexPolicy {
    /// Entries are renumbered densely from zero.
    #[default]
    Reindex,
    /// Entries keep the index they had in the source, leaving gaps where
    /// entries were dropped.
    Maintain,
}

impl IndexPolicy {
    /// Returns `true` for [`IndexPolicy::Maintain`].
    #[inline]
    pub const fn maintains(self) -> bool {
        matches!(self, Self::Maintain)
    }
}

/// The callback receiving `(value, key)` pairs during a traversal.
pub type Visitor<'a, K, V> = dyn FnMut(V, K) -> Step + 'a;

/// Replays materialised entries. Selected when a node is built, so keyed
/// and indexed nodes replay their caches with different key arithmetic.
pub(crate) type Replay<K, V> =
    fn(&[(K, V)], usize, &mut Visitor<'_, K, V>, Direction, IndexOrder) -> usize;

/// A sequence shape.
///
/// `this` is the handle of the node being produced, so a producer can
/// materialise itself when it cannot honour the requested traversal.
pub(crate) trait Produce<K, V> {
    fn produce(
        &self,
        this: &Seq<K, V>,
        visit: &mut Visitor<'_, K, V>,
        direction: Direction,
        order: IndexOrder,
    ) -> usize;
}

pub(crate) struct Node<K, V> {
    length: OnceCell<usize>,
    cache: OnceCell<Rc<[(K, V)]>>,
    producer: Box<dyn Produce<K, V>>,
    replay: Replay<K, V>,
}

/// A lazy sequence of `(key, value)` entries.
///
/// `Seq` is a cheap handle: cloning it shares the underlying node together
/// with anything that node has already cached. Nothing is computed until a
/// traversal runs.
///
/// # Examples
///
/// ```rust
/// use lazyseq::prelude::*;
///
/// let prices = Seq::from_entries([("apple", 3), ("pear", 5), ("plum", 2)]);
/// let expensive = prices.filter(|price, _| *price > 2);
///
/// assert_eq!(expensive.find_key(|price, _| *price == 5), Some("pear"));
/// assert_eq!(expensive.to_vec(), vec![3, 5]);
/// ```
pub struct Seq<K, V> {
    node: Rc<Node<K, V>>,
}

impl<K, V> Clone for Seq<K, V> {
    fn clone(&self) -> Self {
        Self {
            node: Rc::clone(&self.node),
        }
    }
}

impl<K, V> Seq<K, V>
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    pub(crate) fn with_replay<P>(producer: P, length: Option<usize>, replay: Replay<K, V>) -> Self
    where
        P: Produce<K, V> + 'static,
    {
        let known = OnceCell::new();
        if let Some(length) = length {
            let _ = known.set(length);
        }
        Self {
            node: Rc::new(Node {
                length: known,
                cache: OnceCell::new(),
                producer: Box::new(producer),
                replay,
            }),
        }
    }

    /// Builds a keyed node.
    pub(crate) fn from_producer<P>(producer: P, length: Option<usize>) -> Self
    where
        P: Produce<K, V> + 'static,
    {
        Self::with_replay(producer, length, replay_keyed::<K, V>)
    }

    /// The number of entries (the index span, for indexed sequences), if
    /// known without traversing.
    #[inline]
    pub fn length(&self) -> Option<usize> {
        self.node.length.get().copied()
    }

    /// Pushes every entry into `visit` until it returns [`Step::Stop`].
    ///
    /// Returns the number of entries visited before the stop, or the full
    /// length when the traversal ran to completion.
    pub fn iterate(
        &self,
        visit: &mut Visitor<'_, K, V>,
        direction: Direction,
        order: IndexOrder,
    ) -> usize {
        match self.node.cache.get() {
            Some(entries) => {
                let length = self.length().unwrap_or(entries.len());
                (self.node.replay)(entries, length, visit, direction, order)
            }
            None => self.node.producer.produce(self, visit, direction, order),
        }
    }

    /// Materialises the sequence. The first call runs the producer once;
    /// every later traversal replays the recorded entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyseq::prelude::*;
    /// use std::cell::Cell;
    ///
    /// let calls = Cell::new(0);
    /// let doubled = IndexedSeq::from_values([1, 2, 3]).map(move |value, _| {
    ///     calls.set(calls.get() + 1);
    ///     value * 2
    /// });
    ///
    /// doubled.cache_result();
    /// assert_eq!(doubled.to_vec(), vec![2, 4, 6]);
    /// assert_eq!(doubled.length(), Some(3));
    /// ```
    pub fn cache_result(&self) -> &Self {
        if self.node.cache.get().is_none() {
            let mut entries = Vec::with_capacity(self.length().unwrap_or(0));
            let realised = self.node.producer.produce(
                self,
                &mut |value, key| {
                    entries.push((key, value));
                    Step::Continue
                },
                Direction::Forward,
                IndexOrder::Natural,
            );
            let _ = self.node.length.set(realised);
            crate::diagnostics::materialised(entries.len(), realised);
            let _ = self.node.cache.set(Rc::from(entries));
        }
        self
    }

    /// The materialised entries, running the producer if needed.
    pub(crate) fn cached_entries(&self) -> Rc<[(K, V)]> {
        self.cache_result();
        self.node
            .cache
            .get()
            .map_or_else(|| Rc::from(Vec::new()), Rc::clone)
    }

    /// The entries recorded so far, without running anything.
    pub(crate) fn peek_cache(&self) -> Option<Rc<[(K, V)]>> {
        self.node.cache.get().cloned()
    }

    /// Returns `true` when both handles point at the same node.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

/// Replays keyed entries; the index order has no meaning for them.
pub(crate) fn replay_keyed<K: Clone, V: Clone>(
    entries: &[(K, V)],
    length: usize,
    visit: &mut Visitor<'_, K, V>,
    direction: Direction,
    _order: IndexOrder,
) -> usize {
    let mut visited = 0;
    let mut emit = |(key, value): &(K, V)| {
        let step = visit(value.clone(), key.clone());
        if !step.is_stop() {
            visited += 1;
        }
        step
    };
    let stopped = match direction {
        Direction::Forward => entries.iter().any(|entry| emit(entry).is_stop()),
        Direction::Backward => entries.iter().rev().any(|entry| emit(entry).is_stop()),
    };
    if stopped { visited } else { length }
}

/// Replays indexed entries, renumbering them for the requested traversal.
/// Entries may be sparse; `length` is the index span.
pub(crate) fn replay_indexed<V: Clone>(
    entries: &[(usize, V)],
    length: usize,
    visit: &mut Visitor<'_, usize, V>,
    direction: Direction,
    order: IndexOrder,
) -> usize {
    let max_index = length.saturating_sub(1);
    let mut visited = 0;
    let mut emit = |(index, value): &(usize, V)| {
        let step = visit(value.clone(), order.report(direction, *index, max_index));
        if !step.is_stop() {
            visited += 1;
        }
        step
    };
    let stopped = match direction {
        Direction::Forward => entries.iter().any(|entry| emit(entry).is_stop()),
        Direction::Backward => entries.iter().rev().any(|entry| emit(entry).is_stop()),
    };
    if stopped { visited } else { length }
}

static_assertions::assert_not_impl_any!(Seq<i32, i32>: Send, Sync);
