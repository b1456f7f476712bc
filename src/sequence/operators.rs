//! One node type per sequence shape.
//!
//! Every node wraps its source handle and implements [`Produce`] by
//! translating the visitor, the direction and the index order on the way
//! through. Nodes that cannot honour a traversal (a bounded prefix walked
//! backward, flipped indices over an unknown length) materialise themselves
//! and replay.

use std::collections::HashMap;
use std::hash::Hash;

use smallvec::SmallVec;

use super::bounds::{resolve_begin, resolve_end};
use super::protocol::{Direction, IndexOrder, IndexPolicy, Produce, Seq, Step, Visitor};

pub(crate) type Mapper<K, V, U> = Box<dyn Fn(&V, &K) -> U>;
pub(crate) type Predicate<K, V> = Box<dyn Fn(&V, &K) -> bool>;

/// Operand lists rarely exceed a handful of sequences.
pub(crate) type Operands<T> = SmallVec<[T; 4]>;

/// What a key-preserving node reports when its traversal completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tally {
    /// The number of entries passed on.
    Visited,
    /// The index span inherited from the source.
    Span,
}

impl Tally {
    fn total<K, V>(self, this: &Seq<K, V>, stopped: bool, visited: usize, upstream: usize) -> usize
    where
        K: Clone + 'static,
        V: Clone + 'static,
    {
        match self {
            _ if stopped => visited,
            Self::Visited => visited,
            Self::Span => this.length().unwrap_or(upstream),
        }
    }
}

pub(crate) enum Limit<K, V> {
    Count(usize),
    While(Predicate<K, V>),
}

pub(crate) struct Mapped<K, V, U> {
    pub(crate) source: Seq<K, V>,
    pub(crate) mapper: Mapper<K, V, U>,
}

impl<K, V, U> Produce<K, U> for Mapped<K, V, U>
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    fn produce(
        &self,
        _this: &Seq<K, U>,
        visit: &mut Visitor<'_, K, U>,
        direction: Direction,
        order: IndexOrder,
    ) -> usize {
        self.source.iterate(
            &mut |value, key| {
                let mapped = (self.mapper)(&value, &key);
                visit(mapped, key)
            },
            direction,
            order,
        )
    }
}

pub(crate) struct Filtered<K, V> {
    pub(crate) source: Seq<K, V>,
    pub(crate) predicate: Predicate<K, V>,
    pub(crate) tally: Tally,
}

impl<K, V> Produce<K, V> for Filtered<K, V>
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    fn produce(
        &self,
        this: &Seq<K, V>,
        visit: &mut Visitor<'_, K, V>,
        direction: Direction,
        order: IndexOrder,
    ) -> usize {
        let mut visited = 0;
        let mut stopped = false;
        let upstream = self.source.iterate(
            &mut |value, key| {
                if !(self.predicate)(&value, &key) {
                    return Step::Continue;
                }
                if visit(value, key).is_stop() {
                    stopped = true;
                    return Step::Stop;
                }
                visited += 1;
                Step::Continue
            },
            direction,
            order,
        );
        self.tally.total(this, stopped, visited, upstream)
    }
}

/// Walks the source in the opposite direction. Indexed reversal that keeps
/// indices also toggles the order so reported numbers stay attached to
/// their entries.
pub(crate) struct Reversed<K, V> {
    pub(crate) source: Seq<K, V>,
    pub(crate) toggle_order: bool,
}

impl<K, V> Produce<K, V> for Reversed<K, V>
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    fn produce(
        &self,
        _this: &Seq<K, V>,
        visit: &mut Visitor<'_, K, V>,
        direction: Direction,
        order: IndexOrder,
    ) -> usize {
        self.source
            .iterate(visit, !direction, order.flipped_if(self.toggle_order))
    }
}

pub(crate) struct Concatenated<K, V> {
    pub(crate) operands: Operands<Seq<K, V>>,
}

impl<K, V> Produce<K, V> for Concatenated<K, V>
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    fn produce(
        &self,
        _this: &Seq<K, V>,
        visit: &mut Visitor<'_, K, V>,
        direction: Direction,
        order: IndexOrder,
    ) -> usize {
        let mut consumed = 0;
        for operand in ordered(&self.operands, direction) {
            let mut stopped = false;
            consumed += operand.iterate(
                &mut |value, key| {
                    let step = visit(value, key);
                    stopped = step.is_stop();
                    step
                },
                direction,
                order,
            );
            if stopped {
                break;
            }
        }
        consumed
    }
}

/// Concatenation of indexed operands. Each operand's indices are
/// normalised to ascending and shifted by the span of everything before it.
pub(crate) struct IndexedConcatenated<V> {
    /// Operands with their `reversed_indices` flag.
    pub(crate) operands: Operands<(Seq<usize, V>, bool)>,
}

impl<V> Produce<usize, V> for IndexedConcatenated<V>
where
    V: Clone + 'static,
{
    fn produce(
        &self,
        this: &Seq<usize, V>,
        visit: &mut Visitor<'_, usize, V>,
        direction: Direction,
        order: IndexOrder,
    ) -> usize {
        let length = this.length();
        if order.is_flipped() && length.is_none() {
            return this.cache_result().iterate(visit, direction, order);
        }
        let max_index = length.unwrap_or(0).saturating_sub(1);
        let mut offset = 0;
        let mut visited = 0;
        for (operand, reversed_indices) in ordered(&self.operands, direction) {
            let base = offset;
            let mut stopped = false;
            offset += operand.iterate(
                &mut |value, index| {
                    let combined = base + index;
                    let reported = if order.is_flipped() {
                        max_index.saturating_sub(combined)
                    } else {
                        combined
                    };
                    if visit(value, reported).is_stop() {
                        stopped = true;
                        return Step::Stop;
                    }
                    visited += 1;
                    Step::Continue
                },
                direction,
                IndexOrder::descending(*reversed_indices),
            );
            if stopped {
                return visited;
            }
        }
        offset
    }
}

fn ordered<T>(operands: &[T], direction: Direction) -> Box<dyn Iterator<Item = &T> + '_> {
    match direction {
        Direction::Forward => Box::new(operands.iter()),
        Direction::Backward => Box::new(operands.iter().rev()),
    }
}

/// A prefix bounded by a count or a predicate. Stops the source right
/// after the deciding entry.
pub(crate) struct Bounded<K, V> {
    pub(crate) source: Seq<K, V>,
    pub(crate) limit: Limit<K, V>,
    pub(crate) tally: Tally,
}

impl<K, V> Produce<K, V> for Bounded<K, V>
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    fn produce(
        &self,
        this: &Seq<K, V>,
        visit: &mut Visitor<'_, K, V>,
        direction: Direction,
        order: IndexOrder,
    ) -> usize {
        if direction.is_backward() || (order.is_flipped() && self.tally == Tally::Visited) {
            return this.cache_result().iterate(visit, direction, order);
        }
        if matches!(self.limit, Limit::Count(0)) {
            return 0;
        }
        let mut visited = 0;
        let mut stopped = false;
        let upstream = self.source.iterate(
            &mut |value, key| {
                if let Limit::While(predicate) = &self.limit
                    && !predicate(&value, &key)
                {
                    return Step::Stop;
                }
                if visit(value, key).is_stop() {
                    stopped = true;
                    return Step::Stop;
                }
                visited += 1;
                match &self.limit {
                    Limit::Count(limit) if visited >= *limit => Step::Stop,
                    _ => Step::Continue,
                }
            },
            direction,
            order,
        );
        self.tally.total(this, stopped, visited, upstream)
    }
}

/// Drops a prefix bounded by a count or a predicate.
pub(crate) struct Skipping<K, V> {
    pub(crate) source: Seq<K, V>,
    pub(crate) limit: Limit<K, V>,
    pub(crate) tally: Tally,
}

impl<K, V> Produce<K, V> for Skipping<K, V>
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    fn produce(
        &self,
        this: &Seq<K, V>,
        visit: &mut Visitor<'_, K, V>,
        direction: Direction,
        order: IndexOrder,
    ) -> usize {
        if direction.is_backward() || (order.is_flipped() && self.tally == Tally::Visited) {
            return this.cache_result().iterate(visit, direction, order);
        }
        let mut skipping = true;
        let mut dropped = 0;
        let mut visited = 0;
        let mut stopped = false;
        let upstream = self.source.iterate(
            &mut |value, key| {
                if skipping {
                    skipping = match &self.limit {
                        Limit::Count(limit) => dropped < *limit,
                        Limit::While(predicate) => predicate(&value, &key),
                    };
                    if skipping {
                        dropped += 1;
                        return Step::Continue;
                    }
                }
                if visit(value, key).is_stop() {
                    stopped = true;
                    return Step::Stop;
                }
                visited += 1;
                Step::Continue
            },
            direction,
            order,
        );
        self.tally.total(this, stopped, visited, upstream)
    }
}

/// An index range of an indexed source.
///
/// Bounds are resolved on every traversal, so a source that learns its
/// length later is handled without rebuilding the node. When the source
/// reports descending indices the range is translated to `[n - end, n - begin)`.
pub(crate) struct Sliced<V> {
    pub(crate) source: Seq<usize, V>,
    pub(crate) reversed_indices: bool,
    pub(crate) begin: isize,
    pub(crate) end: Option<isize>,
    pub(crate) policy: IndexPolicy,
}

impl<V> Produce<usize, V> for Sliced<V>
where
    V: Clone + 'static,
{
    fn produce(
        &self,
        this: &Seq<usize, V>,
        visit: &mut Visitor<'_, usize, V>,
        direction: Direction,
        order: IndexOrder,
    ) -> usize {
        if direction.is_backward() {
            return this.cache_result().iterate(visit, direction, order);
        }
        let descending = self.reversed_indices ^ order.is_flipped();
        let needs_length = descending || self.begin < 0 || self.end.is_some_and(|end| end < 0);
        if needs_length && self.source.length().is_none() {
            self.source.cache_result();
        }
        let length = self.source.length();
        let (Some(begin), Some(end)) = (
            resolve_begin(self.begin, length),
            resolve_end(self.end, length),
        ) else {
            return 0;
        };
        let (low, high) = if descending {
            let length = length.unwrap_or(0);
            (
                length.saturating_sub(end.unwrap_or(length)),
                Some(length.saturating_sub(begin)),
            )
        } else {
            (begin, end)
        };
        if high.is_some_and(|high| high <= low) {
            return 0;
        }

        let maintain = self.policy.maintains();
        let mut visited = 0;
        let mut stopped = false;
        let upstream = self.source.iterate(
            &mut |value, index| {
                let in_range = index >= low && high.is_none_or(|high| index < high);
                if !in_range {
                    let past = if descending {
                        index < low
                    } else {
                        high.is_some_and(|high| index >= high)
                    };
                    return if past { Step::Stop } else { Step::Continue };
                }
                let reported = if maintain { index } else { index - low };
                if visit(value, reported).is_stop() {
                    stopped = true;
                    return Step::Stop;
                }
                visited += 1;
                let last = if descending {
                    index == low
                } else {
                    high.is_some_and(|high| index + 1 >= high)
                };
                if last { Step::Stop } else { Step::Continue }
            },
            Direction::Forward,
            order,
        );
        if stopped {
            return visited;
        }
        this.length().unwrap_or_else(|| {
            if maintain {
                self.source.length().unwrap_or(upstream)
            } else {
                visited
            }
        })
    }
}

/// Renumbers any sequence densely from zero.
pub(crate) struct Valued<K, V> {
    pub(crate) source: Seq<K, V>,
}

impl<K, V> Produce<usize, V> for Valued<K, V>
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    fn produce(
        &self,
        this: &Seq<usize, V>,
        visit: &mut Visitor<'_, usize, V>,
        direction: Direction,
        order: IndexOrder,
    ) -> usize {
        let length = this.length();
        if order.is_flipped() && length.is_none() {
            return this.cache_result().iterate(visit, direction, order);
        }
        let max_index = length.unwrap_or(0).saturating_sub(1);
        let mut position = 0;
        self.source.iterate(
            &mut |value, _| {
                let index = if order.is_flipped() {
                    max_index.saturating_sub(position)
                } else {
                    position
                };
                let step = visit(value, index);
                if !step.is_stop() {
                    position += 1;
                }
                step
            },
            direction,
            IndexOrder::Natural,
        );
        position
    }
}

/// Swaps keys and values.
pub(crate) struct Flipped<K, V> {
    pub(crate) source: Seq<K, V>,
}

impl<K, V> Produce<V, K> for Flipped<K, V>
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    fn produce(
        &self,
        _this: &Seq<V, K>,
        visit: &mut Visitor<'_, V, K>,
        direction: Direction,
        order: IndexOrder,
    ) -> usize {
        self.source
            .iterate(&mut |value, key| visit(key, value), direction, order)
    }
}

/// Turns an indexed sequence of pairs back into a keyed sequence.
pub(crate) struct Unpaired<K, V> {
    pub(crate) source: Seq<usize, (K, V)>,
}

impl<K, V> Produce<K, V> for Unpaired<K, V>
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    fn produce(
        &self,
        _this: &Seq<K, V>,
        visit: &mut Visitor<'_, K, V>,
        direction: Direction,
        _order: IndexOrder,
    ) -> usize {
        self.source.iterate(
            &mut |(key, value), _| visit(value, key),
            direction,
            IndexOrder::Natural,
        )
    }
}

/// Buckets the source by a grouping key, in order of first occurrence.
/// `assemble` builds each bucket from its entries and the source span.
pub(crate) struct Grouped<K, V, G, B> {
    pub(crate) source: Seq<K, V>,
    pub(crate) grouper: Mapper<K, V, G>,
    pub(crate) assemble: fn(Vec<(K, V)>, usize) -> B,
}

impl<K, V, G, B> Produce<G, B> for Grouped<K, V, G, B>
where
    K: Clone + 'static,
    V: Clone + 'static,
    G: Hash + Eq + Clone,
{
    fn produce(
        &self,
        _this: &Seq<G, B>,
        visit: &mut Visitor<'_, G, B>,
        direction: Direction,
        _order: IndexOrder,
    ) -> usize {
        let mut slots: HashMap<G, usize> = HashMap::new();
        let mut buckets: Vec<(G, Vec<(K, V)>)> = Vec::new();
        let span = self.source.iterate(
            &mut |value, key| {
                let group = (self.grouper)(&value, &key);
                let slot = *slots.entry(group.clone()).or_insert_with(|| {
                    buckets.push((group, Vec::new()));
                    buckets.len() - 1
                });
                buckets[slot].1.push((key, value));
                Step::Continue
            },
            Direction::Forward,
            IndexOrder::Natural,
        );

        let total = buckets.len();
        let mut visited = 0;
        let mut emit = |(group, entries): (G, Vec<(K, V)>)| {
            let step = visit((self.assemble)(entries, span), group);
            if !step.is_stop() {
                visited += 1;
            }
            step
        };
        let stopped = match direction {
            Direction::Forward => buckets.into_iter().any(|bucket| emit(bucket).is_stop()),
            Direction::Backward => buckets
                .into_iter()
                .rev()
                .any(|bucket| emit(bucket).is_stop()),
        };
        if stopped { visited } else { total }
    }
}
