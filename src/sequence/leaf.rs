//! Sequences backed by concrete storage.

use std::rc::Rc;

use super::protocol::{Direction, IndexOrder, Produce, Replay, Seq, Visitor};

/// A dense run of values, indexed by position.
pub(crate) struct ArrayLeaf<V> {
    values: Rc<[V]>,
}

impl<V> ArrayLeaf<V> {
    pub(crate) const fn new(values: Rc<[V]>) -> Self {
        Self { values }
    }
}

impl<V: Clone> Produce<usize, V> for ArrayLeaf<V> {
    fn produce(
        &self,
        _this: &Seq<usize, V>,
        visit: &mut Visitor<'_, usize, V>,
        direction: Direction,
        order: IndexOrder,
    ) -> usize {
        let max_index = self.values.len().saturating_sub(1);
        let mut visited = 0;
        let mut emit = |natural: usize, value: &V| {
            let step = visit(value.clone(), order.report(direction, natural, max_index));
            if !step.is_stop() {
                visited += 1;
            }
            step
        };
        let mut positions = self.values.iter().enumerate();
        let stopped = match direction {
            Direction::Forward => positions.any(|(natural, value)| emit(natural, value).is_stop()),
            Direction::Backward => positions
                .rev()
                .any(|(natural, value)| emit(natural, value).is_stop()),
        };
        if stopped { visited } else { self.values.len() }
    }
}

/// Stored `(key, value)` entries, replayed with the arithmetic chosen at
/// construction. Sparse indexed buckets use this with an explicit span.
pub(crate) struct EntriesLeaf<K, V> {
    entries: Rc<[(K, V)]>,
    length: usize,
    replay: Replay<K, V>,
}

impl<K, V> EntriesLeaf<K, V> {
    pub(crate) const fn new(entries: Rc<[(K, V)]>, length: usize, replay: Replay<K, V>) -> Self {
        Self {
            entries,
            length,
            replay,
        }
    }
}

impl<K, V> Produce<K, V> for EntriesLeaf<K, V> {
    fn produce(
        &self,
        _this: &Seq<K, V>,
        visit: &mut Visitor<'_, K, V>,
        direction: Direction,
        order: IndexOrder,
    ) -> usize {
        (self.replay)(&self.entries, self.length, visit, direction, order)
    }
}

/// Produces nothing.
pub(crate) struct EmptyLeaf;

impl<K, V> Produce<K, V> for EmptyLeaf {
    fn produce(
        &self,
        _this: &Seq<K, V>,
        _visit: &mut Visitor<'_, K, V>,
        _direction: Direction,
        _order: IndexOrder,
    ) -> usize {
        0
    }
}
