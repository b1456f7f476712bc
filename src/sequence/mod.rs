//! Lazy keyed and indexed sequences.
//!
//! A [`Seq`] is a pull-free, push-based view over `(key, value)` entries.
//! Transformations such as [`Seq::map`], [`Seq::filter`] or [`Seq::slice`]
//! build a new node over the old one and compute nothing; work happens only
//! when a traversal runs, and each traversal re-runs the pipeline unless a
//! node was materialised with [`Seq::cache_result`].
//!
//! [`IndexedSeq`] adds dense integer keys and index-aware variants of the
//! operators, controlled by [`IndexPolicy`].
//!
//! The query surface (lookups, folds, conversions, equality) lives on the
//! [`Sequence`] trait, so any collection that can hand out a [`Seq`] view
//! shares it. [`FromSequence`] is the reverse seam: collections the engine
//! knows nothing about build themselves from any sequence.
//!
//! # Examples
//!
//! ```rust
//! use lazyseq::prelude::*;
//!
//! let seq = IndexedSeq::from_values([1, 2, 3, 4, 5]);
//!
//! let result = seq
//!     .filter(|value, _| value % 2 == 1)
//!     .map(|value, _| value * 10)
//!     .reverse();
//!
//! assert_eq!(result.to_vec(), vec![50, 30, 10]);
//! assert_eq!(seq.slice(-2, None).to_vec(), vec![4, 5]);
//! assert_eq!(seq.take(2).concat([seq.skip(2)]).to_vec(), seq.to_vec());
//! ```

mod bounds;
mod display;
mod indexed;
mod keyed;
mod leaf;
mod operators;
mod protocol;
mod query;

pub use indexed::IndexedSeq;
pub use protocol::{Direction, IndexOrder, IndexPolicy, Seq, Step, Visitor};
pub use query::{FromSequence, Sequence};

pub(crate) use display::write_entries;
pub(crate) use protocol::Produce;

/// Builds a sequence from a literal list.
///
/// `seq![a, b, c]` creates an [`IndexedSeq`]; `seq!{k => v, ...}` creates a
/// keyed [`Seq`].
///
/// # Examples
///
/// ```rust
/// use lazyseq::prelude::*;
/// use lazyseq::seq;
///
/// let values = seq![1, 2, 3];
/// assert_eq!(values.to_vec(), vec![1, 2, 3]);
///
/// let entries = seq! { "a" => 1, "b" => 2 };
/// assert_eq!(entries.get(&"b"), Some(2));
///
/// let empty: IndexedSeq<i32> = seq![];
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! seq {
    () => {
        $crate::sequence::IndexedSeq::empty()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::sequence::Seq::from_entries([$(($key, $value)),+])
    };
    ($($value:expr),+ $(,)?) => {
        $crate::sequence::IndexedSeq::from_values([$($value),+])
    };
}
