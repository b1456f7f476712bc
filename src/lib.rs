//! # lazyseq
//!
//! Lazy, composable sequences over keyed and indexed data, and a persistent
//! hash set built on a hash array mapped trie.
//!
//! ## Overview
//!
//! - **Sequences**: [`Seq`](sequence::Seq) and
//!   [`IndexedSeq`](sequence::IndexedSeq) describe a pipeline of
//!   transformations (map, filter, slice, concat, reverse, group by, ...)
//!   that runs only when traversed and can be materialised once with
//!   `cache_result`.
//! - **Queries**: the [`Sequence`](sequence::Sequence) trait provides
//!   lookups, folds, conversions and equality to every sequence-like type.
//! - **Persistent collections**: [`PersistentHashMap`](persistent::PersistentHashMap)
//!   and [`PersistentSet`](persistent::PersistentSet) share structure between
//!   versions and batch edits through exclusively-owned transients.
//!
//! ## Feature Flags
//!
//! - `sequence`: the lazy sequence engine (default)
//! - `persistent`: the HAMT map and the persistent set (default)
//! - `serde`: `Serialize` implementations and `to_json`
//! - `trace`: `tracing` events on materialisation and transient sealing
//! - `fxhash` / `ahash`: alternative hashers for the HAMT
//! - `full`: everything except the hasher selection
//!
//! ## Example
//!
//! ```rust
//! use lazyseq::prelude::*;
//!
//! let seq = Seq::from_entries([("a", 1), ("b", 2), ("c", 3)]);
//! let large = seq.filter(|value, _| *value > 1);
//! assert_eq!(large.to_string(), r#"Seq { "b": 2, "c": 3 }"#);
//!
//! let set = PersistentSet::from_values([1, 2, 2, 3]);
//! assert_eq!(set.len(), 3);
//! assert!(set.union(&[IndexedSeq::from_values([4])]).has(&4));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use lazyseq::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "sequence")]
    pub use crate::sequence::*;

    #[cfg(feature = "persistent")]
    pub use crate::persistent::*;
}

#[cfg(feature = "sequence")]
mod diagnostics;

#[cfg(feature = "sequence")]
pub mod sequence;

#[cfg(feature = "persistent")]
pub mod persistent;
