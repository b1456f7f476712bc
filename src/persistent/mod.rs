//! Persistent (immutable) collections.
//!
//! - [`PersistentHashMap`]: hash map over a hash array mapped trie (HAMT)
//! - [`PersistentSet`]: hash set stored in a `PersistentHashMap<T, ()>`
//!
//! # Structural Sharing
//!
//! Every edit returns a new version that shares all untouched nodes with
//! the old one. Batches of edits go through a transient
//! ([`TransientHashMap`], [`TransientSet`]), which copies each shared node
//! at most once and is sealed back in O(1).
//!
//! Both collections implement [`Sequence`](crate::sequence::Sequence) and
//! [`FromSequence`](crate::sequence::FromSequence), so they plug into the
//! lazy sequence engine in both directions.
//!
//! # Examples
//!
//! ```rust
//! use lazyseq::prelude::*;
//!
//! let tags = PersistentSet::from_values(["rust", "lazy"]);
//! let more = tags.add("hamt");
//! assert!(!tags.has("hamt"));
//! assert!(more.has("hamt"));
//!
//! let lengths = more.as_seq().map(|tag, _| tag.len()).to_map();
//! assert_eq!(lengths.get("rust"), Some(&4));
//! ```

mod hashmap;
mod set;

pub use hashmap::{PersistentHashMap, PersistentHashMapIterator, TransientHashMap};
pub use set::{PersistentSet, PersistentSetIterator, TransientSet};
