//! Rendering and serialization of sequences.
//!
//! Keyed sequences render as `Seq { k: v, ... }`, indexed ones as
//! `Seq [ v, ... ]`. Keys and values go through [`fmt::Debug`], so strings
//! come out quoted and nested sequences render recursively.

use std::fmt;

use super::indexed::IndexedSeq;
use super::protocol::{Direction, IndexOrder, Seq, Step};
use super::query::Sequence;

/// Writes `head open entry, entry close` for any sequence, stopping at the
/// first formatter error.
pub(crate) fn write_entries<K, V, S, W>(
    formatter: &mut fmt::Formatter<'_>,
    sequence: &S,
    head: &str,
    (open, close): (char, char),
    mut write_entry: W,
) -> fmt::Result
where
    K: Clone + 'static,
    V: Clone + 'static,
    S: Sequence<K, V> + ?Sized,
    W: FnMut(&mut fmt::Formatter<'_>, &K, &V) -> fmt::Result,
{
    write!(formatter, "{head} {open}")?;
    let mut result = Ok(());
    let mut first = true;
    sequence.iterate(
        &mut |value, key| {
            let separator = if first { " " } else { ", " };
            first = false;
            result = formatter
                .write_str(separator)
                .and_then(|()| write_entry(formatter, &key, &value));
            if result.is_err() { Step::Stop } else { Step::Continue }
        },
        Direction::Forward,
        IndexOrder::Natural,
    );
    result?;
    if !first {
        formatter.write_str(" ")?;
    }
    write!(formatter, "{close}")
}

impl<K, V> fmt::Display for Seq<K, V>
where
    K: fmt::Debug + Clone + 'static,
    V: fmt::Debug + Clone + 'static,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_entries(formatter, self, "Seq", ('{', '}'), |formatter, key, value| {
            write!(formatter, "{key:?}: {value:?}")
        })
    }
}

impl<K, V> fmt::Debug for Seq<K, V>
where
    K: fmt::Debug + Clone + 'static,
    V: fmt::Debug + Clone + 'static,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, formatter)
    }
}

impl<V> fmt::Display for IndexedSeq<V>
where
    V: fmt::Debug + Clone + 'static,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_entries(formatter, self, "Seq", ('[', ']'), |formatter, _, value| {
            write!(formatter, "{value:?}")
        })
    }
}

impl<V> fmt::Debug for IndexedSeq<V>
where
    V: fmt::Debug + Clone + 'static,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, formatter)
    }
}

#[cfg(feature = "serde")]
mod serialization {
    use serde::ser::{SerializeMap, SerializeSeq};
    use serde::{Serialize, Serializer};

    use super::{Direction, IndexOrder, IndexedSeq, Seq, Step};

    impl<K, V> Serialize for Seq<K, V>
    where
        K: Serialize + Clone + 'static,
        V: Serialize + Clone + 'static,
    {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(self.length())?;
            let mut result = Ok(());
            self.iterate(
                &mut |value, key| {
                    result = map.serialize_entry(&key, &value);
                    if result.is_err() { Step::Stop } else { Step::Continue }
                },
                Direction::Forward,
                IndexOrder::Natural,
            );
            result?;
            map.end()
        }
    }

    impl<V> Serialize for IndexedSeq<V>
    where
        V: Serialize + Clone + 'static,
    {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut values = serializer.serialize_seq(None)?;
            let mut result = Ok(());
            self.iterate(
                &mut |value, _| {
                    result = values.serialize_element(&value);
                    if result.is_err() { Step::Stop } else { Step::Continue }
                },
                Direction::Forward,
                IndexOrder::Natural,
            );
            result?;
            values.end()
        }
    }

    impl<K, V> Seq<K, V>
    where
        K: Serialize + Clone + 'static,
        V: Serialize + Clone + 'static,
    {
        /// Converts the sequence into a JSON object, recursing into nested
        /// sequences.
        ///
        /// # Errors
        ///
        /// Fails when a key does not serialize to a JSON object key.
        pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
            serde_json::to_value(self)
        }
    }

    impl<V> IndexedSeq<V>
    where
        V: Serialize + Clone + 'static,
    {
        /// Converts the sequence into a JSON array, recursing into nested
        /// sequences.
        ///
        /// # Errors
        ///
        /// Fails when a value cannot be represented as JSON.
        pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
            serde_json::to_value(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_keyed_renders_quoted_entries() {
        let seq = Seq::from_entries([("a", 1), ("b", 2)]);
        assert_eq!(seq.to_string(), r#"Seq { "a": 1, "b": 2 }"#);
    }

    #[rstest]
    fn test_indexed_renders_values() {
        let seq = IndexedSeq::from_values(["x", "y"]);
        assert_eq!(seq.to_string(), r#"Seq [ "x", "y" ]"#);
        assert_eq!(format!("{seq:?}"), seq.to_string());
    }

    #[rstest]
    fn test_empty_sequences_render_braces_only() {
        assert_eq!(Seq::<u8, u8>::empty().to_string(), "Seq {}");
        assert_eq!(IndexedSeq::<u8>::empty().to_string(), "Seq []");
    }

    #[rstest]
    fn test_nested_sequences_render_recursively() {
        let nested = IndexedSeq::from_values([IndexedSeq::from_values([1, 2]), IndexedSeq::empty()]);
        assert_eq!(nested.to_string(), "Seq [ Seq [ 1, 2 ], Seq [] ]");
    }
}
