//! Structured events for materialisation and transient scopes.
//!
//! Events are emitted through `tracing` when the `trace` feature is enabled
//! and compile to nothing otherwise.

/// A sequence recorded its entries.
#[inline]
pub(crate) fn materialised(entries: usize, length: usize) {
    #[cfg(feature = "trace")]
    tracing::trace!(entries, length, "sequence materialised");
    #[cfg(not(feature = "trace"))]
    let _ = (entries, length);
}

/// A transient scope was sealed back into a persistent collection.
#[cfg(feature = "persistent")]
#[inline]
pub(crate) fn sealed(collection: &'static str, length: usize) {
    #[cfg(feature = "trace")]
    tracing::debug!(collection, length, "transient sealed");
    #[cfg(not(feature = "trace"))]
    let _ = (collection, length);
}
