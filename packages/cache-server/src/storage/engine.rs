//! Low-level, synchronous keyed storage of [`Blob`]s.
//!
//! This is the innermost storage layer the local tier of the Blob Store
//! Interface is built on. Implementations are in-memory maps; wrapped in
//! `Arc<dyn StorageEngine>` for sharing across async boundaries.

use super::blob::Blob;

pub trait StorageEngine: Send + Sync + 'static {
    /// Insert or replace a blob by key. Returns the previous blob if any.
    fn put(&self, key: &str, blob: Blob) -> Option<Blob>;

    /// Retrieve a blob by key, or `None` if not present.
    fn get(&self, key: &str) -> Option<Blob>;

    /// Remove a blob by key, returning the removed blob.
    fn remove(&self, key: &str) -> Option<Blob>;

    /// Check if a key exists without returning the blob.
    fn contains_key(&self, key: &str) -> bool;

    /// Return the number of entries.
    fn len(&self) -> usize;

    /// Check if the storage is empty.
    fn is_empty(&self) -> bool;

    /// Clear all entries.
    fn clear(&self);
}
