use std::path::Path;

use bytes::Bytes;

use crate::error::StoreResult;
use crate::object::{ObjectEntry, SafePath, WriteOutcome};

/// Flat, name-keyed file store.
///
/// All implementations must satisfy these invariants:
/// - Writes are atomic: a concurrent reader observes either the complete
///   prior content or the complete new content, never a partial file.
/// - Only regular files count as stored objects. Directories and symlinks
///   under the root are never read, listed or followed.
/// - Listing is recomputed on every call; there is no cached index.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// The canonical directory every object lives in.
    fn root(&self) -> &Path;

    /// Check whether a regular file exists at `target`.
    fn exists(&self, target: &SafePath) -> StoreResult<bool>;

    /// Replace the entire content stored at `target`.
    ///
    /// Reports whether the name was new at the moment the write landed, so
    /// callers can keep an exact count of distinct names stored.
    fn write(&self, target: &SafePath, content: &[u8]) -> StoreResult<WriteOutcome>;

    /// Read the full content stored at `target`.
    ///
    /// Returns [`StoreError::NotFound`](crate::StoreError::NotFound) if no
    /// regular file exists there.
    fn read(&self, target: &SafePath) -> StoreResult<Bytes>;

    /// Enumerate the regular files directly under the root, in no particular
    /// order.
    fn list(&self) -> StoreResult<Vec<ObjectEntry>>;
}
