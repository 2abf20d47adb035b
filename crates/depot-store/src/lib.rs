//! Flat-namespace file storage for Depot.
//!
//! This crate is the persistence and accounting core behind the Depot HTTP
//! service. It turns untrusted client names into paths confined to a single
//! storage root, writes file contents atomically, and keeps an exact count
//! of distinct names uploaded while the process runs.
//!
//! # Components
//!
//! - [`NameResolver`] -- validates a raw name and maps it to a [`SafePath`]
//! - [`ObjectStore`] -- read/write/list contract; [`FsObjectStore`] is the
//!   on-disk implementation
//! - [`AccountingTracker`] -- shared upload counter plus [`StorageSnapshot`]
//!   for metrics
//!
//! # Design Rules
//!
//! 1. Every path the store touches is a direct child of the canonical root.
//! 2. Writes go to a staging file first and are renamed into place.
//! 3. Only regular files are objects; symlinks are never followed.
//! 4. Counts of current files and bytes are never cached.
//! 5. All I/O errors are propagated, never retried or swallowed.

pub mod accounting;
pub mod error;
pub mod fs;
pub mod names;
pub mod object;
pub mod traits;

pub use accounting::{AccountingTracker, StorageSnapshot};
pub use error::{StoreError, StoreResult};
pub use fs::FsObjectStore;
pub use names::NameResolver;
pub use object::{ObjectEntry, SafePath, WriteOutcome};
pub use traits::ObjectStore;
