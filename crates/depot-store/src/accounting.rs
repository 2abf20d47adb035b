use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::StoreResult;
use crate::traits::ObjectStore;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Process-wide upload accounting.
///
/// Holds the only mutable in-memory state of the store: the count of
/// distinct names ever stored. Share it behind an `Arc`. The counter never
/// decreases and is not persisted; current file count and byte totals are
/// always recomputed from a fresh listing, so they follow out-of-band
/// changes to the storage root.
#[derive(Debug, Default)]
pub struct AccountingTracker {
    files_stored_total: AtomicU64,
}

/// Point-in-time view of the store's counters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StorageSnapshot {
    pub files_stored_total: u64,
    pub files_current: u64,
    pub total_storage_bytes: u64,
}

impl StorageSnapshot {
    /// Total bytes in MiB, rounded to two decimals.
    pub fn total_storage_mb(&self) -> f64 {
        (self.total_storage_bytes as f64 / BYTES_PER_MB * 100.0).round() / 100.0
    }
}

impl AccountingTracker {
    /// Start counting from `initial`.
    pub fn new(initial: u64) -> Self {
        Self {
            files_stored_total: AtomicU64::new(initial),
        }
    }

    /// Seed the counter with the number of regular files already in `store`.
    pub fn seeded_from<S: ObjectStore + ?Sized>(store: &S) -> StoreResult<Self> {
        let existing = store.list()?.len() as u64;
        tracing::info!(existing, "seeded upload counter");
        Ok(Self::new(existing))
    }

    /// Count a completed upload. Only new names move the counter.
    pub fn record_upload(&self, was_new_file: bool) {
        if was_new_file {
            self.files_stored_total.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Current value of the upload counter.
    pub fn files_stored_total(&self) -> u64 {
        self.files_stored_total.load(Ordering::Relaxed)
    }

    /// Combine the counter with a fresh listing of `store`.
    pub fn snapshot<S: ObjectStore + ?Sized>(&self, store: &S) -> StoreResult<StorageSnapshot> {
        let entries = store.list()?;
        Ok(StorageSnapshot {
            files_stored_total: self.files_stored_total(),
            files_current: entries.len() as u64,
            total_storage_bytes: entries.iter().map(|e| e.size).sum(),
        })
    }
}
