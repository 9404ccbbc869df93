//! # archivist-store: Storage collaborator for `Archivist`
//!
//! The catalog persists through the [`CatalogStore`] trait. A store commits
//! [`WriteBatch`]es atomically, enforces the uniqueness constraints of the
//! catalog's rows, and exposes its contents as a [`StoreImage`] for
//! recovery and lookups.
//!
//! Two implementations are provided:
//!
//! - [`MemoryStore`]: volatile, for tests and embedding
//! - [`LogStore`]: durable, one JSON line per committed batch
//!
//! # Example
//!
//! ```
//! use archivist_store::{CatalogStore, MemoryStore, WriteBatch};
//!
//! let mut store = MemoryStore::new();
//! store.commit(WriteBatch::new()).unwrap();
//! assert_eq!(store.stats().batches_committed, 1);
//! ```

use std::io;

use archivist_types::CollectionId;

mod batch;
mod image;
mod log;
mod memory;

pub use batch::{WriteBatch, WriteOp};
pub use image::StoreImage;
pub use log::{LOG_FILENAME, LogStore};
pub use memory::MemoryStore;

/// Durable key-indexed storage for catalog rows.
///
/// Implementations must be all-or-nothing: a commit that returns an error
/// leaves both the persisted data and [`CatalogStore::image`] unchanged.
pub trait CatalogStore: Send + Sync {
    /// Atomically applies every write in `batch`.
    fn commit(&mut self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Returns the rows currently held by the store.
    fn image(&self) -> &StoreImage;

    /// Returns store statistics.
    fn stats(&self) -> StoreStats;
}

/// Counters reported by a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub collections: usize,
    pub records: usize,
    pub tags: usize,
    /// Batches committed since the store was opened (replayed batches
    /// included).
    pub batches_committed: u64,
}

impl StoreStats {
    pub(crate) fn from_image(image: &StoreImage, batches_committed: u64) -> Self {
        Self {
            collections: image.collection_count(),
            records: image.record_count(),
            tags: image.tag_count(),
            batches_committed,
        }
    }
}

/// Errors raised by a store.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("filesystem error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode batch: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("corrupt log at line {line}: {reason}")]
    Corrupt { line: usize, reason: String },

    #[error("uniqueness conflict: {0}")]
    Conflict(String),

    #[error("record references unknown collection {0}")]
    MissingCollection(CollectionId),
}

impl StoreError {
    /// Returns true if the batch was rejected by a uniqueness constraint.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

#[cfg(test)]
mod tests;
