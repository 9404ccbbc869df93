//! Volatile in-memory store.

use tracing::debug;

use crate::{CatalogStore, StoreError, StoreImage, StoreStats, WriteBatch};

/// A store that keeps everything in memory.
///
/// Enforces the same constraints as [`crate::LogStore`], so it is a
/// faithful stand-in for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    image: StoreImage,
    batches_committed: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CatalogStore for MemoryStore {
    fn commit(&mut self, batch: WriteBatch) -> Result<(), StoreError> {
        let ops = batch.len();
        self.image.check_and_apply(batch)?;
        self.batches_committed += 1;
        debug!(ops, seq = self.batches_committed, "batch committed");
        Ok(())
    }

    fn image(&self) -> &StoreImage {
        &self.image
    }

    fn stats(&self) -> StoreStats {
        StoreStats::from_image(&self.image, self.batches_committed)
    }
}
