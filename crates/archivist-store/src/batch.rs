//! Atomic write batches.
//!
//! A batch groups every write produced by one catalog command. Stores apply
//! a batch as a unit: either every operation lands or none does.

use archivist_types::{CollectionHeader, CollectionId, Record, Tag};
use serde::{Deserialize, Serialize};

/// A single write against the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WriteOp {
    /// Upsert a collection header by id.
    PutCollection(CollectionHeader),

    /// Insert an edition record. Records are never replaced.
    PutRecord {
        collection_id: CollectionId,
        record: Record,
    },

    /// Insert a tag. Tags are never replaced.
    PutTag(Tag),
}

/// An ordered list of writes committed atomically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    /// Builder-style [`WriteBatch::push`].
    pub fn with(mut self, op: WriteOp) -> Self {
        self.ops.push(op);
        self
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl IntoIterator for WriteBatch {
    type Item = WriteOp;
    type IntoIter = std::vec::IntoIter<WriteOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl FromIterator<WriteOp> for WriteBatch {
    fn from_iter<I: IntoIterator<Item = WriteOp>>(iter: I) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}
