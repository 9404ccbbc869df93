//! Effects produced by the kernel.
//!
//! Effects represent the writes the runtime must perform after a command
//! is applied. The kernel is pure - it produces effects but never executes
//! them. The runtime folds all storage effects of one command into a single
//! atomic batch, so either every write of a command lands or none does.

use archivist_types::{AuditAction, CollectionHeader, CollectionId, Record, Tag};
use serde::{Deserialize, Serialize};

/// An effect to be executed by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Insert or replace a collection header.
    CollectionHeaderWrite(CollectionHeader),

    /// Insert a new edition record owned by `collection_id`.
    RecordWrite {
        collection_id: CollectionId,
        record: Record,
    },

    /// Insert a new tag.
    TagWrite(Tag),

    /// Append an entry to the audit trail.
    AuditLogAppend(AuditAction),
}

