//! Commands that can be submitted to the kernel.
//!
//! Commands carry only validated, typed input. Payload validation happens
//! before a command is built (see [`crate::validation`]); timestamps are
//! supplied by the caller because the kernel never reads a clock.

use archivist_types::{CollectionId, RecordDraft, Timestamp};
use serde::{Deserialize, Serialize};

/// A state transition request for the catalog kernel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Create a collection together with its first edition.
    CreateCollection {
        draft: RecordDraft,
        /// Creation (and initial modification) date.
        at: Timestamp,
    },

    /// Append the next edition to an existing collection.
    AppendEdition {
        collection_id: CollectionId,
        draft: RecordDraft,
        /// Creation date of the new record and new modification date.
        at: Timestamp,
    },

    /// Register a new tag name.
    CreateTag { name: String },

    /// Associate an existing tag with an existing collection.
    TagCollection {
        collection_id: CollectionId,
        tag_name: String,
    },
}

impl Command {
    pub fn create_collection(draft: RecordDraft, at: Timestamp) -> Self {
        Self::CreateCollection { draft, at }
    }

    pub fn append_edition(collection_id: CollectionId, draft: RecordDraft, at: Timestamp) -> Self {
        Self::AppendEdition {
            collection_id,
            draft,
            at,
        }
    }

    pub fn create_tag(name: impl Into<String>) -> Self {
        Self::CreateTag { name: name.into() }
    }

    pub fn tag_collection(collection_id: CollectionId, tag_name: impl Into<String>) -> Self {
        Self::TagCollection {
            collection_id,
            tag_name: tag_name.into(),
        }
    }

    /// Short operation name, used for log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateCollection { .. } => "create_collection",
            Self::AppendEdition { .. } => "append_edition",
            Self::CreateTag { .. } => "create_tag",
            Self::TagCollection { .. } => "tag_collection",
        }
    }
}
