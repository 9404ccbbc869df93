//! # Archivist
//!
//! A card catalog that tracks documents organized into version-controlled
//! collections. Each collection accumulates an ordered sequence of
//! editions and can be annotated with reusable tags.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                       Catalog                         │
//! │  ┌────────────┐   ┌───────────┐   ┌────────────────┐  │
//! │  │ Validation │ → │  Kernel   │ → │     Store      │  │
//! │  │  (drafts)  │   │(pure FSM) │   │ (atomic batch) │  │
//! │  └────────────┘   └───────────┘   └────────────────┘  │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use archivist::{Catalog, EditionNumber};
//! use serde_json::json;
//!
//! let catalog = Catalog::in_memory();
//! let payload = json!({
//!     "record_type": 1,
//!     "title": "New Document",
//!     "filename": "NewDoc.docx",
//!     "extension": "docx",
//!     "author": "Me",
//!     "checksum": "2ee20486d3b51eed3f850139af55c7ea",
//!     "size": "101kb",
//!     "user": 1000
//! });
//!
//! let id = catalog.create_collection(&payload).unwrap();
//! let first = catalog.get_edition(id, EditionNumber::FIRST).unwrap();
//! assert_eq!(first.record.title, "New Document");
//! ```

mod catalog;
mod clock;
mod error;

pub use catalog::{Catalog, CatalogConfig, CatalogStats, CollectionView, RecordView};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CatalogError, Result};

// Re-export core types
pub use archivist_types::{
    CollectionHeader, CollectionId, EditionNumber, Record, RecordId, RecordType, StateHash, Tag,
    TagId, Timestamp, UserId,
};

// Re-export storage types
pub use archivist_store::{CatalogStore, LogStore, MemoryStore, StoreError, StoreStats};
