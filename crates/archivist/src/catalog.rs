//! Main entry point for the Archivist SDK.
//!
//! The [`Catalog`] struct owns the kernel state and the store. Mutations go
//! through one path: validate, stamp the command with a timestamp, apply it
//! to a copy of the kernel state, commit the resulting writes as one batch,
//! and only then swap the new state in. A failed commit leaves both the
//! store and the in-memory state exactly as they were.

use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use archivist_kernel::{
    Collection, Command, Effect, State as KernelState, apply_committed, validate_record_payload,
};
use archivist_store::{CatalogStore, LogStore, MemoryStore, StoreStats, WriteBatch, WriteOp};
use archivist_types::{
    CollectionHeader, CollectionId, EditionNumber, Record, StateHash, Tag, TagId, Timestamp,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{CatalogError, Result};

/// Configuration for opening a durable catalog.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Directory holding the catalog log.
    pub data_dir: PathBuf,
    /// Sync every commit to disk before acknowledging it.
    pub fsync: bool,
}

impl CatalogConfig {
    /// Creates a new configuration with the given data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            fsync: true,
        }
    }

    pub fn with_fsync(mut self, fsync: bool) -> Self {
        self.fsync = fsync;
        self
    }
}

// ============================================================================
// Views
// ============================================================================

/// A record together with the id of the collection that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordView {
    pub collection_id: CollectionId,
    pub record: Record,
}

/// A collection header and its current edition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionView {
    pub header: CollectionHeader,
    pub edition: RecordView,
}

/// Catalog-wide counters and fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogStats {
    pub collections: usize,
    pub records: usize,
    pub tags: usize,
    pub state_hash: StateHash,
    pub store: StoreStats,
}

// ============================================================================
// Inner State
// ============================================================================

/// State guarded by the catalog's lock.
struct CatalogInner<S> {
    state: KernelState,
    store: S,
    /// Last timestamp handed to a command; dates never go backwards.
    last_timestamp: Option<Timestamp>,
}

impl<S: CatalogStore> CatalogInner<S> {
    fn next_timestamp(&mut self, now: Timestamp) -> Timestamp {
        let at = now.monotonic_after(self.last_timestamp);
        self.last_timestamp = Some(at);
        at
    }

    /// Applies a command and commits its writes.
    ///
    /// The kernel works on a copy of the state. The copy replaces the
    /// current state only after the store has accepted the batch.
    fn execute(&mut self, command: Command) -> Result<()> {
        let op = command.name();
        let (new_state, effects) = apply_committed(self.state.clone(), command)?;

        let mut batch = WriteBatch::new();
        for effect in effects {
            match effect {
                Effect::CollectionHeaderWrite(header) => {
                    debug!(collection_id = %header.collection_id, edition = %header.current_edition, "collection header write");
                    batch.push(WriteOp::PutCollection(header));
                }
                Effect::RecordWrite {
                    collection_id,
                    record,
                } => {
                    debug!(%collection_id, record_id = %record.record_id, edition = %record.edition, "record write");
                    batch.push(WriteOp::PutRecord {
                        collection_id,
                        record,
                    });
                }
                Effect::TagWrite(tag) => {
                    debug!(tag_id = %tag.tag_id, name = %tag.name, "tag write");
                    batch.push(WriteOp::PutTag(tag));
                }
                Effect::AuditLogAppend(action) => {
                    debug!(?action, "audit action");
                }
            }
        }

        if !batch.is_empty() {
            let ops = batch.len();
            self.store.commit(batch).map_err(|source| {
                warn!(op, error = %source, "commit failed, state unchanged");
                CatalogError::Commit { source }
            })?;
            debug!(op, ops, "command committed");
        }

        self.state = new_state;
        Ok(())
    }

    fn collection(&self, id: CollectionId) -> Result<&Collection> {
        self.state
            .get_collection(&id)
            .ok_or(CatalogError::CollectionNotFound(id))
    }

    fn collection_view(&self, id: CollectionId) -> Result<CollectionView> {
        let collection = self.collection(id)?;
        let current = collection.current_record().ok_or_else(|| {
            CatalogError::internal(format!(
                "collection {id} has no record for edition {}",
                collection.current_edition()
            ))
        })?;

        Ok(CollectionView {
            header: collection.header().clone(),
            edition: RecordView {
                collection_id: id,
                record: current.clone(),
            },
        })
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// The card catalog.
///
/// Cheap to clone; clones share the same state and store. All methods take
/// `&self` and may be called from many threads. Mutations hold the write
/// lock from reading the current state through committing and swapping in
/// the new one, so concurrent appends to one collection serialize.
pub struct Catalog<S: CatalogStore = MemoryStore> {
    inner: Arc<RwLock<CatalogInner<S>>>,
    clock: Arc<dyn Clock>,
}

impl<S: CatalogStore> Clone for Catalog<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl Catalog<LogStore> {
    /// Opens a durable catalog, replaying its log.
    pub fn open(config: CatalogConfig) -> Result<Self> {
        let store = LogStore::open(&config.data_dir, config.fsync).map_err(CatalogError::Open)?;
        Self::with_store(store)
    }
}

impl Catalog<MemoryStore> {
    /// Creates an empty catalog backed by a [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(RwLock::new(CatalogInner {
                state: KernelState::new(),
                store: MemoryStore::new(),
                last_timestamp: None,
            })),
            clock: Arc::new(SystemClock::new()),
        }
    }
}

impl<S: CatalogStore> Catalog<S> {
    /// Creates a catalog over an existing store, recovering kernel state
    /// from the store's contents.
    pub fn with_store(store: S) -> Result<Self> {
        let image = store.image();
        let state = KernelState::recover(
            image.headers().cloned(),
            image.records().map(|(id, record)| (id, record.clone())),
            image.tags().cloned(),
        )?;

        let last_timestamp = state
            .collections()
            .values()
            .map(|c| c.header().modified_date)
            .max();

        info!(
            collections = state.collection_count(),
            records = state.record_count(),
            tags = state.tag_count(),
            "catalog recovered"
        );

        Ok(Self {
            inner: Arc::new(RwLock::new(CatalogInner {
                state,
                store,
                last_timestamp,
            })),
            clock: Arc::new(SystemClock::new()),
        })
    }

    /// Replaces the clock used to stamp creation and modification dates.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, CatalogInner<S>>> {
        self.inner
            .read()
            .map_err(|_| CatalogError::internal("lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, CatalogInner<S>>> {
        self.inner
            .write()
            .map_err(|_| CatalogError::internal("lock poisoned"))
    }

    // ========================================================================
    // Collections
    // ========================================================================

    /// Creates a collection whose first edition is described by `payload`.
    ///
    /// Returns the new collection's id. Nothing is written if the payload
    /// is invalid or the commit fails.
    pub fn create_collection(&self, payload: &Value) -> Result<CollectionId> {
        let draft = validate_record_payload(payload).map_err(CatalogError::Validation)?;

        let mut inner = self.write()?;
        let collection_id = inner.state.next_collection_id();
        let at = inner.next_timestamp(self.clock.now());

        inner.execute(Command::create_collection(draft, at))?;

        info!(%collection_id, "collection created");
        Ok(collection_id)
    }

    /// Appends the edition described by `payload` to a collection.
    ///
    /// The collection is looked up before the payload is validated, so an
    /// unknown collection is reported even for a malformed payload.
    pub fn append_edition(&self, id: CollectionId, payload: &Value) -> Result<CollectionView> {
        let mut inner = self.write()?;
        if !inner.state.collection_exists(&id) {
            return Err(CatalogError::CollectionNotFound(id));
        }

        let draft = validate_record_payload(payload).map_err(CatalogError::Validation)?;
        let at = inner.next_timestamp(self.clock.now());

        inner.execute(Command::append_edition(id, draft, at))?;

        let view = inner.collection_view(id)?;
        info!(collection_id = %id, edition = %view.header.current_edition, "edition appended");
        Ok(view)
    }

    /// Returns a collection header with its current edition.
    pub fn get_collection(&self, id: CollectionId) -> Result<CollectionView> {
        self.read()?.collection_view(id)
    }

    /// Returns every edition of a collection in ascending order.
    pub fn list_editions(&self, id: CollectionId) -> Result<Vec<RecordView>> {
        let inner = self.read()?;
        let collection = inner.collection(id)?;

        Ok(collection
            .editions()
            .map(|record| RecordView {
                collection_id: id,
                record: record.clone(),
            })
            .collect())
    }

    /// Returns one edition of a collection.
    pub fn get_edition(&self, id: CollectionId, edition: EditionNumber) -> Result<RecordView> {
        let inner = self.read()?;
        let collection = inner.collection(id)?;

        let record = collection
            .edition(edition)
            .ok_or(CatalogError::EditionNotFound {
                edition,
                count: collection.edition_count(),
            })?;

        Ok(RecordView {
            collection_id: id,
            record: record.clone(),
        })
    }

    // ========================================================================
    // Tags
    // ========================================================================

    /// Registers a new tag and returns its id.
    pub fn create_tag(&self, name: &str) -> Result<TagId> {
        let mut inner = self.write()?;
        let tag_id = inner.state.next_tag_id();

        inner.execute(Command::create_tag(name))?;

        info!(%tag_id, name, "tag created");
        Ok(tag_id)
    }

    /// Associates an existing tag with a collection. Tagging a collection
    /// twice with the same tag is a no-op.
    pub fn tag_collection(&self, id: CollectionId, tag_name: &str) -> Result<()> {
        let mut inner = self.write()?;
        inner.execute(Command::tag_collection(id, tag_name))
    }

    /// Returns the tags associated with a collection, ordered by id.
    pub fn collection_tags(&self, id: CollectionId) -> Result<Vec<Tag>> {
        let inner = self.read()?;
        let collection = inner.collection(id)?;

        collection
            .tags()
            .iter()
            .map(|tag_id| {
                inner.state.get_tag(tag_id).cloned().ok_or_else(|| {
                    CatalogError::internal(format!("collection {id} references unknown tag {tag_id}"))
                })
            })
            .collect()
    }

    /// Looks up a tag by exact name.
    pub fn tag_by_name(&self, name: &str) -> Result<Option<Tag>> {
        Ok(self.read()?.state.tag_by_name(name).cloned())
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Returns the deterministic hash of the catalog's state.
    pub fn state_hash(&self) -> Result<StateHash> {
        Ok(self.read()?.state.compute_state_hash())
    }

    pub fn stats(&self) -> Result<CatalogStats> {
        let inner = self.read()?;
        Ok(CatalogStats {
            collections: inner.state.collection_count(),
            records: inner.state.record_count(),
            tags: inner.state.tag_count(),
            state_hash: inner.state.compute_state_hash(),
            store: inner.store.stats(),
        })
    }
}
