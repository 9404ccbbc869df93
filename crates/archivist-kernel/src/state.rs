//! Kernel state management.
//!
//! The kernel keeps the whole catalog in memory: every collection with its
//! owned edition records, and the tag registry. State transitions take
//! ownership of `self` and return the new state (builder pattern), so the
//! runtime can keep the previous state around until the writes of a command
//! have been committed.

use std::collections::{BTreeMap, BTreeSet};

use archivist_types::{
    CollectionHeader, CollectionId, EditionNumber, Record, RecordDraft, RecordId, Tag, TagId,
    Timestamp,
};
use serde::{Deserialize, Serialize};

use crate::kernel::KernelError;

// ============================================================================
// Collection Aggregate
// ============================================================================

/// A collection and the records it owns, keyed by edition number.
///
/// The edition map is the arena: records never move between collections,
/// and the owner id is attached only when a record is persisted or
/// serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    header: CollectionHeader,
    editions: BTreeMap<EditionNumber, Record>,
}

impl Collection {
    /// Returns the collection's id.
    pub fn id(&self) -> CollectionId {
        self.header.collection_id
    }

    /// Returns the mutable header (without the records).
    pub fn header(&self) -> &CollectionHeader {
        &self.header
    }

    /// Returns the current edition pointer.
    pub fn current_edition(&self) -> EditionNumber {
        self.header.current_edition
    }

    /// Returns the record the current edition pointer refers to.
    pub fn current_record(&self) -> Option<&Record> {
        self.editions.get(&self.header.current_edition)
    }

    /// Returns the record for a specific edition, if it exists.
    pub fn edition(&self, edition: EditionNumber) -> Option<&Record> {
        self.editions.get(&edition)
    }

    /// Iterates over all records in ascending edition order.
    pub fn editions(&self) -> impl Iterator<Item = &Record> {
        self.editions.values()
    }

    /// Returns the number of editions.
    pub fn edition_count(&self) -> usize {
        self.editions.len()
    }

    /// Returns the ids of the tags attached to this collection.
    pub fn tags(&self) -> &BTreeSet<TagId> {
        &self.header.tags
    }

    fn with_first_edition(collection_id: CollectionId, record: Record, at: Timestamp) -> Self {
        debug_assert_eq!(record.edition, EditionNumber::FIRST);

        let header = CollectionHeader {
            collection_id,
            current_edition: EditionNumber::FIRST,
            creation_date: at,
            creation_user: record.creation_user,
            modified_date: at,
            modified_user: record.creation_user,
            tags: BTreeSet::new(),
        };
        let mut editions = BTreeMap::new();
        editions.insert(record.edition, record);

        Self { header, editions }
    }

    fn append(&mut self, record: Record, at: Timestamp) {
        // Invariant: the appended edition directly follows the current one
        assert_eq!(
            Some(record.edition),
            self.header.current_edition.next(),
            "edition {} does not follow current edition {} of collection {}",
            record.edition,
            self.header.current_edition,
            self.header.collection_id
        );

        self.header.current_edition = record.edition;
        self.header.modified_user = record.creation_user;
        self.header.modified_date = at;
        self.editions.insert(record.edition, record);
    }

    /// Checks the edition invariants of a collection rebuilt from storage.
    fn check_editions(&self) -> Result<(), KernelError> {
        let id = self.id();

        if self.editions.is_empty() {
            return Err(KernelError::CorruptImage(format!(
                "collection {id} has no editions"
            )));
        }

        for (expected, (edition, record)) in (1u64..).zip(&self.editions) {
            if edition.as_u64() != expected || record.edition != *edition {
                return Err(KernelError::CorruptImage(format!(
                    "collection {id} has a gap in its editions at {expected}"
                )));
            }
        }

        let max = self.editions.len() as u64;
        if self.header.current_edition.as_u64() != max {
            return Err(KernelError::CorruptImage(format!(
                "collection {id} points at edition {} but holds {max} editions",
                self.header.current_edition
            )));
        }

        Ok(())
    }
}

// ============================================================================
// Kernel State
// ============================================================================

/// The kernel's in-memory state.
///
/// Id counters start at 1 and only move forward, so ids are never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    // Collections and their editions
    collections: BTreeMap<CollectionId, Collection>,
    next_collection_id: CollectionId,
    next_record_id: RecordId,

    // Tag registry
    tags: BTreeMap<TagId, Tag>,
    tag_name_index: BTreeMap<String, TagId>,
    next_tag_id: TagId,
}

impl Default for State {
    fn default() -> Self {
        Self {
            collections: BTreeMap::new(),
            next_collection_id: CollectionId::new(1),
            next_record_id: RecordId::new(1),
            tags: BTreeMap::new(),
            tag_name_index: BTreeMap::new(),
            next_tag_id: TagId::new(1),
        }
    }
}

impl State {
    /// Creates a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Collection Management
    // ========================================================================

    /// Returns true if a collection with the given ID exists.
    pub fn collection_exists(&self, id: &CollectionId) -> bool {
        self.collections.contains_key(id)
    }

    /// Returns a collection, if it exists.
    pub fn get_collection(&self, id: &CollectionId) -> Option<&Collection> {
        self.collections.get(id)
    }

    /// Returns a reference to all collections.
    pub fn collections(&self) -> &BTreeMap<CollectionId, Collection> {
        &self.collections
    }

    /// Returns the number of collections.
    pub fn collection_count(&self) -> usize {
        self.collections.len()
    }

    /// Returns the number of records across all collections.
    pub fn record_count(&self) -> usize {
        self.collections.values().map(Collection::edition_count).sum()
    }

    /// Returns the next collection ID that will be allocated.
    pub fn next_collection_id(&self) -> CollectionId {
        self.next_collection_id
    }

    /// Returns the next record ID that will be allocated.
    pub fn next_record_id(&self) -> RecordId {
        self.next_record_id
    }

    /// Creates a collection and its first edition with auto-allocated IDs.
    ///
    /// The collection and its record are allocated together; there is no
    /// way to create one without the other.
    pub(crate) fn with_new_collection(
        mut self,
        draft: RecordDraft,
        at: Timestamp,
    ) -> (Self, CollectionHeader, Record) {
        let collection_id = self.next_collection_id;
        let record_id = self.next_record_id;
        self.next_collection_id = CollectionId::new(collection_id.as_u64() + 1);
        self.next_record_id = RecordId::new(record_id.as_u64() + 1);

        let record = Record::from_draft(record_id, EditionNumber::FIRST, draft, at);
        let collection = Collection::with_first_edition(collection_id, record.clone(), at);
        let header = collection.header.clone();
        self.collections.insert(collection_id, collection);

        (self, header, record)
    }

    /// Appends `draft` as the next edition of a collection.
    ///
    /// Returns `None` alongside the unchanged state if the collection doesn't
    /// exist.
    pub(crate) fn with_appended_edition(
        mut self,
        collection_id: CollectionId,
        edition: EditionNumber,
        draft: RecordDraft,
        at: Timestamp,
    ) -> (Self, Option<(CollectionHeader, Record)>) {
        let record_id = self.next_record_id;

        let Some(collection) = self.collections.get_mut(&collection_id) else {
            return (self, None);
        };

        let record = Record::from_draft(record_id, edition, draft, at);
        collection.append(record.clone(), at);
        let header = collection.header.clone();
        self.next_record_id = RecordId::new(record_id.as_u64() + 1);

        (self, Some((header, record)))
    }

    /// Attaches a tag to a collection and returns the updated header.
    ///
    /// Returns `None` for the header when the collection is missing or
    /// already carries the tag.
    pub(crate) fn with_collection_tag(
        mut self,
        collection_id: CollectionId,
        tag_id: TagId,
    ) -> (Self, Option<CollectionHeader>) {
        let header = self
            .collections
            .get_mut(&collection_id)
            .filter(|collection| !collection.header.tags.contains(&tag_id))
            .map(|collection| {
                collection.header.tags.insert(tag_id);
                collection.header.clone()
            });
        (self, header)
    }

    // ========================================================================
    // Tag Registry
    // ========================================================================

    /// Returns a tag by id.
    pub fn get_tag(&self, id: &TagId) -> Option<&Tag> {
        self.tags.get(id)
    }

    /// Looks up a tag by exact (case-sensitive) name.
    pub fn tag_by_name(&self, name: &str) -> Option<&Tag> {
        self.tag_name_index
            .get(name)
            .and_then(|id| self.tags.get(id))
    }

    /// Returns true if a tag with the given name exists.
    pub fn tag_name_exists(&self, name: &str) -> bool {
        self.tag_name_index.contains_key(name)
    }

    /// Returns a reference to all tags.
    pub fn tags(&self) -> &BTreeMap<TagId, Tag> {
        &self.tags
    }

    /// Returns the number of tags.
    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    /// Returns the next tag ID that will be allocated.
    pub fn next_tag_id(&self) -> TagId {
        self.next_tag_id
    }

    /// Returns a reference to the tag name index.
    pub fn tag_name_index(&self) -> &BTreeMap<String, TagId> {
        &self.tag_name_index
    }

    /// Registers a tag with an auto-allocated ID.
    pub(crate) fn with_new_tag(mut self, name: String) -> (Self, Tag) {
        let tag_id = self.next_tag_id;
        self.next_tag_id = TagId::new(tag_id.as_u64() + 1);

        let tag = Tag { tag_id, name };
        self.tag_name_index.insert(tag.name.clone(), tag_id);
        self.tags.insert(tag_id, tag.clone());

        (self, tag)
    }

    // ========================================================================
    // Recovery
    // ========================================================================

    /// Rebuilds state from the rows of a persisted catalog.
    ///
    /// Every invariant the kernel maintains is checked again here: records
    /// must belong to a known collection, editions must run from 1 to the
    /// current edition without gaps, tag names must be unique and tag
    /// references must resolve. ID counters resume after the largest
    /// persisted id.
    pub fn recover(
        headers: impl IntoIterator<Item = CollectionHeader>,
        records: impl IntoIterator<Item = (CollectionId, Record)>,
        tags: impl IntoIterator<Item = Tag>,
    ) -> Result<Self, KernelError> {
        let mut state = Self::new();

        for tag in tags {
            if state.tag_name_index.contains_key(&tag.name) {
                return Err(KernelError::CorruptImage(format!(
                    "tag name '{}' appears more than once",
                    tag.name
                )));
            }
            state.next_tag_id = state.next_tag_id.max(TagId::new(tag.tag_id.as_u64() + 1));
            state.tag_name_index.insert(tag.name.clone(), tag.tag_id);
            state.tags.insert(tag.tag_id, tag);
        }

        for header in headers {
            if let Some(tag_id) = header.tags.iter().find(|id| !state.tags.contains_key(id)) {
                return Err(KernelError::CorruptImage(format!(
                    "collection {} references unknown tag {tag_id}",
                    header.collection_id
                )));
            }
            let id = header.collection_id;
            state.next_collection_id = state
                .next_collection_id
                .max(CollectionId::new(id.as_u64() + 1));
            state.collections.insert(
                id,
                Collection {
                    header,
                    editions: BTreeMap::new(),
                },
            );
        }

        for (collection_id, record) in records {
            let collection = state.collections.get_mut(&collection_id).ok_or_else(|| {
                KernelError::CorruptImage(format!(
                    "record {} belongs to unknown collection {collection_id}",
                    record.record_id
                ))
            })?;
            state.next_record_id = state
                .next_record_id
                .max(RecordId::new(record.record_id.as_u64() + 1));
            if collection.editions.insert(record.edition, record).is_some() {
                return Err(KernelError::CorruptImage(format!(
                    "collection {collection_id} holds a duplicate edition"
                )));
            }
        }

        for collection in state.collections.values() {
            collection.check_editions()?;
        }

        Ok(state)
    }
}
