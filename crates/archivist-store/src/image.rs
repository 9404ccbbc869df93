//! The materialized contents of a store.
//!
//! Both store implementations keep a [`StoreImage`] in memory. The image is
//! what the store's uniqueness constraints are checked against, and what
//! the catalog recovers its state from on open.

use std::collections::{BTreeMap, BTreeSet};

use archivist_types::{CollectionHeader, CollectionId, EditionNumber, Record, RecordId, Tag, TagId};

use crate::StoreError;
use crate::batch::{WriteBatch, WriteOp};

/// Rows held by a store, indexed by identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreImage {
    headers: BTreeMap<CollectionId, CollectionHeader>,
    records: BTreeMap<(CollectionId, EditionNumber), Record>,
    record_ids: BTreeSet<RecordId>,
    tags: BTreeMap<TagId, Tag>,
    tag_names: BTreeMap<String, TagId>,
}

impl StoreImage {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    pub fn collection_header(&self, id: CollectionId) -> Option<&CollectionHeader> {
        self.headers.get(&id)
    }

    pub fn record(&self, id: CollectionId, edition: EditionNumber) -> Option<&Record> {
        self.records.get(&(id, edition))
    }

    pub fn tag(&self, id: TagId) -> Option<&Tag> {
        self.tags.get(&id)
    }

    pub fn tag_by_name(&self, name: &str) -> Option<&Tag> {
        self.tag_names.get(name).and_then(|id| self.tags.get(id))
    }

    /// All collection headers, ordered by id.
    pub fn headers(&self) -> impl Iterator<Item = &CollectionHeader> {
        self.headers.values()
    }

    /// All records with their owning collection, ordered by
    /// `(collection, edition)`.
    pub fn records(&self) -> impl Iterator<Item = (CollectionId, &Record)> {
        self.records.iter().map(|((id, _), record)| (*id, record))
    }

    /// All tags, ordered by id.
    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.tags.values()
    }

    pub fn collection_count(&self) -> usize {
        self.headers.len()
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    // ========================================================================
    // Batch Application
    // ========================================================================

    /// Checks a batch against the image without changing it.
    ///
    /// Rejects a batch that would insert a second record for an existing
    /// `(collection, edition)` pair, reuse a record id, reuse a tag id or tag
    /// name, or insert a record for a collection that exists neither in the
    /// image nor earlier in the batch. Ops later in the batch see the ones
    /// before them.
    pub fn check(&self, batch: &WriteBatch) -> Result<(), StoreError> {
        let mut headers: BTreeSet<CollectionId> = BTreeSet::new();
        let mut editions: BTreeSet<(CollectionId, EditionNumber)> = BTreeSet::new();
        let mut record_ids: BTreeSet<RecordId> = BTreeSet::new();
        let mut tag_ids: BTreeSet<TagId> = BTreeSet::new();
        let mut tag_names: BTreeSet<&str> = BTreeSet::new();

        for op in batch.ops() {
            match op {
                WriteOp::PutCollection(header) => {
                    headers.insert(header.collection_id);
                }
                WriteOp::PutRecord {
                    collection_id,
                    record,
                } => {
                    if !self.headers.contains_key(collection_id) && !headers.contains(collection_id)
                    {
                        return Err(StoreError::MissingCollection(*collection_id));
                    }

                    let key = (*collection_id, record.edition);
                    if self.records.contains_key(&key) || !editions.insert(key) {
                        return Err(StoreError::Conflict(format!(
                            "collection {collection_id} already has edition {}",
                            record.edition
                        )));
                    }

                    if self.record_ids.contains(&record.record_id)
                        || !record_ids.insert(record.record_id)
                    {
                        return Err(StoreError::Conflict(format!(
                            "record id {} already exists",
                            record.record_id
                        )));
                    }
                }
                WriteOp::PutTag(tag) => {
                    if self.tags.contains_key(&tag.tag_id) || !tag_ids.insert(tag.tag_id) {
                        return Err(StoreError::Conflict(format!(
                            "tag id {} already exists",
                            tag.tag_id
                        )));
                    }

                    if self.tag_names.contains_key(&tag.name) || !tag_names.insert(tag.name.as_str()) {
                        return Err(StoreError::Conflict(format!(
                            "tag name '{}' already exists",
                            tag.name
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Applies a batch that has already passed [`StoreImage::check`].
    pub(crate) fn apply(&mut self, batch: WriteBatch) {
        for op in batch {
            match op {
                WriteOp::PutCollection(header) => {
                    self.headers.insert(header.collection_id, header);
                }
                WriteOp::PutRecord {
                    collection_id,
                    record,
                } => {
                    self.record_ids.insert(record.record_id);
                    self.records.insert((collection_id, record.edition), record);
                }
                WriteOp::PutTag(tag) => {
                    self.tag_names.insert(tag.name.clone(), tag.tag_id);
                    self.tags.insert(tag.tag_id, tag);
                }
            }
        }
    }

    /// Checks then applies a batch.
    pub(crate) fn check_and_apply(&mut self, batch: WriteBatch) -> Result<(), StoreError> {
        self.check(&batch)?;
        self.apply(batch);
        Ok(())
    }
}
