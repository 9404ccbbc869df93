//! Deterministic state hashing for kernel state.
//!
//! The hash covers every collection (sorted by id) with its header and
//! edition records, the tag registry, and the id counters. `BTreeMap`
//! iteration is sorted, so equal states always produce equal hashes.
//!
//! Used to check that reopening a durable store reproduces exactly the
//! state that was committed, and that a rejected command left the catalog
//! untouched.

use archivist_types::{CollectionHeader, Record, StateHash};
use blake3::Hasher;

use crate::state::State;

impl State {
    /// Computes a deterministic BLAKE3 hash of the entire kernel state.
    ///
    /// # Examples
    ///
    /// ```
    /// use archivist_kernel::State;
    ///
    /// assert_eq!(State::new().compute_state_hash(), State::new().compute_state_hash());
    /// ```
    pub fn compute_state_hash(&self) -> StateHash {
        let mut hasher = Hasher::new();

        // Counters
        hasher.update(&(self.collection_count() as u64).to_le_bytes());
        hasher.update(&self.next_collection_id().as_u64().to_le_bytes());
        hasher.update(&self.next_record_id().as_u64().to_le_bytes());

        for collection in self.collections().values() {
            hash_header(&mut hasher, collection.header());
            hasher.update(&(collection.edition_count() as u64).to_le_bytes());
            for record in collection.editions() {
                hash_record(&mut hasher, record);
            }
        }

        // Tag registry
        hasher.update(&(self.tag_count() as u64).to_le_bytes());
        hasher.update(&self.next_tag_id().as_u64().to_le_bytes());
        for (tag_id, tag) in self.tags() {
            hasher.update(&tag_id.as_u64().to_le_bytes());
            hash_str(&mut hasher, &tag.name);
        }

        StateHash::from_bytes(*hasher.finalize().as_bytes())
    }
}

fn hash_header(hasher: &mut Hasher, header: &CollectionHeader) {
    hasher.update(&header.collection_id.as_u64().to_le_bytes());
    hasher.update(&header.current_edition.as_u64().to_le_bytes());
    hasher.update(&header.creation_date.as_nanos().to_le_bytes());
    hasher.update(&header.creation_user.as_u64().to_le_bytes());
    hasher.update(&header.modified_date.as_nanos().to_le_bytes());
    hasher.update(&header.modified_user.as_u64().to_le_bytes());
    hasher.update(&(header.tags.len() as u64).to_le_bytes());
    for tag_id in &header.tags {
        hasher.update(&tag_id.as_u64().to_le_bytes());
    }
}

fn hash_record(hasher: &mut Hasher, record: &Record) {
    hasher.update(&record.record_id.as_u64().to_le_bytes());
    hasher.update(&record.edition.as_u64().to_le_bytes());
    hasher.update(&[record.record_type.as_u8()]);
    for field in [
        &record.title,
        &record.filename,
        &record.extension,
        &record.size,
        &record.author,
        &record.checksum,
    ] {
        hash_str(hasher, field);
    }
    hasher.update(&record.creation_date.as_nanos().to_le_bytes());
    hasher.update(&record.creation_user.as_u64().to_le_bytes());
}

/// Hashes a string with a length prefix so adjacent fields can't alias.
fn hash_str(hasher: &mut Hasher, value: &str) {
    hasher.update(&(value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}
