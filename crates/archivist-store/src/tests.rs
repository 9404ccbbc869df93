//! Unit tests for archivist-store

use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::Write;

use archivist_types::{
    CollectionHeader, CollectionId, EditionNumber, Record, RecordId, RecordType, Tag, TagId,
    Timestamp, UserId,
};
use test_case::test_case;

use crate::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn header(id: u64, current: u64) -> CollectionHeader {
    CollectionHeader {
        collection_id: CollectionId::new(id),
        current_edition: EditionNumber::new(current),
        creation_date: Timestamp::from_nanos(1),
        creation_user: UserId::new(1000),
        modified_date: Timestamp::from_nanos(current),
        modified_user: UserId::new(1000),
        tags: BTreeSet::new(),
    }
}

fn record(record_id: u64, edition: u64) -> Record {
    Record {
        record_id: RecordId::new(record_id),
        edition: EditionNumber::new(edition),
        record_type: RecordType::Document,
        title: "New Document".into(),
        filename: "NewDoc.docx".into(),
        extension: "docx".into(),
        size: "101kb".into(),
        author: "Me".into(),
        checksum: "2ee20486d3b51eed3f850139af55c7ea".into(),
        creation_date: Timestamp::from_nanos(edition),
        creation_user: UserId::new(1000),
    }
}

fn tag(id: u64, name: &str) -> Tag {
    Tag {
        tag_id: TagId::new(id),
        name: name.into(),
    }
}

fn create_batch(id: u64, record_id: u64) -> WriteBatch {
    WriteBatch::new()
        .with(WriteOp::PutCollection(header(id, 1)))
        .with(WriteOp::PutRecord {
            collection_id: CollectionId::new(id),
            record: record(record_id, 1),
        })
}

fn append_batch(id: u64, record_id: u64, edition: u64) -> WriteBatch {
    WriteBatch::new()
        .with(WriteOp::PutCollection(header(id, edition)))
        .with(WriteOp::PutRecord {
            collection_id: CollectionId::new(id),
            record: record(record_id, edition),
        })
}

// ============================================================================
// Constraint Tests (shared by both stores)
// ============================================================================

#[test]
fn memory_store_applies_batches() {
    let mut store = MemoryStore::new();
    store.commit(create_batch(1, 1)).unwrap();
    store.commit(append_batch(1, 2, 2)).unwrap();

    let image = store.image();
    assert_eq!(
        image.collection_header(CollectionId::new(1)).unwrap().current_edition,
        EditionNumber::new(2)
    );
    assert_eq!(image.record_count(), 2);
    assert!(image.record(CollectionId::new(1), EditionNumber::new(2)).is_some());

    let stats = store.stats();
    assert_eq!(stats.collections, 1);
    assert_eq!(stats.records, 2);
    assert_eq!(stats.batches_committed, 2);
}

enum Violation {
    DuplicateEdition,
    DuplicateRecordId,
    DuplicateTagId,
    DuplicateTagName,
    OrphanRecord,
}

#[test_case(Violation::DuplicateEdition ; "duplicate edition")]
#[test_case(Violation::DuplicateRecordId ; "duplicate record id")]
#[test_case(Violation::DuplicateTagId ; "duplicate tag id")]
#[test_case(Violation::DuplicateTagName ; "duplicate tag name")]
#[test_case(Violation::OrphanRecord ; "record without collection")]
fn rejected_batch_changes_nothing(violation: Violation) {
    let mut store = MemoryStore::new();
    store.commit(create_batch(1, 1)).unwrap();
    store
        .commit(WriteBatch::new().with(WriteOp::PutTag(tag(1, "ANewTag"))))
        .unwrap();
    let before = store.image().clone();

    let batch = match violation {
        Violation::DuplicateEdition => append_batch(1, 2, 1),
        Violation::DuplicateRecordId => append_batch(1, 1, 2),
        Violation::DuplicateTagId => WriteBatch::new().with(WriteOp::PutTag(tag(1, "other"))),
        Violation::DuplicateTagName => WriteBatch::new().with(WriteOp::PutTag(tag(2, "ANewTag"))),
        Violation::OrphanRecord => WriteBatch::new().with(WriteOp::PutRecord {
            collection_id: CollectionId::new(9),
            record: record(5, 1),
        }),
    };

    let err = store.commit(batch).unwrap_err();
    match violation {
        Violation::OrphanRecord => {
            assert!(matches!(err, StoreError::MissingCollection(id) if id == CollectionId::new(9)));
        }
        _ => assert!(err.is_conflict(), "expected conflict, got {err}"),
    }
    assert_eq!(store.image(), &before);
    assert_eq!(store.stats().batches_committed, 2);
}

#[test]
fn conflicts_inside_one_batch_are_detected() {
    let batch = WriteBatch::new()
        .with(WriteOp::PutTag(tag(1, "a")))
        .with(WriteOp::PutTag(tag(2, "a")));

    let err = MemoryStore::new().commit(batch).unwrap_err();
    assert!(err.is_conflict());
}

#[test]
fn header_upsert_is_not_a_conflict() {
    let mut store = MemoryStore::new();
    store.commit(create_batch(1, 1)).unwrap();

    let mut tagged = header(1, 1);
    tagged.tags.insert(TagId::new(3));
    store
        .commit(WriteBatch::new().with(WriteOp::PutCollection(tagged.clone())))
        .unwrap();

    assert_eq!(
        store.image().collection_header(CollectionId::new(1)),
        Some(&tagged)
    );
}

// ============================================================================
// LogStore Tests
// ============================================================================

#[test]
fn log_store_reopen_replays_batches() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut store = LogStore::open(dir.path(), true).unwrap();
        store.commit(create_batch(1, 1)).unwrap();
        store.commit(append_batch(1, 2, 2)).unwrap();
        store
            .commit(WriteBatch::new().with(WriteOp::PutTag(tag(1, "ANewTag"))))
            .unwrap();
    }

    let store = LogStore::open(dir.path(), false).unwrap();
    let image = store.image();
    assert_eq!(image.collection_count(), 1);
    assert_eq!(image.record_count(), 2);
    assert_eq!(image.tag_by_name("ANewTag").map(|t| t.tag_id), Some(TagId::new(1)));
    assert_eq!(store.stats().batches_committed, 3);
}

#[test]
fn log_store_rejected_batch_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = LogStore::open(dir.path(), false).unwrap();
    store.commit(create_batch(1, 1)).unwrap();
    let size = fs::metadata(store.path()).unwrap().len();

    assert!(store.commit(append_batch(1, 2, 1)).is_err());

    assert_eq!(fs::metadata(store.path()).unwrap().len(), size);
}

#[test]
fn log_store_ignores_torn_tail() {
    let dir = tempfile::tempdir().unwrap();
    let path = {
        let mut store = LogStore::open(dir.path(), false).unwrap();
        store.commit(create_batch(1, 1)).unwrap();
        store.path().to_path_buf()
    };
    let committed = fs::metadata(&path).unwrap().len();

    // Simulate a crash in the middle of an append
    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(br#"{"seq":2,"batch":[{"op":"put_tag""#).unwrap();
    drop(file);

    let mut store = LogStore::open(dir.path(), false).unwrap();
    assert_eq!(store.image().collection_count(), 1);
    assert_eq!(fs::metadata(&path).unwrap().len(), committed);

    // The log is appendable again after the cut
    store.commit(append_batch(1, 2, 2)).unwrap();
    drop(store);
    let store = LogStore::open(dir.path(), false).unwrap();
    assert_eq!(store.image().record_count(), 2);
}

#[test]
fn log_store_rejects_corrupt_line() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(LOG_FILENAME), b"not json\n").unwrap();

    let err = LogStore::open(dir.path(), false).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { line: 1, .. }));
}

#[test]
fn log_store_rejects_sequence_gap() {
    let dir = tempfile::tempdir().unwrap();
    let line = crate::log::encode_line(2, WriteBatch::new()).unwrap();
    fs::write(dir.path().join(LOG_FILENAME), line).unwrap();

    let err = LogStore::open(dir.path(), false).unwrap_err();
    assert!(
        matches!(err, StoreError::Corrupt { line: 1, ref reason } if reason.contains("expected batch 1")),
        "unexpected error: {err}"
    );
}

#[test]
fn log_store_detects_altered_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = {
        let mut store = LogStore::open(dir.path(), false).unwrap();
        store.commit(create_batch(1, 1)).unwrap();
        store.commit(append_batch(1, 2, 2)).unwrap();
        store.path().to_path_buf()
    };

    // Flip one character inside a string value of the second batch; the
    // line still decodes
    let contents = fs::read_to_string(&path).unwrap();
    let (first, second) = contents.split_once('\n').unwrap();
    let altered = format!("{first}\n{}", second.replacen("NewDoc.docx", "NewDoc.docy", 1));
    assert_ne!(altered, contents);
    fs::write(&path, altered).unwrap();

    let err = LogStore::open(dir.path(), false).unwrap_err();
    assert!(
        matches!(err, StoreError::Corrupt { line: 2, ref reason } if reason.contains("checksum")),
        "unexpected error: {err}"
    );
}

#[test]
fn log_lines_carry_a_checksum() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = LogStore::open(dir.path(), false).unwrap();
    store.commit(create_batch(1, 1)).unwrap();

    let contents = fs::read_to_string(store.path()).unwrap();
    let entry: serde_json::Value = serde_json::from_str(contents.trim_end()).unwrap();
    assert_eq!(entry["seq"], serde_json::json!(1));
    assert_eq!(entry["checksum"].as_str().map(str::len), Some(64));
}

#[test]
fn log_store_creates_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");

    let store = LogStore::open(&nested, false).unwrap();
    assert!(store.path().starts_with(&nested));
    assert_eq!(store.stats(), StoreStats::default());
}
