//! # archivist-types: Core types for `Archivist`
//!
//! This crate contains the shared vocabulary of the card catalog:
//! - Entity IDs ([`CollectionId`], [`RecordId`], [`TagId`], [`UserId`])
//! - Edition numbering ([`EditionNumber`])
//! - Temporal types ([`Timestamp`])
//! - The closed record type domain ([`RecordType`])
//! - Stored rows ([`Record`], [`CollectionHeader`], [`Tag`])
//! - Validated input ([`RecordDraft`])
//! - Audit actions ([`AuditAction`])
//! - State fingerprints ([`StateHash`])

use std::{
    collections::BTreeSet,
    fmt::{Debug, Display},
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};

// ============================================================================
// Entity IDs - All Copy (cheap 8-byte values)
// ============================================================================

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            pub fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id! {
    /// Unique identifier for a collection (the aggregate of all editions of
    /// one logical document).
    CollectionId
}

entity_id! {
    /// Unique identifier for a single stored record. Never reused.
    RecordId
}

entity_id! {
    /// Unique identifier for a tag in the registry.
    TagId
}

entity_id! {
    /// Identifier of the actor that created or modified an entity.
    UserId
}

/// Position of a record within its collection's edition history.
///
/// Editions are one-indexed and contiguous: the first record of a
/// collection is edition 1, the next appended record is edition 2, and so
/// on. An edition number is never reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditionNumber(u64);

impl EditionNumber {
    /// The edition assigned when a collection is created.
    pub const FIRST: EditionNumber = EditionNumber(1);

    pub fn new(edition: u64) -> Self {
        Self(edition)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the edition that follows this one, or `None` on overflow.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl Display for EditionNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EditionNumber {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<EditionNumber> for u64 {
    fn from(edition: EditionNumber) -> Self {
        edition.0
    }
}

// ============================================================================
// Timestamp - Copy (8-byte value with monotonic guarantee)
// ============================================================================

/// Wall-clock timestamp, stored as nanoseconds since the Unix epoch.
///
/// Creation and modification dates are assigned by the catalog, never by
/// the caller. Monotonic construction keeps the modification date of a
/// collection from moving backwards when the system clock is adjusted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The Unix epoch (1970-01-01 00:00:00 UTC).
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Creates a timestamp from nanoseconds since Unix epoch.
    pub fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Returns the timestamp as nanoseconds since Unix epoch.
    pub fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Returns the timestamp as seconds since Unix epoch (truncates nanoseconds).
    pub fn as_secs(&self) -> u64 {
        self.0 / 1_000_000_000
    }

    /// Returns the sub-second part of the timestamp in nanoseconds.
    pub fn subsec_nanos(&self) -> u32 {
        (self.0 % 1_000_000_000) as u32
    }

    /// Creates a timestamp for the current time.
    ///
    /// A system clock set before the Unix epoch reads as [`Timestamp::EPOCH`].
    pub fn now() -> Self {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| Self(d.as_nanos() as u64))
            .unwrap_or(Self::EPOCH)
    }

    /// Returns `max(self, last + 1ns)`, so a sequence of stamps never
    /// goes backwards even when the clock does.
    pub fn monotonic_after(self, last: Option<Timestamp>) -> Self {
        match last {
            Some(prev) if self.0 <= prev.0 => Timestamp(prev.0.saturating_add(1)),
            _ => self,
        }
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:09}", self.as_secs(), self.subsec_nanos())
    }
}

impl From<u64> for Timestamp {
    fn from(nanos: u64) -> Self {
        Self(nanos)
    }
}

impl From<Timestamp> for u64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

// ============================================================================
// Record Type - Copy (closed enum with wire discriminants)
// ============================================================================

/// The kind of document a record describes.
///
/// The discriminants are part of the wire contract: clients send and
/// receive the integer value, never the variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum RecordType {
    Document = 1,
    Email = 2,
}

impl RecordType {
    /// Every known variant, in discriminant order.
    pub const ALL: [RecordType; 2] = [RecordType::Document, RecordType::Email];

    /// Returns the wire discriminant.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Looks up a variant by its wire discriminant.
    ///
    /// Returns `None` for any value outside the enum's extent.
    pub fn from_i64(value: i64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|variant| i64::from(variant.as_u8()) == value)
    }
}

impl Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Document => write!(f, "DOCUMENT"),
            Self::Email => write!(f, "EMAIL"),
        }
    }
}

impl From<RecordType> for u8 {
    fn from(record_type: RecordType) -> Self {
        record_type.as_u8()
    }
}

impl TryFrom<u8> for RecordType {
    type Error = UnknownRecordType;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_i64(i64::from(value)).ok_or(UnknownRecordType(i64::from(value)))
    }
}

/// Error returned when an integer is not a [`RecordType`] discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownRecordType(pub i64);

impl Display for UnknownRecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown record type {}", self.0)
    }
}

impl std::error::Error for UnknownRecordType {}

// ============================================================================
// Records - Clone (owned strings)
// ============================================================================

/// Caller-supplied description of one edition, after validation.
///
/// A draft has no identity yet: the kernel assigns the record id, the
/// edition number and the creation date when it becomes a [`Record`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDraft {
    pub record_type: RecordType,
    pub title: String,
    pub filename: String,
    pub extension: String,
    pub author: String,
    pub checksum: String,
    pub size: String,
    /// The acting user. Becomes `creation_user` on the record.
    pub user: UserId,
}

/// One immutable edition of a document.
///
/// Records are owned exclusively by one collection. The owning collection
/// id is not stored on the record itself; it is supplied by the owner when
/// the record is persisted or serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub record_id: RecordId,
    pub edition: EditionNumber,
    pub record_type: RecordType,
    pub title: String,
    pub filename: String,
    pub extension: String,
    pub size: String,
    pub author: String,
    pub checksum: String,
    pub creation_date: Timestamp,
    pub creation_user: UserId,
}

impl Record {
    /// Builds a record from a validated draft.
    pub fn from_draft(
        record_id: RecordId,
        edition: EditionNumber,
        draft: RecordDraft,
        creation_date: Timestamp,
    ) -> Self {
        Self {
            record_id,
            edition,
            record_type: draft.record_type,
            title: draft.title,
            filename: draft.filename,
            extension: draft.extension,
            size: draft.size,
            author: draft.author,
            checksum: draft.checksum,
            creation_date,
            creation_user: draft.user,
        }
    }
}

/// The mutable header of a collection, persisted separately from its
/// edition records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionHeader {
    pub collection_id: CollectionId,
    pub current_edition: EditionNumber,
    pub creation_date: Timestamp,
    pub creation_user: UserId,
    pub modified_date: Timestamp,
    pub modified_user: UserId,
    /// Tags associated with this collection.
    #[serde(default)]
    pub tags: BTreeSet<TagId>,
}

// ============================================================================
// Tags
// ============================================================================

/// Maximum length of a tag name, in characters.
pub const TAG_NAME_MAX_LEN: usize = 100;

/// A named label that can be attached to any number of collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub tag_id: TagId,
    /// Unique across the registry, compared case-sensitively.
    pub name: String,
}

// ============================================================================
// Audit Actions - Clone (for flexibility in logging)
// ============================================================================

/// Actions recorded in the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    /// A collection was created together with its first edition.
    CollectionCreated {
        collection_id: CollectionId,
        record_id: RecordId,
        user: UserId,
    },
    /// A new edition was appended to a collection.
    EditionAppended {
        collection_id: CollectionId,
        record_id: RecordId,
        edition: EditionNumber,
        user: UserId,
    },
    /// A tag was added to the registry.
    TagCreated { tag_id: TagId, name: String },
    /// A tag was associated with a collection.
    CollectionTagged {
        collection_id: CollectionId,
        tag_id: TagId,
    },
}

// ============================================================================
// State Hash - Copy (fixed 32-byte value)
// ============================================================================

/// Length of a state hash in bytes (BLAKE3).
pub const STATE_HASH_LENGTH: usize = 32;

/// A deterministic fingerprint of the catalog state.
///
/// Two catalogs holding the same collections, editions and tags have the
/// same state hash, regardless of how they got there.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct StateHash([u8; STATE_HASH_LENGTH]);

impl StateHash {
    pub fn from_bytes(bytes: [u8; STATE_HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; STATE_HASH_LENGTH] {
        &self.0
    }
}

impl Debug for StateHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "StateHash({:02x}{:02x}{:02x}{:02x}...)",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

impl Display for StateHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; STATE_HASH_LENGTH]> for StateHash {
    fn from(bytes: [u8; STATE_HASH_LENGTH]) -> Self {
        Self(bytes)
    }
}
