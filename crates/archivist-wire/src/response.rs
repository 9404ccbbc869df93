//! Response envelopes and the JSON shapes of catalog entities.
//!
//! Every response is an object with an `Ok` flag. Failures carry `ErrMsg`,
//! either one message or, for payload validation, the full list.

use archivist::{CollectionView, RecordView, Tag, Timestamp};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::WireError;

/// Error message(s) of a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrMsg {
    One(String),
    Many(Vec<String>),
}

impl ErrMsg {
    /// Returns the messages as a list.
    pub fn messages(&self) -> Vec<&str> {
        match self {
            Self::One(msg) => vec![msg.as_str()],
            Self::Many(msgs) => msgs.iter().map(String::as_str).collect(),
        }
    }
}

/// The response envelope. Absent fields are omitted from the JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "Ok")]
    pub ok: bool,

    #[serde(rename = "ErrMsg", default, skip_serializing_if = "Option::is_none")]
    pub err_msg: Option<ErrMsg>,

    /// Edition count, reported when a requested edition doesn't exist.
    #[serde(rename = "Count", default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,

    #[serde(rename = "collectionid", default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<CollectionJson>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editions: Option<Vec<RecordJson>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edition: Option<RecordJson>,

    #[serde(rename = "tagId", default, skip_serializing_if = "Option::is_none")]
    pub tag_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<TagJson>>,
}

impl Response {
    /// A successful response with no payload.
    pub fn success() -> Self {
        Self {
            ok: true,
            ..Self::default()
        }
    }

    /// A failed response.
    pub fn failure(err_msg: ErrMsg) -> Self {
        Self {
            ok: false,
            err_msg: Some(err_msg),
            ..Self::default()
        }
    }

    pub fn to_json(&self) -> Result<String, WireError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, WireError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ============================================================================
// Entity Shapes
// ============================================================================

/// A serialized edition record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordJson {
    pub recordid: u64,
    pub collectionid: u64,
    pub edition: u64,
    pub record_type: u8,
    pub title: String,
    pub filename: String,
    pub extension: String,
    pub size: String,
    pub author: String,
    pub checksum: String,
    pub creation_date: String,
    pub creation_user: u64,
}

impl From<&RecordView> for RecordJson {
    fn from(view: &RecordView) -> Self {
        let record = &view.record;
        Self {
            recordid: record.record_id.as_u64(),
            collectionid: view.collection_id.as_u64(),
            edition: record.edition.as_u64(),
            record_type: record.record_type.as_u8(),
            title: record.title.clone(),
            filename: record.filename.clone(),
            extension: record.extension.clone(),
            size: record.size.clone(),
            author: record.author.clone(),
            checksum: record.checksum.clone(),
            creation_date: format_date(record.creation_date),
            creation_user: record.creation_user.as_u64(),
        }
    }
}

/// A serialized collection header with its current edition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionJson {
    pub collectionid: u64,
    pub current_edition: u64,
    pub creation_date: String,
    pub creation_user: u64,
    pub modified_date: String,
    pub modified_user: u64,
    pub edition: RecordJson,
}

impl From<&CollectionView> for CollectionJson {
    fn from(view: &CollectionView) -> Self {
        let header = &view.header;
        Self {
            collectionid: header.collection_id.as_u64(),
            current_edition: header.current_edition.as_u64(),
            creation_date: format_date(header.creation_date),
            creation_user: header.creation_user.as_u64(),
            modified_date: format_date(header.modified_date),
            modified_user: header.modified_user.as_u64(),
            edition: RecordJson::from(&view.edition),
        }
    }
}

/// A serialized tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagJson {
    pub tagid: u64,
    pub name: String,
}

impl From<&Tag> for TagJson {
    fn from(tag: &Tag) -> Self {
        Self {
            tagid: tag.tag_id.as_u64(),
            name: tag.name.clone(),
        }
    }
}

/// Formats a timestamp as an RFC 3339 UTC string.
pub fn format_date(ts: Timestamp) -> String {
    let secs = i64::try_from(ts.as_secs()).unwrap_or(i64::MAX);
    DateTime::<Utc>::from_timestamp(secs, ts.subsec_nanos())
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
        .to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
