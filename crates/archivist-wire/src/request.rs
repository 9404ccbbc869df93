//! Requests accepted at the catalog boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::WireError;

/// A request to the catalog.
///
/// Record payloads and tag bodies stay untyped: the catalog validates them
/// and reports every problem, which a typed decode here would hide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Shelve a new collection with its first edition.
    CreateCollection { payload: Value },

    GetCollection {
        #[serde(rename = "collectionid")]
        collection_id: u64,
    },

    /// Shelve the next edition of a collection.
    AppendEdition {
        #[serde(rename = "collectionid")]
        collection_id: u64,
        payload: Value,
    },

    ListEditions {
        #[serde(rename = "collectionid")]
        collection_id: u64,
    },

    GetEdition {
        #[serde(rename = "collectionid")]
        collection_id: u64,
        edition: u64,
    },

    /// Register a tag. The body carries `tagName`; a missing body decodes
    /// as null.
    CreateTag {
        #[serde(default)]
        body: Value,
    },

    TagCollection {
        #[serde(rename = "collectionid")]
        collection_id: u64,
        #[serde(rename = "tagName")]
        tag_name: String,
    },

    CollectionTags {
        #[serde(rename = "collectionid")]
        collection_id: u64,
    },

    // Reserved tag routes, answered with "Not Implemented"
    GetTagById {
        #[serde(rename = "tagid")]
        tag_id: u64,
    },
    GetTagByName {
        #[serde(rename = "tagName")]
        tag_name: String,
    },
    UpdateTagById {
        #[serde(rename = "tagid")]
        tag_id: u64,
        #[serde(default)]
        body: Value,
    },
    UpdateTagByName {
        #[serde(rename = "tagName")]
        tag_name: String,
        #[serde(default)]
        body: Value,
    },
    DeleteTagById {
        #[serde(rename = "tagid")]
        tag_id: u64,
    },
    DeleteTagByName {
        #[serde(rename = "tagName")]
        tag_name: String,
    },
}

impl Request {
    /// Decodes a request from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, WireError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Operation name, used as a log field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateCollection { .. } => "create_collection",
            Self::GetCollection { .. } => "get_collection",
            Self::AppendEdition { .. } => "append_edition",
            Self::ListEditions { .. } => "list_editions",
            Self::GetEdition { .. } => "get_edition",
            Self::CreateTag { .. } => "create_tag",
            Self::TagCollection { .. } => "tag_collection",
            Self::CollectionTags { .. } => "collection_tags",
            Self::GetTagById { .. } => "get_tag_by_id",
            Self::GetTagByName { .. } => "get_tag_by_name",
            Self::UpdateTagById { .. } => "update_tag_by_id",
            Self::UpdateTagByName { .. } => "update_tag_by_name",
            Self::DeleteTagById { .. } => "delete_tag_by_id",
            Self::DeleteTagByName { .. } => "delete_tag_by_name",
        }
    }
}
