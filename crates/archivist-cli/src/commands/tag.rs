//! Tag management commands.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use archivist_wire::Request;
use serde_json::json;

use super::dispatch;

/// Register a new tag.
pub fn create(project_dir: &Path, name: &str) -> Result<ExitCode> {
    dispatch(
        project_dir,
        Request::CreateTag {
            body: json!({ "tagName": name }),
        },
    )
}

/// Attach an existing tag to a collection.
pub fn attach(project_dir: &Path, collection_id: u64, name: &str) -> Result<ExitCode> {
    dispatch(
        project_dir,
        Request::TagCollection {
            collection_id,
            tag_name: name.to_string(),
        },
    )
}

pub fn list(project_dir: &Path, collection_id: u64) -> Result<ExitCode> {
    dispatch(project_dir, Request::CollectionTags { collection_id })
}
