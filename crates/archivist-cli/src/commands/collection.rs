//! Collection commands.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use archivist_wire::Request;

use super::{dispatch, parse_payload};

/// Shelve a new collection.
pub fn shelve(project_dir: &Path, payload: &str) -> Result<ExitCode> {
    let payload = parse_payload(payload)?;
    dispatch(project_dir, Request::CreateCollection { payload })
}

pub fn show(project_dir: &Path, collection_id: u64) -> Result<ExitCode> {
    dispatch(project_dir, Request::GetCollection { collection_id })
}

/// Shelve the next edition of an existing collection.
pub fn add_edition(project_dir: &Path, collection_id: u64, payload: &str) -> Result<ExitCode> {
    let payload = parse_payload(payload)?;
    dispatch(
        project_dir,
        Request::AppendEdition {
            collection_id,
            payload,
        },
    )
}

pub fn editions(project_dir: &Path, collection_id: u64) -> Result<ExitCode> {
    dispatch(project_dir, Request::ListEditions { collection_id })
}

pub fn edition(project_dir: &Path, collection_id: u64, edition: u64) -> Result<ExitCode> {
    dispatch(
        project_dir,
        Request::GetEdition {
            collection_id,
            edition,
        },
    )
}
