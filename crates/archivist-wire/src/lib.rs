//! # archivist-wire: JSON boundary for `Archivist`
//!
//! Requests and responses are plain JSON. A [`RequestHandler`] routes each
//! [`Request`] to the catalog and always answers with a [`Response`]
//! envelope:
//!
//! ```text
//! {"Ok": true,  "collectionid": 1}
//! {"Ok": false, "ErrMsg": "Unknown collection 7"}
//! {"Ok": false, "ErrMsg": ["Missing checksum field"]}
//! ```
//!
//! The envelope carries the outcome, so a transport in front of the
//! handler answers every request with the same success status.

mod handler;
mod request;
mod response;

pub use handler::{RequestHandler, error_to_response};
pub use request::Request;
pub use response::{CollectionJson, ErrMsg, RecordJson, Response, TagJson, format_date};

/// Errors decoding or encoding wire messages.
#[derive(thiserror::Error, Debug)]
pub enum WireError {
    #[error("Invalid request: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests;
