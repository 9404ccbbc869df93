//! Error types for the catalog SDK.

use archivist_kernel::KernelError;
use archivist_store::StoreError;
use archivist_types::{CollectionId, EditionNumber};

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors returned by [`crate::Catalog`].
///
/// Display strings are the messages clients see, so they follow the wire
/// contract rather than Rust conventions.
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    /// The record payload failed validation. Carries every message.
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Unknown collection {0}")]
    CollectionNotFound(CollectionId),

    #[error("Unknown edition {edition}")]
    EditionNotFound {
        edition: EditionNumber,
        /// Number of editions the collection does have.
        count: usize,
    },

    #[error("Unknown tag {0}")]
    TagNotFound(String),

    #[error("Tag {0} already exists")]
    TagExists(String),

    #[error("Tag Name is missing from the request")]
    TagNameMissing,

    #[error("Tag Name is not valid")]
    TagNameInvalid,

    #[error("Tag name exceeds {max} characters")]
    TagNameTooLong { max: usize },

    #[error("collection {0} cannot take another edition")]
    EditionOverflow(CollectionId),

    /// The store rejected or failed a commit. Nothing was applied.
    #[error("Error committing record \"{source}\"")]
    Commit { source: StoreError },

    /// The store could not be opened.
    #[error("failed to open store: {0}")]
    Open(#[source] StoreError),

    /// The persisted catalog breaks an invariant.
    #[error("corrupt catalog: {0}")]
    Corrupt(String),

    #[error("Not Implemented")]
    NotImplemented(&'static str),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    pub(crate) fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if resubmitting the same request may succeed.
    ///
    /// Only store conflicts qualify: they mean another writer got there
    /// first. Validation and not-found outcomes never change on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Commit { source } if source.is_conflict())
    }

    /// Returns true for caller-fixable payload problems.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if the error means something the caller named doesn't
    /// exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CollectionNotFound(_) | Self::EditionNotFound { .. } | Self::TagNotFound(_)
        )
    }
}

impl From<KernelError> for CatalogError {
    fn from(e: KernelError) -> Self {
        match e {
            KernelError::CollectionNotFound(id) => Self::CollectionNotFound(id),
            KernelError::EditionOverflow(id) => Self::EditionOverflow(id),
            KernelError::TagNameUniqueConstraint(name) => Self::TagExists(name),
            KernelError::TagNameTooLong { max, .. } => Self::TagNameTooLong { max },
            KernelError::TagNotFound(name) => Self::TagNotFound(name),
            KernelError::CorruptImage(reason) => Self::Corrupt(reason),
        }
    }
}
