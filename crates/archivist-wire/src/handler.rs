//! Request handler.

use archivist::{
    Catalog, CatalogError, CatalogStore, CollectionId, EditionNumber, MemoryStore, RecordView,
};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::request::Request;
use crate::response::{CollectionJson, ErrMsg, RecordJson, Response, TagJson};

/// Handles requests by routing them to the appropriate catalog operations.
///
/// Never fails: every outcome, including errors, is an envelope.
pub struct RequestHandler<S: CatalogStore = MemoryStore> {
    catalog: Catalog<S>,
}

impl<S: CatalogStore> RequestHandler<S> {
    pub fn new(catalog: Catalog<S>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog<S> {
        &self.catalog
    }

    /// Handles a request.
    #[instrument(skip_all, fields(op))]
    pub fn handle(&self, request: Request) -> Response {
        tracing::Span::current().record("op", request.name());

        match self.handle_inner(request) {
            Ok(response) => response,
            Err(e) => {
                match &e {
                    CatalogError::Commit { .. }
                    | CatalogError::Corrupt(_)
                    | CatalogError::Internal(_)
                    | CatalogError::Open(_) => warn!(error = %e, "request failed"),
                    _ => debug!(error = %e, "request rejected"),
                }
                error_to_response(&e)
            }
        }
    }

    /// Decodes and handles a JSON request.
    pub fn handle_json(&self, json: &str) -> Response {
        match Request::from_json(json) {
            Ok(request) => self.handle(request),
            Err(e) => Response::failure(ErrMsg::One(e.to_string())),
        }
    }

    fn handle_inner(&self, request: Request) -> Result<Response, CatalogError> {
        match request {
            // ================================================================
            // Collections
            // ================================================================
            Request::CreateCollection { payload } => {
                let id = self.catalog.create_collection(&payload)?;
                Ok(Response {
                    collection_id: Some(id.as_u64()),
                    ..Response::success()
                })
            }

            Request::GetCollection { collection_id } => {
                let view = self.catalog.get_collection(CollectionId::new(collection_id))?;
                Ok(Response {
                    collection: Some(CollectionJson::from(&view)),
                    ..Response::success()
                })
            }

            Request::AppendEdition {
                collection_id,
                payload,
            } => {
                let view = self
                    .catalog
                    .append_edition(CollectionId::new(collection_id), &payload)?;
                Ok(Response {
                    collection: Some(CollectionJson::from(&view)),
                    ..Response::success()
                })
            }

            Request::ListEditions { collection_id } => {
                let editions = self
                    .catalog
                    .list_editions(CollectionId::new(collection_id))?;
                Ok(Response {
                    collection_id: Some(collection_id),
                    editions: Some(editions.iter().map(RecordJson::from).collect()),
                    ..Response::success()
                })
            }

            Request::GetEdition {
                collection_id,
                edition,
            } => {
                let view: RecordView = self
                    .catalog
                    .get_edition(CollectionId::new(collection_id), EditionNumber::new(edition))?;
                Ok(Response {
                    collection_id: Some(collection_id),
                    edition: Some(RecordJson::from(&view)),
                    ..Response::success()
                })
            }

            // ================================================================
            // Tags
            // ================================================================
            Request::CreateTag { body } => {
                let name = tag_name(&body)?;
                let tag_id = self.catalog.create_tag(name)?;
                Ok(Response {
                    tag_id: Some(tag_id.as_u64()),
                    ..Response::success()
                })
            }

            Request::TagCollection {
                collection_id,
                tag_name,
            } => {
                self.catalog
                    .tag_collection(CollectionId::new(collection_id), &tag_name)?;
                Ok(Response {
                    collection_id: Some(collection_id),
                    ..Response::success()
                })
            }

            Request::CollectionTags { collection_id } => {
                let tags = self
                    .catalog
                    .collection_tags(CollectionId::new(collection_id))?;
                Ok(Response {
                    collection_id: Some(collection_id),
                    tags: Some(tags.iter().map(TagJson::from).collect()),
                    ..Response::success()
                })
            }

            Request::GetTagById { .. } => Err(CatalogError::NotImplemented("get_tag_by_id")),
            Request::GetTagByName { .. } => Err(CatalogError::NotImplemented("get_tag_by_name")),
            Request::UpdateTagById { .. } => {
                Err(CatalogError::NotImplemented("update_tag_by_id"))
            }
            Request::UpdateTagByName { .. } => {
                Err(CatalogError::NotImplemented("update_tag_by_name"))
            }
            Request::DeleteTagById { .. } => {
                Err(CatalogError::NotImplemented("delete_tag_by_id"))
            }
            Request::DeleteTagByName { .. } => {
                Err(CatalogError::NotImplemented("delete_tag_by_name"))
            }
        }
    }
}

/// Extracts `tagName` from a create-tag body.
fn tag_name(body: &Value) -> Result<&str, CatalogError> {
    match body.get("tagName") {
        None | Some(Value::Null) => Err(CatalogError::TagNameMissing),
        Some(Value::String(name)) => Ok(name),
        Some(_) => Err(CatalogError::TagNameInvalid),
    }
}

/// Converts a catalog error into a failure envelope.
///
/// Validation failures list every message; everything else reports its
/// single message.
pub fn error_to_response(error: &CatalogError) -> Response {
    match error {
        CatalogError::Validation(messages) => Response::failure(ErrMsg::Many(messages.clone())),
        CatalogError::EditionNotFound { count, .. } => Response {
            count: Some(*count),
            ..Response::failure(ErrMsg::One(error.to_string()))
        },
        _ => Response::failure(ErrMsg::One(error.to_string())),
    }
}
