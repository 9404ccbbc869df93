//! Tests for the JSON boundary, written against the envelopes clients see.

use archivist::{Catalog, ManualClock, Timestamp};
use serde_json::{Value, json};
use test_case::test_case;

use crate::*;

fn handler() -> RequestHandler {
    let catalog =
        Catalog::in_memory().with_clock(ManualClock::new(Timestamp::from_nanos(1_700_000_000_000_000_000)));
    RequestHandler::new(catalog)
}

fn document(user: u64) -> Value {
    json!({
        "record_type": 1,
        "title": "New Document",
        "filename": "NewDoc.docx",
        "extension": "docx",
        "author": "Me",
        "checksum": "2ee20486d3b51eed3f850139af55c7ea",
        "size": "101kb",
        "user": user
    })
}

fn shelve(handler: &RequestHandler, payload: Value) -> Response {
    handler.handle(Request::CreateCollection { payload })
}

fn as_json(response: &Response) -> Value {
    serde_json::to_value(response).unwrap()
}

// ============================================================================
// Collection Scenarios
// ============================================================================

#[test]
fn shelve_then_append_by_another_user() {
    let handler = handler();

    let created = shelve(&handler, document(1000));
    assert_eq!(as_json(&created), json!({"Ok": true, "collectionid": 1}));

    let fetched = handler.handle(Request::GetCollection { collection_id: 1 });
    let collection = fetched.collection.expect("collection in response");
    assert_eq!(collection.current_edition, 1);
    assert_eq!(collection.creation_user, 1000);
    assert_eq!(collection.modified_user, 1000);
    assert_eq!(collection.edition.edition, 1);

    let appended = handler.handle(Request::AppendEdition {
        collection_id: 1,
        payload: document(2002),
    });
    assert!(appended.ok);
    let collection = appended.collection.expect("collection in response");
    assert_eq!(collection.current_edition, 2);
    assert_eq!(collection.creation_user, 1000);
    assert_eq!(collection.modified_user, 2002);
    assert_eq!(collection.edition.edition, 2);
    assert_eq!(collection.edition.creation_user, 2002);
    assert_eq!(collection.edition.collectionid, 1);
}

#[test]
fn list_editions_round_trips_the_payload() {
    let handler = handler();
    shelve(&handler, document(1000));

    let listed = as_json(&handler.handle(Request::ListEditions { collection_id: 1 }));
    assert_eq!(listed["Ok"], json!(true));
    assert_eq!(listed["collectionid"], json!(1));

    let editions = listed["editions"].as_array().unwrap();
    assert_eq!(editions.len(), 1);

    // Every input field comes back, with user renamed creation_user
    let record = &editions[0];
    let input = document(1000);
    for field in ["record_type", "title", "filename", "extension", "author", "checksum", "size"] {
        assert_eq!(record[field], input[field], "field {field}");
    }
    assert_eq!(record["creation_user"], json!(1000));
    assert!(record.get("user").is_none());
    assert_eq!(record["recordid"], json!(1));
    assert_eq!(record["edition"], json!(1));
}

#[test]
fn record_shape_has_exactly_the_documented_keys() {
    let handler = handler();
    shelve(&handler, document(1000));

    let fetched = as_json(&handler.handle(Request::GetEdition {
        collection_id: 1,
        edition: 1,
    }));
    let mut keys: Vec<&str> = fetched["edition"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort_unstable();

    assert_eq!(
        keys,
        vec![
            "author",
            "checksum",
            "collectionid",
            "creation_date",
            "creation_user",
            "edition",
            "extension",
            "filename",
            "record_type",
            "recordid",
            "size",
            "title",
        ]
    );
}

#[test]
fn dates_are_rfc3339_utc() {
    let handler = handler();
    shelve(&handler, document(1000));

    let fetched = handler.handle(Request::GetCollection { collection_id: 1 });
    let collection = fetched.collection.unwrap();
    assert_eq!(collection.creation_date, "2023-11-14T22:13:20Z");
    assert_eq!(collection.creation_date, collection.modified_date);
}

#[test_case(Request::GetCollection { collection_id: 42 } ; "get")]
#[test_case(Request::AppendEdition { collection_id: 42, payload: document(1) } ; "append")]
#[test_case(Request::ListEditions { collection_id: 42 } ; "list")]
#[test_case(Request::GetEdition { collection_id: 42, edition: 1 } ; "get edition")]
#[test_case(Request::CollectionTags { collection_id: 42 } ; "tags")]
fn unknown_collection(request: Request) {
    let response = handler().handle(request);
    assert_eq!(
        as_json(&response),
        json!({"Ok": false, "ErrMsg": "Unknown collection 42"})
    );
}

#[test]
fn unknown_edition_reports_count() {
    let handler = handler();
    shelve(&handler, document(1000));

    let response = handler.handle(Request::GetEdition {
        collection_id: 1,
        edition: 3,
    });
    assert_eq!(
        as_json(&response),
        json!({"Ok": false, "Count": 1, "ErrMsg": "Unknown edition 3"})
    );
}

#[test]
fn missing_checksum_is_the_only_error() {
    let handler = handler();
    let mut payload = document(1000);
    payload.as_object_mut().unwrap().remove("checksum");

    let response = shelve(&handler, payload);
    assert_eq!(
        as_json(&response),
        json!({"Ok": false, "ErrMsg": ["Missing checksum field"]})
    );
    assert_eq!(handler.catalog().stats().unwrap().collections, 0);
}

#[test]
fn not_a_dictionary() {
    let response = shelve(&handler(), json!(["a", "b"]));
    assert_eq!(
        response.err_msg,
        Some(ErrMsg::Many(vec!["Record data is not a dictionary".into()]))
    );
}

#[test]
fn bad_record_type_on_append() {
    let handler = handler();
    shelve(&handler, document(1000));

    let mut payload = document(5);
    payload["record_type"] = json!("EMAIL");
    let response = handler.handle(Request::AppendEdition {
        collection_id: 1,
        payload,
    });
    assert_eq!(
        response.err_msg.unwrap().messages(),
        vec!["record_type is not valid"]
    );
}

// ============================================================================
// Tag Scenarios
// ============================================================================

#[test]
fn create_same_tag_twice() {
    let handler = handler();

    let first = handler.handle(Request::CreateTag {
        body: json!({"tagName": "ANewTag"}),
    });
    assert_eq!(as_json(&first), json!({"Ok": true, "tagId": 1}));

    let second = handler.handle(Request::CreateTag {
        body: json!({"tagName": "ANewTag"}),
    });
    assert_eq!(
        as_json(&second),
        json!({"Ok": false, "ErrMsg": "Tag ANewTag already exists"})
    );
}

#[test_case(json!({}), "Tag Name is missing from the request" ; "absent")]
#[test_case(json!({"tagName": null}), "Tag Name is missing from the request" ; "null")]
#[test_case(json!(null), "Tag Name is missing from the request" ; "no body")]
#[test_case(json!({"tagName": 12}), "Tag Name is not valid" ; "number")]
#[test_case(json!({"tagName": "x".repeat(101)}), "Tag name exceeds 100 characters" ; "too long")]
fn bad_tag_name(body: Value, message: &str) {
    let response = handler().handle(Request::CreateTag { body });
    assert!(!response.ok);
    assert_eq!(response.err_msg, Some(ErrMsg::One(message.into())));
}

#[test]
fn create_tag_without_body() {
    let response = handler().handle_json(r#"{"op":"create_tag"}"#);
    assert_eq!(
        as_json(&response),
        json!({"Ok": false, "ErrMsg": "Tag Name is missing from the request"})
    );
}

#[test]
fn tag_a_collection_and_list_its_tags() {
    let handler = handler();
    shelve(&handler, document(1000));
    handler.handle(Request::CreateTag {
        body: json!({"tagName": "ANewTag"}),
    });

    let tagged = handler.handle(Request::TagCollection {
        collection_id: 1,
        tag_name: "ANewTag".into(),
    });
    assert!(tagged.ok);

    let listed = as_json(&handler.handle(Request::CollectionTags { collection_id: 1 }));
    assert_eq!(
        listed,
        json!({"Ok": true, "collectionid": 1, "tags": [{"tagid": 1, "name": "ANewTag"}]})
    );
}

#[test]
fn tagging_with_unknown_tag() {
    let handler = handler();
    shelve(&handler, document(1000));

    let response = handler.handle(Request::TagCollection {
        collection_id: 1,
        tag_name: "Nope".into(),
    });
    assert_eq!(response.err_msg, Some(ErrMsg::One("Unknown tag Nope".into())));
}

#[test_case(Request::GetTagById { tag_id: 1 } ; "get by id")]
#[test_case(Request::GetTagByName { tag_name: "a".into() } ; "get by name")]
#[test_case(Request::UpdateTagById { tag_id: 1, body: json!({}) } ; "update by id")]
#[test_case(Request::UpdateTagByName { tag_name: "a".into(), body: json!({}) } ; "update by name")]
#[test_case(Request::DeleteTagById { tag_id: 1 } ; "delete by id")]
#[test_case(Request::DeleteTagByName { tag_name: "a".into() } ; "delete by name")]
fn reserved_tag_routes(request: Request) {
    let response = handler().handle(request);
    assert_eq!(
        as_json(&response),
        json!({"Ok": false, "ErrMsg": "Not Implemented"})
    );
}

// ============================================================================
// JSON Requests
// ============================================================================

#[test]
fn handle_json_decodes_requests() {
    let handler = handler();
    let body = json!({"op": "create_collection", "payload": document(7)}).to_string();

    let response = handler.handle_json(&body);
    assert_eq!(response.collection_id, Some(1));

    let response = handler.handle_json(r#"{"op":"get_edition","collectionid":1,"edition":1}"#);
    assert_eq!(response.edition.map(|e| e.creation_user), Some(7));
}

#[test]
fn handle_json_rejects_garbage() {
    let response = handler().handle_json("{not json");
    assert!(!response.ok);
    let messages = response.err_msg.unwrap();
    assert!(messages.messages()[0].starts_with("Invalid request"));
}

#[test]
fn responses_decode_back() {
    let handler = handler();
    shelve(&handler, document(1000));

    let response = handler.handle(Request::GetCollection { collection_id: 1 });
    let text = response.to_json().unwrap();
    let decoded: Response = serde_json::from_str(&text).unwrap();
    assert_eq!(decoded, response);
}
