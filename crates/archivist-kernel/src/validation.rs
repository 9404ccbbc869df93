//! Validation of inbound record payloads.
//!
//! Payloads arrive untyped. Validation is a staged decode: shape, required
//! fields, record type, then the typed fields. Every message produced by a
//! stage is collected so the caller sees all problems at once, except when
//! the payload is not an object at all.

use archivist_types::{RecordDraft, RecordType, UserId};
use serde_json::{Map, Value};

/// Fields every record payload must carry, in reporting order.
pub const REQUIRED_FIELDS: [&str; 8] = [
    "record_type",
    "title",
    "filename",
    "extension",
    "author",
    "checksum",
    "size",
    "user",
];

/// Validates a record payload and decodes it into a [`RecordDraft`].
///
/// On failure returns the non-empty list of messages in the order the
/// checks ran. Pure: no state is read or touched.
pub fn validate_record_payload(payload: &Value) -> Result<RecordDraft, Vec<String>> {
    let Some(fields) = payload.as_object() else {
        return Err(vec!["Record data is not a dictionary".to_string()]);
    };

    let mut errors: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !fields.contains_key(**field))
        .map(|field| format!("Missing {field} field"))
        .collect();

    let record_type = fields
        .get("record_type")
        .and_then(|value| check_record_type(value).map_err(|msg| errors.push(msg)).ok());

    let mut text = |name: &str| -> Option<String> {
        match fields.get(name) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                errors.push(format!("{name} is not valid"));
                None
            }
            None => None,
        }
    };
    let title = text("title");
    let filename = text("filename");
    let extension = text("extension");
    let author = text("author");
    let checksum = text("checksum");
    let size = text("size");

    let user = user_field(fields, &mut errors);

    match (
        record_type,
        title,
        filename,
        extension,
        author,
        checksum,
        size,
        user,
    ) {
        (
            Some(record_type),
            Some(title),
            Some(filename),
            Some(extension),
            Some(author),
            Some(checksum),
            Some(size),
            Some(user),
        ) if errors.is_empty() => Ok(RecordDraft {
            record_type,
            title,
            filename,
            extension,
            author,
            checksum,
            size,
            user,
        }),
        _ => {
            debug_assert!(!errors.is_empty(), "a rejected payload must explain why");
            Err(errors)
        }
    }
}

/// Checks that `value` is an integer naming a known [`RecordType`].
fn check_record_type(value: &Value) -> Result<RecordType, String> {
    // Booleans and floats are not integers
    let Value::Number(number) = value else {
        return Err("record_type is not valid".to_string());
    };

    if let Some(raw) = number.as_i64() {
        RecordType::from_i64(raw).ok_or_else(|| format!("Unknown record type {raw}"))
    } else if let Some(raw) = number.as_u64() {
        Err(format!("Unknown record type {raw}"))
    } else {
        Err("record_type is not valid".to_string())
    }
}

fn user_field(fields: &Map<String, Value>, errors: &mut Vec<String>) -> Option<UserId> {
    let value = fields.get("user")?;
    match value.as_u64() {
        Some(raw) => Some(UserId::new(raw)),
        None => {
            errors.push("user is not valid".to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::*;

    fn payload() -> Value {
        json!({
            "record_type": 1,
            "title": "New Document",
            "filename": "NewDoc.docx",
            "extension": "docx",
            "author": "Me",
            "checksum": "2ee20486d3b51eed3f850139af55c7ea",
            "size": "101kb",
            "user": 1000
        })
    }

    fn without(field: &str) -> Value {
        let mut value = payload();
        value.as_object_mut().map(|map| map.remove(field));
        value
    }

    fn with(field: &str, replacement: Value) -> Value {
        let mut value = payload();
        value[field] = replacement;
        value
    }

    #[test]
    fn valid_payload_decodes() {
        let draft = validate_record_payload(&payload()).unwrap();
        assert_eq!(draft.record_type, RecordType::Document);
        assert_eq!(draft.title, "New Document");
        assert_eq!(draft.user, UserId::new(1000));
    }

    #[test_case(json!([1, 2, 3]) ; "array")]
    #[test_case(json!("record") ; "string")]
    #[test_case(json!(null) ; "null")]
    #[test_case(json!(7) ; "number")]
    fn non_object_stops_immediately(value: Value) {
        assert_eq!(
            validate_record_payload(&value).unwrap_err(),
            vec!["Record data is not a dictionary"]
        );
    }

    #[test_case("record_type")]
    #[test_case("title")]
    #[test_case("filename")]
    #[test_case("extension")]
    #[test_case("author")]
    #[test_case("checksum")]
    #[test_case("size")]
    #[test_case("user")]
    fn single_missing_field(field: &str) {
        assert_eq!(
            validate_record_payload(&without(field)).unwrap_err(),
            vec![format!("Missing {field} field")]
        );
    }

    #[test]
    fn all_missing_fields_reported_in_order() {
        let errors = validate_record_payload(&json!({})).unwrap_err();
        let expected: Vec<String> = REQUIRED_FIELDS
            .iter()
            .map(|field| format!("Missing {field} field"))
            .collect();
        assert_eq!(errors, expected);
    }

    #[test_case(json!("1") ; "string")]
    #[test_case(json!(1.0) ; "float")]
    #[test_case(json!(true) ; "boolean")]
    #[test_case(json!(null) ; "null")]
    fn record_type_not_an_integer(value: Value) {
        assert_eq!(
            validate_record_payload(&with("record_type", value)).unwrap_err(),
            vec!["record_type is not valid"]
        );
    }

    #[test_case(0)]
    #[test_case(3)]
    #[test_case(-4)]
    fn record_type_outside_enum(raw: i64) {
        assert_eq!(
            validate_record_payload(&with("record_type", json!(raw))).unwrap_err(),
            vec![format!("Unknown record type {raw}")]
        );
    }

    #[test]
    fn missing_fields_precede_record_type_message() {
        let mut value = with("record_type", json!(9));
        value.as_object_mut().map(|map| map.remove("title"));

        assert_eq!(
            validate_record_payload(&value).unwrap_err(),
            vec!["Missing title field", "Unknown record type 9"]
        );
    }

    #[test_case("title", json!(42) ; "numeric title")]
    #[test_case("size", json!(101) ; "numeric size")]
    #[test_case("user", json!(-1) ; "negative user")]
    #[test_case("user", json!("1000") ; "string user")]
    #[test_case("user", json!(true) ; "boolean user")]
    fn mistyped_field(field: &str, value: Value) {
        assert_eq!(
            validate_record_payload(&with(field, value)).unwrap_err(),
            vec![format!("{field} is not valid")]
        );
    }

    #[test]
    fn extra_fields_are_ignored() {
        let value = with("notes", json!("ignored"));
        assert!(validate_record_payload(&value).is_ok());
    }
}
