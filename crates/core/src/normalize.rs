//! Tolerant readers for the backend's inconsistent response envelopes.
//!
//! Lists arrive bare (`[...]`), wrapped (`{"data": [...]}`), or nested
//! (`{"data": {"subjects": [...]}}`). Error bodies carry their text under
//! `message`, `error`, or `warning`.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::CoreError;
use crate::types::DbId;

/// Envelope keys tried, in order, when looking for a list.
pub const DEFAULT_LIST_KEYS: &[&str] = &["data", "rows", "subjects", "items"];

/// Shown when an error body has no usable text.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

const ERROR_TEXT_KEYS: &[&str] = &["message", "error", "warning"];

/// Locate the list inside `value` and deserialize it.
pub fn try_normalize_list<T: DeserializeOwned>(
    value: Value,
    keys: &[&str],
) -> Result<Vec<T>, CoreError> {
    let items = find_list(value, keys)
        .ok_or_else(|| CoreError::Validation("response contains no list".into()))?;
    serde_json::from_value(Value::Array(items))
        .map_err(|e| CoreError::Validation(format!("unexpected list item shape: {e}")))
}

/// Like [`try_normalize_list`] but any mismatch yields an empty list.
pub fn normalize_list<T: DeserializeOwned>(value: Value, keys: &[&str]) -> Vec<T> {
    try_normalize_list(value, keys).unwrap_or_default()
}

fn find_list(value: Value, keys: &[&str]) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => {
            for key in keys {
                if let Some(found) = map.remove(*key).and_then(|inner| find_list(inner, keys)) {
                    return Some(found);
                }
            }
            None
        }
        _ => None,
    }
}

/// Human-readable text from an error body, if any.
pub fn extract_error_message(body: &Value) -> Option<String> {
    for key in ERROR_TEXT_KEYS {
        match body.get(*key) {
            Some(Value::String(text)) if !text.trim().is_empty() => return Some(text.clone()),
            Some(nested @ Value::Object(_)) => {
                if let Some(text) = extract_error_message(nested) {
                    return Some(text);
                }
            }
            _ => {}
        }
    }
    None
}

/// [`extract_error_message`] with the generic fallback.
pub fn error_message_or_default(body: Option<&Value>) -> String {
    body.and_then(extract_error_message)
        .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string())
}

/// Record id from a create/update response: `{id}`, `{data: {id}}`, or
/// `{record: {id}}`. Numeric strings are accepted.
pub fn extract_record_id(body: &Value) -> Option<DbId> {
    let read = |v: &Value| match v.get("id")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    };
    read(body)
        .or_else(|| body.get("data").and_then(read))
        .or_else(|| body.get("record").and_then(read))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::types::Period;

    // -----------------------------------------------------------------------
    // Lists
    // -----------------------------------------------------------------------

    #[test]
    fn bare_array() {
        let periods: Vec<Period> =
            normalize_list(json!([{ "id": 1, "period_name": "I" }]), DEFAULT_LIST_KEYS);
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].period_name, "I");
    }

    #[test]
    fn data_envelope() {
        let periods: Vec<Period> =
            normalize_list(json!({ "data": [{ "id": 1 }, { "id": 2 }] }), DEFAULT_LIST_KEYS);
        assert_eq!(periods.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn nested_subjects_envelope() {
        let periods: Vec<Period> = normalize_list(
            json!({ "data": { "subjects": [{ "id": 3 }] } }),
            DEFAULT_LIST_KEYS,
        );
        assert_eq!(periods[0].id, 3);
    }

    #[test]
    fn falls_through_to_later_keys() {
        let periods: Vec<Period> = normalize_list(
            json!({ "data": null, "rows": [{ "id": 4 }] }),
            DEFAULT_LIST_KEYS,
        );
        assert_eq!(periods[0].id, 4);
    }

    #[test]
    fn mismatch_defaults_to_empty() {
        let none: Vec<Period> = normalize_list(json!({ "status": "ok" }), DEFAULT_LIST_KEYS);
        assert!(none.is_empty());

        let bad_items: Vec<Period> = normalize_list(json!([{ "name": "x" }]), DEFAULT_LIST_KEYS);
        assert!(bad_items.is_empty());

        assert_matches!(
            try_normalize_list::<Period>(json!("text"), DEFAULT_LIST_KEYS),
            Err(CoreError::Validation(_))
        );
    }

    // -----------------------------------------------------------------------
    // Error text
    // -----------------------------------------------------------------------

    #[test]
    fn error_text_prefers_message_then_error_then_warning() {
        let body = json!({ "warning": "w", "error": "e", "message": "m" });
        assert_eq!(extract_error_message(&body).as_deref(), Some("m"));

        let body = json!({ "warning": "Teacher already booked" });
        assert_eq!(
            extract_error_message(&body).as_deref(),
            Some("Teacher already booked")
        );

        let body = json!({ "error": { "message": "nested" } });
        assert_eq!(extract_error_message(&body).as_deref(), Some("nested"));
    }

    #[test]
    fn error_text_falls_back_to_generic() {
        assert_eq!(error_message_or_default(None), GENERIC_ERROR_MESSAGE);
        assert_eq!(
            error_message_or_default(Some(&json!({ "message": "  " }))),
            GENERIC_ERROR_MESSAGE
        );
    }

    // -----------------------------------------------------------------------
    // Record ids
    // -----------------------------------------------------------------------

    #[test]
    fn record_id_shapes() {
        assert_eq!(extract_record_id(&json!({ "id": 99 })), Some(99));
        assert_eq!(extract_record_id(&json!({ "data": { "id": "12" } })), Some(12));
        assert_eq!(extract_record_id(&json!({ "record": { "id": 5 } })), Some(5));
        assert_eq!(extract_record_id(&json!({ "ok": true })), None);
    }
}
