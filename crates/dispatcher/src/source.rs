//! Work item admission
//!
//! Raw input (a stdin line or one element of an HTTP `messages` array)
//! becomes either a `WorkItem` ready to send, or an already-final failed
//! `Outcome` when it cannot be decoded.

use contracts::{ErrorProjection, Outcome, WorkItem};
use serde_json::Value;

/// Result of admitting one raw input
///
/// `Err` carries the failed outcome for input that never reaches the
/// transport.
pub type Admission = Result<WorkItem, Outcome>;

/// Name given to decode failures in outcomes
pub const PARSE_ERROR: &str = "ParseError";

/// Admit one line of text
///
/// Non-JSON input produces a failed outcome with a `null` id.
pub fn admit_line(line: &str) -> Admission {
    match serde_json::from_str::<Value>(line) {
        Ok(value) => admit_value(value),
        Err(e) => Err(Outcome::failure(
            Value::Null,
            ErrorProjection::from_error(PARSE_ERROR, &e, None),
        )),
    }
}

/// Admit one raw input line
///
/// A trailing `\r` is dropped. Bytes that are not UTF-8 fail like any
/// other undecodable line.
pub fn admit_bytes(raw: &[u8]) -> Admission {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    match std::str::from_utf8(raw) {
        Ok(line) => admit_line(line),
        Err(e) => Err(Outcome::failure(
            Value::Null,
            ErrorProjection::from_error(PARSE_ERROR, &e, None),
        )),
    }
}

/// Admit an already-decoded JSON value
///
/// The id is kept whenever the value is an object carrying one, even if
/// its message is unusable.
pub fn admit_value(value: Value) -> Admission {
    let id = value.get("id").cloned().unwrap_or(Value::Null);
    serde_json::from_value::<WorkItem>(value)
        .map_err(|e| Outcome::failure(id, ErrorProjection::from_error(PARSE_ERROR, &e, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_admit_valid_line() {
        let item = admit_line(r#"{"id":7,"message":{"to":"b@example.com","subject":"s"}}"#).unwrap();
        assert_eq!(item.id, json!(7));
        assert_eq!(item.message.subject.as_deref(), Some("s"));
    }

    #[test]
    fn test_missing_id_is_null() {
        let item = admit_line(r#"{"message":{"subject":"s"}}"#).unwrap();
        assert_eq!(item.id, Value::Null);
    }

    #[test]
    fn test_garbage_line_fails_with_null_id() {
        let outcome = admit_line("not json at all").unwrap_err();
        assert_eq!(outcome.id, Value::Null);
        assert!(!outcome.is_success());

        let err = outcome.result.unwrap_err();
        assert_eq!(err.name(), Some(PARSE_ERROR));
    }

    #[test]
    fn test_blank_line_fails() {
        let outcome = admit_line("").unwrap_err();
        assert_eq!(outcome.id, Value::Null);
        assert!(!outcome.is_success());
        assert!(admit_line("   ").is_err());
    }

    #[test]
    fn test_invalid_utf8_fails_with_null_id() {
        let outcome = admit_bytes(b"\xff\xfe").unwrap_err();
        assert_eq!(outcome.id, Value::Null);
        assert_eq!(outcome.result.unwrap_err().name(), Some(PARSE_ERROR));
    }

    #[test]
    fn test_crlf_line_is_admitted() {
        let item = admit_bytes(b"{\"id\":1,\"message\":{\"subject\":\"s\"}}\r").unwrap();
        assert_eq!(item.id, json!(1));
    }

    #[test]
    fn test_bad_message_keeps_id() {
        let outcome = admit_value(json!({ "id": "abc", "message": 42 })).unwrap_err();
        assert_eq!(outcome.id, json!("abc"));
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_non_object_value_fails() {
        let outcome = admit_value(json!([1, 2, 3])).unwrap_err();
        assert_eq!(outcome.id, Value::Null);
    }
}
