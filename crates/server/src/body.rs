//! Request body decoding
//!
//! Bodies are JSON only when the content type says so; anything else is
//! treated as an empty object and then fails shape validation.

use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use bytes::Bytes;
use config_loader::AccountSource;
use contracts::MessagePayload;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// `application/json` or any `+json` media type
pub fn is_json(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Decode the raw body into a JSON value
///
/// # Errors
/// `BadRequest` for a JSON content type with malformed content.
pub fn decode_json(headers: &HeaderMap, body: &Bytes) -> Result<Value, ApiError> {
    if !is_json(headers) || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body).map_err(|e| ApiError::bad_request(format!("malformed JSON: {e}")))
}

/// Body of `POST /api/send`
#[derive(Debug)]
pub struct SendRequest {
    pub account: AccountSource,
    pub message: MessagePayload,
}

impl SendRequest {
    pub fn decode(body: Value) -> Result<Self, ApiError> {
        let mut body = into_object(body)?;
        let message = take_present(&mut body, "message")
            .ok_or_else(|| ApiError::bad_request("message is required"))?;
        let account = account_source(&mut body)?;
        let message = serde_json::from_value(message)
            .map_err(|e| ApiError::bad_request(format!("invalid message: {e}")))?;
        Ok(Self {
            account,
            message,
        })
    }
}

/// Body of `POST /api/bulk`
#[derive(Debug)]
pub struct BulkRequest {
    pub account: AccountSource,
    /// Raw elements; each one is admitted on its own
    pub messages: Vec<Value>,
}

impl BulkRequest {
    pub fn decode(body: Value) -> Result<Self, ApiError> {
        let mut body = into_object(body)?;
        let Some(Value::Array(messages)) = body.remove("messages") else {
            return Err(ApiError::bad_request("messages is required"));
        };
        let account = account_source(&mut body)?;
        Ok(Self {
            account,
            messages,
        })
    }
}

fn into_object(body: Value) -> Result<Map<String, Value>, ApiError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::bad_request("non-object body")),
    }
}

fn take_present(body: &mut Map<String, Value>, key: &str) -> Option<Value> {
    body.remove(key).filter(|v| !v.is_null())
}

/// `test: true` wins over any `account`
fn account_source(body: &mut Map<String, Value>) -> Result<AccountSource, ApiError> {
    if body.get("test") == Some(&Value::Bool(true)) {
        return Ok(AccountSource::Test);
    }
    take_present(body, "account")
        .map(AccountSource::Inline)
        .ok_or_else(|| ApiError::bad_request("account or test is required"))
}
