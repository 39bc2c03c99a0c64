//! Request body module
//!
//! Parses a buffered request body according to its declared content type.
//! Parse failures never fail the request; they are logged and yield `None`.

use crate::logger;
use serde_json::{Map, Value};

const JSON: &str = "application/json";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Parse `raw` as declared by `content_type`
///
/// Supports `application/json` and `application/x-www-form-urlencoded`.
/// Unknown or absent content types and empty bodies yield `None`.
pub fn read_body(content_type: Option<&str>, raw: &[u8], request_id: u64) -> Option<Value> {
    if raw.is_empty() {
        return None;
    }

    match content_type.map(essence).as_deref() {
        Some(JSON) => match serde_json::from_slice(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                logger::log_body_parse_error(request_id, &e);
                None
            }
        },
        Some(FORM_URLENCODED) => Some(parse_form(raw)),
        _ => None,
    }
}

/// Media type without parameters, lowercased
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn parse_form(raw: &[u8]) -> Value {
    let map: Map<String, Value> = url::form_urlencoded::parse(raw)
        .into_owned()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();
    Value::Object(map)
}
