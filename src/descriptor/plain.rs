//! Helpers for the plain (JSON-compatible) form

use serde_json::Value as JsonValue;

use super::errors::ValidationError;
use super::types::Descriptor;
use crate::value::Value;

/// Reserved key carrying the discriminant id of a polymorphic structure.
pub const TYPE_ID_KEY: &str = "__type_id";

/// Returns the JSON type name for error messages.
pub(crate) fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "integer"
            } else {
                "float"
            }
        }
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Turns a serialized map key into an object key.
///
/// String keys are used as-is, anything else is written as JSON text.
pub(super) fn key_to_string(plain: JsonValue) -> String {
    match plain {
        JsonValue::String(s) => s,
        other => other.to_string(),
    }
}

/// Inverse of [`key_to_string`]: the raw string is tried first, then its
/// JSON parse.
pub(super) fn key_from_string(
    key: &Descriptor,
    field: &str,
    raw: &str,
) -> Result<Value, ValidationError> {
    let first = key.deserialize(field, &JsonValue::String(raw.to_string()));
    if first.is_ok() {
        return first;
    }
    match serde_json::from_str::<JsonValue>(raw) {
        Ok(parsed) if !parsed.is_string() => key.deserialize(field, &parsed).or(first),
        _ => first,
    }
}
