//! Scalar descriptor operations

use serde_json::{Number, Value as JsonValue};

use super::errors::ValidationError;
use super::plain::json_type_name;
use super::types::ScalarKind;
use crate::value::{Decimal, Value};

/// Checks that `value` belongs to `kind`. Non-finite floats are rejected.
pub(super) fn check_kind(
    kind: ScalarKind,
    field: &str,
    value: &Value) -> Result<(), ValidationError> {
    let matches = match (kind, value) {
        (ScalarKind::Float, Value::Float(f)) => {
            if !f.is_finite() {
                return Err(ValidationError::type_mismatch(field, "finite float", value));
            }
            true
        }
        (ScalarKind::String, Value::String(_))
        | (ScalarKind::Integer, Value::Int(_))
        | (ScalarKind::Decimal, Value::Decimal(_))
        | (ScalarKind::Boolean, Value::Bool(_)) => true,
        _ => false,
    };
    if matches {
        Ok(())
    } else {
        Err(ValidationError::type_mismatch(field, kind, value.kind_name()))
    }
}

pub(super) fn to_plain(
    kind: ScalarKind,
    field: &str,
    value: &Value,
) -> Result<JsonValue, ValidationError> {
    check_kind(kind, field, value)?;
    let plain = match value {
        Value::String(s) => JsonValue::String(s.to_string()),
        Value::Int(i) => JsonValue::from(*i),
        Value::Float(f) => Number::from_f64(*f)
            .map(JsonValue::Number)
            .ok_or_else(|| ValidationError::type_mismatch(field, "finite float", value))?,
        Value::Decimal(d) => JsonValue::String(d.to_string()),
        Value::Bool(b) => JsonValue::Bool(*b),
        other => return Err(ValidationError::type_mismatch(field, kind, other.kind_name())),
    };
    Ok(plain)
}

/// Integers are accepted for floats; decimals come as strings or numbers.
pub(super) fn from_plain(
    kind: ScalarKind,
    field: &str,
    plain: &JsonValue,
) -> Result<Value, ValidationError> {
    let mismatch = || ValidationError::type_mismatch(field, kind, json_type_name(plain));
    match kind {
        ScalarKind::String => plain.as_str().map(Value::from).ok_or_else(mismatch),
        ScalarKind::Integer => plain.as_i64().map(Value::Int).ok_or_else(mismatch),
        ScalarKind::Float => plain.as_f64().map(Value::Float).ok_or_else(mismatch),
        ScalarKind::Boolean => plain.as_bool().map(Value::Bool).ok_or_else(mismatch),
        ScalarKind::Decimal => {
            let literal = match plain {
                JsonValue::String(s) => s.clone(),
                JsonValue::Number(n) => n.to_string(),
                _ => return Err(mismatch()),
            };
            literal
                .parse::<Decimal>()
                .map(Value::Decimal)
                .map_err(|_| ValidationError::type_mismatch(field, kind, format!("'{}'", literal)))
        }
    }
}
