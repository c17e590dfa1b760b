//! Structure and polymorphic-structure descriptor operations
//!
//! A record matches a record type only when it is an instance of exactly
//! that type. A subtype instance carries fields its parent cannot read back,
//! so it never stands in for the parent. Polymorphic dispatch is two-phase:
//! match the value against every candidate, then act on the single match.

use serde_json::Value as JsonValue;

use super::errors::ValidationError;
use super::plain::{json_type_name, TYPE_ID_KEY};
use crate::record::{Record, RecordType};
use crate::value::Value;

fn expect_record<'a>(
    record_type: &RecordType,
    field: &str,
    value: &'a Value,
) -> Result<&'a Record, ValidationError> {
    match value {
        Value::Record(record) if record.record_type().same_type(record_type) => Ok(record),
        Value::Record(record) => Err(ValidationError::type_mismatch(
            field,
            record_type.name(),
            record.record_type().name(),
        )),
        other => Err(ValidationError::type_mismatch(field, record_type.name(), other.kind_name())),
    }
}

pub(super) fn validate_structure(
    record_type: &RecordType,
    field: &str,
    value: &Value,
) -> Result<(), ValidationError> {
    expect_record(record_type, field, value).map(|_| ())
}

/// Finds the single candidate matching `value`.
///
/// Zero matches is `NO_MATCHING_TYPE`, more than one is `AMBIGUOUS_TYPE`.
/// `Descriptor::polymorphic` rejects a type listed twice, so the second
/// case only guards candidate lists built some other way.
pub(super) fn match_candidate<'c, 'v>(
    candidates: &'c [(String, RecordType)],
    field: &str,
    value: &'v Value,
) -> Result<(&'c str, &'v Record), ValidationError> {
    let record = value
        .as_record()
        .ok_or_else(|| ValidationError::no_match(field, value.kind_name()))?;

    let matched: Vec<&str> = candidates
        .iter()
        .filter(|(_, record_type)| record.record_type().same_type(record_type))
        .map(|(id, _)| id.as_str())
        .collect();

    match matched.as_slice() {
        [] => Err(ValidationError::no_match(field, record.record_type().name())),
        [id] => Ok((*id, record)),
        ids => Err(ValidationError::ambiguous(field, record.record_type().name(), ids)),
    }
}

pub(super) fn structure_to_plain(
    record_type: &RecordType,
    field: &str,
    value: &Value,
) -> Result<JsonValue, ValidationError> {
    expect_record(record_type, field, value)?
        .serialize()
        .map_err(|e| e.nested_under(field))
}

/// Serializes the matching candidate and tags it with its id.
pub(super) fn polymorphic_to_plain(
    candidates: &[(String, RecordType)],
    field: &str,
    value: &Value,
) -> Result<JsonValue, ValidationError> {
    let (id, record) = match_candidate(candidates, field, value)?;
    record.serialize_as(id).map_err(|e| e.nested_under(field))
}

pub(super) fn structure_from_plain(
    record_type: &RecordType,
    field: &str,
    plain: &JsonValue,
) -> Result<Value, ValidationError> {
    record_type
        .deserialize(plain)
        .map(Value::Record)
        .map_err(|e| e.nested_under(field))
}

/// Reads the discriminant and dispatches to that candidate's record type.
pub(super) fn polymorphic_from_plain(
    candidates: &[(String, RecordType)],
    field: &str,
    plain: &JsonValue,
) -> Result<Value, ValidationError> {
    let object = plain
        .as_object()
        .ok_or_else(|| ValidationError::type_mismatch(field, "object", json_type_name(plain)))?;

    let id = match object.get(TYPE_ID_KEY) {
        Some(JsonValue::String(id)) => id.as_str(),
        Some(other) => {
            return Err(ValidationError::unknown_type_id(field, Some(other.to_string().as_str())))
        }
        None => return Err(ValidationError::unknown_type_id(field, None)),
    };
    let (_, record_type) = candidates
        .iter()
        .find(|(candidate, _)| candidate == id)
        .ok_or_else(|| ValidationError::unknown_type_id(field, Some(id)))?;

    structure_from_plain(record_type, field, plain)
}
