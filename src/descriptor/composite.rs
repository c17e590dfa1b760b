//! Array, map and tuple descriptor operations
//!
//! Every element is checked; the first failing element is reported with
//! its position (`field[i]`) or key (`field[key]`).

use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};

use super::errors::{entry_path, index_path, ValidationError};
use super::plain::{json_type_name, key_from_string, key_to_string};
use super::types::Descriptor;
use crate::value::{Value, ValueMap};

fn sequence<'a>(
    expected: &str,
    field: &str,
    value: &'a Value,
) -> Result<&'a [Value], ValidationError> {
    value
        .as_array()
        .ok_or_else(|| ValidationError::type_mismatch(field, expected, value.kind_name()))
}

fn map_of<'a>(field: &str, value: &'a Value) -> Result<&'a ValueMap, ValidationError> {
    value
        .as_map()
        .ok_or_else(|| ValidationError::type_mismatch(field, "map", value.kind_name()))
}

fn check_arity(elements: &[Descriptor], field: &str, len: usize) -> Result<(), ValidationError> {
    if len != elements.len() {
        return Err(ValidationError::arity_mismatch(field, elements.len(), len));
    }
    Ok(())
}

pub(super) fn validate_array(
    element: &Descriptor,
    field: &str,
    value: &Value) -> Result<(), ValidationError> {
    for (i, item) in sequence("array", field, value)?.iter().enumerate() {
        element.validate(&index_path(field, i), item)?;
    }
    Ok(())
}

pub(super) fn validate_map(
    key: &Descriptor,
    val: &Descriptor,
    field: &str,
    value: &Value,
) -> Result<(), ValidationError> {
    for (k, v) in map_of(field, value)?.iter() {
        let path = entry_path(field, k);
        key.validate(&path, k)?;
        val.validate(&path, v)?;
    }
    Ok(())
}

/// Arity is checked before any position.
pub(super) fn validate_tuple(
    elements: &[Descriptor],
    field: &str,
    value: &Value) -> Result<(), ValidationError> {
    let items = sequence("tuple", field, value)?;
    check_arity(elements, field, items.len())?;
    for (i, (element, item)) in elements.iter().zip(items.iter()).enumerate() {
        element.validate(&index_path(field, i), item)?;
    }
    Ok(())
}

pub(super) fn array_to_plain(
    element: &Descriptor,
    field: &str,
    value: &Value,
) -> Result<JsonValue, ValidationError> {
    sequence("array", field, value)?
        .iter()
        .enumerate()
        .map(|(i, item)| element.serialize(&index_path(field, i), item))
        .collect::<Result<Vec<_>, _>>()
        .map(JsonValue::Array)
}

pub(super) fn map_to_plain(
    key: &Descriptor,
    val: &Descriptor,
    field: &str,
    value: &Value,
) -> Result<JsonValue, ValidationError> {
    let mut object = Map::new();
    for (k, v) in map_of(field, value)?.iter() {
        let path = entry_path(field, k);
        let plain_key = key_to_string(key.serialize(&path, k)?);
        object.insert(plain_key, val.serialize(&path, v)?);
    }
    Ok(JsonValue::Object(object))
}

pub(super) fn tuple_to_plain(
    elements: &[Descriptor],
    field: &str,
    value: &Value,
) -> Result<JsonValue, ValidationError> {
    let items = sequence("tuple", field, value)?;
    check_arity(elements, field, items.len())?;
    elements
        .iter()
        .zip(items.iter())
        .enumerate()
        .map(|(i, (element, item))| element.serialize(&index_path(field, i), item))
        .collect::<Result<Vec<_>, _>>()
        .map(JsonValue::Array)
}

fn plain_sequence<'a>(
    expected: &str,
    field: &str,
    plain: &'a JsonValue,
) -> Result<&'a Vec<JsonValue>, ValidationError> {
    plain
        .as_array()
        .ok_or_else(|| ValidationError::type_mismatch(field, expected, json_type_name(plain)))
}

pub(super) fn array_from_plain(
    element: &Descriptor,
    field: &str,
    plain: &JsonValue,
) -> Result<Value, ValidationError> {
    plain_sequence("array", field, plain)?
        .iter()
        .enumerate()
        .map(|(i, item)| element.deserialize(&index_path(field, i), item))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::from)
}

pub(super) fn map_from_plain(
    key: &Descriptor,
    val: &Descriptor,
    field: &str,
    plain: &JsonValue,
) -> Result<Value, ValidationError> {
    let object = plain
        .as_object()
        .ok_or_else(|| ValidationError::type_mismatch(field, "map", json_type_name(plain)))?;

    let mut entries: IndexMap<Value, Value> = IndexMap::with_capacity(object.len());
    for (raw_key, v) in object {
        let raw_path = format!("{}[{}]", field, raw_key);
        let k = key_from_string(key, &raw_path, raw_key)?;
        if entries.contains_key(&k) {
            return Err(ValidationError::duplicate_key(raw_path, raw_key, &k));
        }
        let path = entry_path(field, &k);
        let v = val.deserialize(&path, v)?;
        entries.insert(k, v);
    }
    Ok(Value::Map(ValueMap::from_entries(entries)))
}

pub(super) fn tuple_from_plain(
    elements: &[Descriptor],
    field: &str,
    plain: &JsonValue,
) -> Result<Value, ValidationError> {
    let items = plain_sequence("tuple", field, plain)?;
    check_arity(elements, field, items.len())?;
    elements
        .iter()
        .zip(items.iter())
        .enumerate()
        .map(|(i, (element, item))| element.deserialize(&index_path(field, i), item))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::from)
}
