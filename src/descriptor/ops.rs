//! The four descriptor operations: validate, serialize, deserialize, deep-freeze

use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::errors::ValidationError;
use super::types::{Descriptor, DescriptorKind};
use super::{composite, scalar, structure};
use crate::value::Value;

impl Descriptor {
    /// Validates `value` for the field at `field`.
    ///
    /// Order: null check, kind check, children, then configured checks in
    /// declaration order. The first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` with a path rooted at `field`.
    pub fn validate(&self, field: &str, value: &Value) -> Result<(), ValidationError> {
        if value.is_null() {
            return if self.is_nullable() {
                Ok(())
            } else {
                Err(ValidationError::null_value(field))
            };
        }

        match self.kind() {
            DescriptorKind::Scalar(kind) => scalar::check_kind(*kind, field, value)?,
            DescriptorKind::Array(element) => composite::validate_array(element, field, value)?,
            DescriptorKind::Map { key, value: val } => {
                composite::validate_map(key, val, field, value)?
            }
            DescriptorKind::Tuple(elements) => composite::validate_tuple(elements, field, value)?,
            DescriptorKind::Enum { element, values } => {
                element.validate(field, value)?;
                if !values.contains(value) {
                    return Err(ValidationError::not_a_member(field, value));
                }
            }
            DescriptorKind::Structure(record_type) => {
                structure::validate_structure(record_type, field, value)?
            }
            DescriptorKind::Polymorphic(candidates) => {
                structure::match_candidate(candidates, field, value)?;
            }
        }

        for check in self.checks() {
            check.run(field, value)?;
        }
        Ok(())
    }

    /// Converts `value` to its plain form. Null passes through.
    ///
    /// Polymorphic values carry `__type_id`. A value that does not have this
    /// descriptor's shape is rejected rather than coerced.
    pub fn serialize(&self, field: &str, value: &Value) -> Result<JsonValue, ValidationError> {
        if value.is_null() {
            return Ok(JsonValue::Null);
        }

        match self.kind() {
            DescriptorKind::Scalar(kind) => scalar::to_plain(*kind, field, value),
            DescriptorKind::Array(element) => composite::array_to_plain(element, field, value),
            DescriptorKind::Map { key, value: val } => {
                composite::map_to_plain(key, val, field, value)
            }
            DescriptorKind::Tuple(elements) => composite::tuple_to_plain(elements, field, value),
            DescriptorKind::Enum { element, .. } => element.serialize(field, value),
            DescriptorKind::Structure(record_type) => {
                structure::structure_to_plain(record_type, field, value)
            }
            DescriptorKind::Polymorphic(candidates) => {
                structure::polymorphic_to_plain(candidates, field, value)
            }
        }
    }

    /// Converts a plain value back into a [`Value`].
    ///
    /// Only shape is checked here; nullability and validators run when the
    /// owning record is constructed.
    pub fn deserialize(&self, field: &str, plain: &JsonValue) -> Result<Value, ValidationError> {
        if plain.is_null() {
            return Ok(Value::Null);
        }

        match self.kind() {
            DescriptorKind::Scalar(kind) => scalar::from_plain(*kind, field, plain),
            DescriptorKind::Array(element) => composite::array_from_plain(element, field, plain),
            DescriptorKind::Map { key, value } => {
                composite::map_from_plain(key, value, field, plain)
            }
            DescriptorKind::Tuple(elements) => composite::tuple_from_plain(elements, field, plain),
            DescriptorKind::Enum { element, .. } => element.deserialize(field, plain),
            DescriptorKind::Structure(record_type) => {
                structure::structure_from_plain(record_type, field, plain)
            }
            DescriptorKind::Polymorphic(candidates) => {
                structure::polymorphic_from_plain(candidates, field, plain)
            }
        }
    }

    /// Returns a private, immutable copy of `value`.
    ///
    /// Strings are copied into fresh storage and containers are rebuilt from
    /// frozen children, so the result shares no buffer with the input.
    /// Immutable scalars and records are returned as they are.
    pub fn deep_freeze(&self, value: &Value) -> Value {
        match (self.kind(), value) {
            (_, Value::Null) => Value::Null,
            (DescriptorKind::Scalar(_), Value::String(s)) => Value::String(Arc::from(&**s)),
            (DescriptorKind::Array(element), Value::Array(items)) => {
                Value::Array(items.iter().map(|item| element.deep_freeze(item)).collect())
            }
            (DescriptorKind::Map { key, value: val }, Value::Map(map)) => Value::Map(
                map.iter()
                    .map(|(k, v)| (key.deep_freeze(k), val.deep_freeze(v)))
                    .collect(),
            ),
            (DescriptorKind::Tuple(elements), Value::Array(items))
                if elements.len() == items.len() =>
            {
                Value::Array(
                    elements
                        .iter()
                        .zip(items.iter())
                        .map(|(element, item)| element.deep_freeze(item))
                        .collect(),
                )
            }
            (DescriptorKind::Enum { element, .. }, other) => element.deep_freeze(other),
            (_, other) => other.clone(),
        }
    }
}
