//! Record instances

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use super::types::RecordType;
use crate::descriptor::{ValidationError, TYPE_ID_KEY};
use crate::value::Value;

/// An immutable instance of a [`RecordType`].
///
/// Values are stored in field declaration order and never change. Equality
/// and hashing are structural: same record type, equal field values.
#[derive(Clone)]
pub struct Record {
    record_type: RecordType,
    values: Arc<[Value]>,
}

impl Record {
    pub(super) fn from_parts(record_type: RecordType, values: Arc<[Value]>) -> Self {
        Self { record_type, values }
    }

    pub fn record_type(&self) -> &RecordType {
        &self.record_type
    }

    /// Returns the value of `field`, or `None` if the field is not declared.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.record_type
            .field_index(field)
            .and_then(|index| self.values.get(index))
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_i64)
    }

    /// Iterates `(field name, value)` in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.record_type
            .fields()
            .iter()
            .map(|field| field.name())
            .zip(self.values.iter())
    }

    /// Serializes to a plain object keyed by field name.
    pub fn serialize(&self) -> Result<JsonValue, ValidationError> {
        self.to_plain(None)
    }

    /// Serializes and tags the object with `type_id` under `__type_id`.
    pub fn serialize_as(&self, type_id: &str) -> Result<JsonValue, ValidationError> {
        self.to_plain(Some(type_id))
    }

    fn to_plain(&self, type_id: Option<&str>) -> Result<JsonValue, ValidationError> {
        let mut object = Map::new();
        if let Some(id) = type_id {
            object.insert(TYPE_ID_KEY.to_string(), JsonValue::String(id.to_string()));
        }
        for (field, value) in self.record_type.fields().iter().zip(self.values.iter()) {
            let plain = field.descriptor().serialize(field.name(), value)?;
            object.insert(field.name().to_string(), plain);
        }
        Ok(JsonValue::Object(object))
    }

    /// Returns a new instance with `overrides` applied.
    ///
    /// The receiver is untouched. The new instance goes through full
    /// construction, including record validators.
    pub fn with<I, K, V>(&self, overrides: I) -> Result<Record, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut values: Vec<(String, Value)> = self
            .fields()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        for (key, value) in overrides {
            let key = key.into();
            let index = self
                .record_type
                .field_index(&key)
                .ok_or_else(|| {
                    ValidationError::unknown_field(key.as_str(), self.record_type.name())
                })?;
            values[index].1 = value.into();
        }
        self.record_type.new(values)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.record_type.same_type(&other.record_type) && self.values == other.values
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.record_type.name().hash(state);
        self.values.hash(state);
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.record_type.name());
        for (name, value) in self.fields() {
            out.field(name, &format_args!("{}", value));
        }
        out.finish()
    }
}
