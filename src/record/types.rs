//! Record types
//!
//! A record type is an ordered list of `(field name, descriptor)` pairs plus
//! record-level validators. It is built once by [`RecordBuilder`] and then
//! shared read-only by every instance it creates.

use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::trace;

use super::builder::RecordBuilder;
use super::instance::Record;
use crate::descriptor::{json_type_name, Descriptor, ValidationError, TYPE_ID_KEY};
use crate::value::Value;

/// Signature of a record-level check: `Ok` or `Err(cause)`.
pub type RecordCheck = dyn Fn(&Record) -> Result<(), String> + Send + Sync;

/// One declared field.
#[derive(Debug, Clone)]
pub struct FieldDef {
    name: String,
    descriptor: Descriptor,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, descriptor: Descriptor) -> Self {
        Self {
            name: name.into(),
            descriptor,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }
}

/// Named record-level validator. Runs against a fully initialized instance.
#[derive(Clone)]
pub struct RecordValidator {
    name: Arc<str>,
    check: Arc<RecordCheck>,
}

impl RecordValidator {
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Record) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.into()),
            check: Arc::new(check),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn check(&self, record: &Record) -> Result<(), String> {
        (self.check)(record)
    }
}

impl fmt::Debug for RecordValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordValidator").field("name", &self.name).finish()
    }
}

pub(super) struct RecordTypeInner {
    pub(super) name: String,
    pub(super) description: Option<String>,
    pub(super) fields: Vec<FieldDef>,
    pub(super) validators: Vec<RecordValidator>,
    pub(super) parent: Option<RecordType>,
}

/// An immutable record type (schema).
///
/// Identity matters: two record types built separately are different types
/// even if their fields agree.
#[derive(Clone)]
pub struct RecordType {
    inner: Arc<RecordTypeInner>,
}

impl RecordType {
    pub(super) fn from_inner(inner: RecordTypeInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Starts declaring a new record type.
    pub fn builder(name: impl Into<String>) -> RecordBuilder {
        RecordBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Free-form description. Not inherited through `extends`.
    pub fn description(&self) -> Option<&str> {
        self.inner.description.as_deref()
    }

    /// Fields in declaration order (inherited fields first).
    pub fn fields(&self) -> &[FieldDef] {
        &self.inner.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.inner.fields.iter().find(|f| f.name == name)
    }

    pub(crate) fn field_index(&self, name: &str) -> Option<usize> {
        self.inner.fields.iter().position(|f| f.name == name)
    }

    pub fn validators(&self) -> &[RecordValidator] {
        &self.inner.validators
    }

    pub fn parent(&self) -> Option<&RecordType> {
        self.inner.parent.as_ref()
    }

    /// Returns whether both handles refer to the same record type.
    pub fn same_type(&self, other: &RecordType) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns whether `other` is this type or one of its ancestors.
    ///
    /// Structure and polymorphic fields still require the exact type.
    pub fn is_kind_of(&self, other: &RecordType) -> bool {
        let mut current = Some(self);
        while let Some(record_type) = current {
            if record_type.same_type(other) {
                return true;
            }
            current = record_type.parent();
        }
        false
    }

    /// Constructs an instance.
    ///
    /// Every declared field is validated then frozen in declaration order;
    /// fields not supplied are null. Record validators run last, against the
    /// finished instance.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if:
    /// - a key is not a declared field (UNKNOWN_FIELD)
    /// - a field value fails its descriptor
    /// - a record validator fails (RECORD_INVARIANT)
    pub fn new<I, K, V>(&self, values: I) -> Result<Record, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let fields = self.fields();
        let mut supplied: Vec<Option<Value>> = vec![None; fields.len()];
        for (key, value) in values {
            let key = key.into();
            let index = self
                .field_index(&key)
                .ok_or_else(|| ValidationError::unknown_field(key.as_str(), self.name()))?;
            supplied[index] = Some(value.into());
        }

        let mut frozen = Vec::with_capacity(fields.len());
        for (field, value) in fields.iter().zip(supplied) {
            let value = value.unwrap_or(Value::Null);
            if let Err(e) = field.descriptor.validate(&field.name, &value) {
                trace!(record = %self.name(), error = %e, "rejected record construction");
                return Err(e);
            }
            frozen.push(field.descriptor.deep_freeze(&value));
        }

        let record = Record::from_parts(self.clone(), frozen.into());
        for validator in self.validators() {
            validator.check(&record).map_err(|cause| {
                ValidationError::record_invariant(self.name(), validator.name(), cause)
            })?;
        }
        Ok(record)
    }

    /// Rebuilds an instance from its plain form.
    ///
    /// Each declared field is read by name and deserialized through its
    /// descriptor, then the instance goes through [`RecordType::new`], so
    /// every check reruns. `__type_id` is ignored; any other undeclared key
    /// is rejected.
    pub fn deserialize(&self, plain: &JsonValue) -> Result<Record, ValidationError> {
        let object = plain
            .as_object()
            .ok_or_else(|| ValidationError::type_mismatch("", self.name(), json_type_name(plain)))?;

        if let Some(unknown) = object
            .keys()
            .find(|key| key.as_str() != TYPE_ID_KEY && self.field_index(key).is_none())
        {
            return Err(ValidationError::unknown_field(unknown.as_str(), self.name()));
        }

        let mut values = Vec::with_capacity(self.fields().len());
        for field in self.fields() {
            let plain_value = object.get(&field.name).unwrap_or(&JsonValue::Null);
            let value = field.descriptor.deserialize(&field.name, plain_value)?;
            values.push((field.name.clone(), value));
        }
        self.new(values)
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<(&str, String)> = self
            .fields()
            .iter()
            .map(|field| (field.name(), field.descriptor().type_name()))
            .collect();
        f.debug_struct("RecordType")
            .field("name", &self.name())
            .field("fields", &fields)
            .field("parent", &self.parent().map(RecordType::name))
            .finish()
    }
}
