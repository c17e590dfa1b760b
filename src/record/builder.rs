//! Record type builder
//!
//! Collects field declarations and record validators, then produces an
//! immutable [`RecordType`]. Descriptor helpers mirror the constructors on
//! [`Descriptor`]; the first configuration error is kept and reported by
//! [`RecordBuilder::build`].

use std::collections::HashSet;

use tracing::debug;

use super::instance::Record;
use super::types::{FieldDef, RecordType, RecordTypeInner, RecordValidator};
use crate::descriptor::{ConfigError, Descriptor, FieldOptions, TYPE_ID_KEY};
use crate::value::Value;

/// Builder for [`RecordType`].
///
/// ```
/// use strictrecord::{FieldOptions, RecordType, Value};
///
/// let hobby = RecordType::builder("Hobby")
///     .string("desc", FieldOptions::new())
///     .integer("difficulty", FieldOptions::new().positive())
///     .build()
///     .unwrap();
///
/// let golf = hobby
///     .new([("desc", Value::from("golfing")), ("difficulty", Value::from(20))])
///     .unwrap();
/// assert_eq!(golf.get_i64("difficulty"), Some(20));
/// ```
#[derive(Debug)]
pub struct RecordBuilder {
    name: String,
    description: Option<String>,
    parent: Option<RecordType>,
    fields: Vec<FieldDef>,
    validators: Vec<RecordValidator>,
    error: Option<ConfigError>,
}

impl RecordBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            parent: None,
            fields: Vec::new(),
            validators: Vec::new(),
            error: None,
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Inherits every field and record validator of `parent`.
    ///
    /// Inherited fields come first. Inheritance shares declarations only:
    /// instances of the new type do not fit structure or polymorphic fields
    /// declared for `parent`.
    pub fn extends(mut self, parent: &RecordType) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Declares a field with an already-built descriptor.
    pub fn field(mut self, name: impl Into<String>, descriptor: Descriptor) -> Self {
        self.fields.push(FieldDef::new(name, descriptor));
        self
    }

    fn field_from(
        self,
        name: impl Into<String>,
        descriptor: Result<Descriptor, ConfigError>,
    ) -> Self {
        match descriptor {
            Ok(descriptor) => self.field(name, descriptor),
            Err(e) => self.fail(e),
        }
    }

    fn fail(mut self, error: ConfigError) -> Self {
        if self.error.is_none() {
            self.error = Some(error);
        }
        self
    }

    pub fn string(self, name: impl Into<String>, options: FieldOptions) -> Self {
        self.field_from(name, Descriptor::string(options))
    }

    pub fn integer(self, name: impl Into<String>, options: FieldOptions) -> Self {
        self.field_from(name, Descriptor::integer(options))
    }

    pub fn float(self, name: impl Into<String>, options: FieldOptions) -> Self {
        self.field_from(name, Descriptor::float(options))
    }

    pub fn decimal(self, name: impl Into<String>, options: FieldOptions) -> Self {
        self.field_from(name, Descriptor::decimal(options))
    }

    pub fn boolean(self, name: impl Into<String>, options: FieldOptions) -> Self {
        self.field_from(name, Descriptor::boolean(options))
    }

    pub fn array(
        self,
        name: impl Into<String>,
        element: Descriptor,
        options: FieldOptions,
    ) -> Self {
        self.field_from(name, Descriptor::array(element, options))
    }

    pub fn map(
        self,
        name: impl Into<String>,
        key: Descriptor,
        value: Descriptor,
        options: FieldOptions,
    ) -> Self {
        self.field_from(name, Descriptor::map(key, value, options))
    }

    pub fn tuple<I>(self, name: impl Into<String>, elements: I, options: FieldOptions) -> Self
    where
        I: IntoIterator<Item = Descriptor>,
    {
        self.field_from(name, Descriptor::tuple(elements, options))
    }

    pub fn enumeration<I, T>(
        self,
        name: impl Into<String>,
        element: Descriptor,
        values: I,
        options: FieldOptions,
    ) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.field_from(name, Descriptor::enumeration(element, values, options))
    }

    pub fn structure(
        self,
        name: impl Into<String>,
        record_type: &RecordType,
        options: FieldOptions,
    ) -> Self {
        self.field_from(name, Descriptor::structure(record_type, options))
    }

    pub fn polymorphic<I, S>(
        self,
        name: impl Into<String>,
        candidates: I,
        options: FieldOptions,
    ) -> Self
    where
        I: IntoIterator<Item = (S, RecordType)>,
        S: Into<String>,
    {
        self.field_from(name, Descriptor::polymorphic(candidates, options))
    }

    /// Attaches a record-level invariant.
    pub fn validate<F>(self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Record) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validate_with(RecordValidator::new(name, check))
    }

    pub fn validate_with(mut self, validator: RecordValidator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Freezes the declarations into a record type.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` raised by a helper, or:
    /// - `EmptyRecordName` for a blank name
    /// - `ReservedField` for a field named `__type_id`
    /// - `DuplicateField` when a name is declared twice (inherited included)
    pub fn build(self) -> Result<RecordType, ConfigError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyRecordName);
        }

        let mut fields: Vec<FieldDef> = Vec::new();
        let mut validators: Vec<RecordValidator> = Vec::new();
        if let Some(parent) = &self.parent {
            fields.extend(parent.fields().iter().cloned());
            validators.extend(parent.validators().iter().cloned());
        }
        fields.extend(self.fields);
        validators.extend(self.validators);

        let mut seen = HashSet::new();
        for field in &fields {
            if field.name() == TYPE_ID_KEY {
                return Err(ConfigError::ReservedField(field.name().to_string()));
            }
            if !seen.insert(field.name()) {
                return Err(ConfigError::DuplicateField {
                    record: self.name.clone(),
                    field: field.name().to_string(),
                });
            }
        }

        debug!(
            record = %self.name,
            fields = fields.len(),
            validators = validators.len(),
            parent = ?self.parent.as_ref().map(RecordType::name),
            "built record type"
        );

        Ok(RecordType::from_inner(RecordTypeInner {
            name: self.name,
            description: self.description,
            fields,
            validators,
            parent: self.parent,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> RecordType {
        RecordType::builder("Shape")
            .string("label", FieldOptions::new())
            .build()
            .unwrap()
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = RecordType::builder("Point")
            .integer("x", FieldOptions::new())
            .integer("x", FieldOptions::new())
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateField {
                record: "Point".into(),
                field: "x".into()
            }
        );
    }

    #[test]
    fn test_reserved_field_rejected() {
        let err = RecordType::builder("Tagged")
            .string(TYPE_ID_KEY, FieldOptions::new())
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::ReservedField(TYPE_ID_KEY.into()));
    }

    #[test]
    fn test_empty_name_rejected() {
        assert_eq!(RecordType::builder(" ").build().unwrap_err(), ConfigError::EmptyRecordName);
    }

    #[test]
    fn test_first_helper_error_is_reported() {
        let err = RecordType::builder("Broken")
            .string("name", FieldOptions::new().positive())
            .integer("count", FieldOptions::new().nonempty())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InapplicableValidator { ref validator, .. } if validator == "positive"
        ));
    }

    #[test]
    fn test_extends_inherits_fields_first() {
        let shape = base();
        let circle = RecordType::builder("Circle")
            .extends(&shape)
            .float("radius", FieldOptions::new().positive())
            .build()
            .unwrap();

        let names: Vec<&str> = circle.fields().iter().map(FieldDef::name).collect();
        assert_eq!(names, vec!["label", "radius"]);
        assert!(circle.is_kind_of(&shape));
        assert!(!shape.is_kind_of(&circle));
    }

    #[test]
    fn test_extends_cannot_redeclare_parent_field() {
        let err = RecordType::builder("Square")
            .extends(&base())
            .string("label", FieldOptions::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateField { .. }));
    }

    #[test]
    fn test_separately_built_types_are_distinct() {
        let a = base();
        let b = base();
        assert!(a.same_type(&a.clone()));
        assert!(!a.same_type(&b));
    }
}
