//! Descriptor definitions and construction
//!
//! Supported kinds:
//! - scalar: string, integer, float, decimal, boolean
//! - array: homogeneous sequence with one element descriptor
//! - map: key descriptor + value descriptor
//! - tuple: fixed sequence of per-position descriptors
//! - enum: element descriptor + frozen set of permitted values
//! - structure: nested record of one record type
//! - polymorphic: nested record dispatched by discriminant id

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::errors::{ConfigError, ValidationError};
use super::options::{CheckSpec, FieldOptions, StandardValidator, Validator};
use crate::record::RecordType;
use crate::value::Value;

/// Leaf value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Integer,
    /// Finite 64-bit float
    Float,
    /// Arbitrary-precision decimal
    Decimal,
    /// Boolean (modeled as an enum over `true`/`false`)
    Boolean,
}

impl ScalarKind {
    /// Returns the kind name for error messages
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Integer => "integer",
            ScalarKind::Float => "float",
            ScalarKind::Decimal => "decimal",
            ScalarKind::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScalarKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ScalarKind::String),
            "integer" => Ok(ScalarKind::Integer),
            "float" => Ok(ScalarKind::Float),
            "decimal" => Ok(ScalarKind::Decimal),
            "boolean" => Ok(ScalarKind::Boolean),
            other => Err(ConfigError::UnknownKind(other.to_string())),
        }
    }
}

/// The closed set of descriptor variants.
#[derive(Debug, Clone)]
pub enum DescriptorKind {
    Scalar(ScalarKind),
    Array(Descriptor),
    Map { key: Descriptor, value: Descriptor },
    Tuple(Vec<Descriptor>),
    Enum { element: Descriptor, values: Vec<Value> },
    Structure(RecordType),
    /// Candidates as `(discriminant id, record type)` in declaration order
    Polymorphic(Vec<(String, RecordType)>),
}

/// What a descriptor's values look like, for validator applicability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Number,
    Text,
    Collection,
    Opaque,
}

/// A compiled check.
#[derive(Debug, Clone)]
pub(super) enum Check {
    Standard(StandardValidator),
    Pattern(Regex),
    Custom(Validator),
}

impl Check {
    pub(super) fn run(&self, field: &str, value: &Value) -> Result<(), ValidationError> {
        let outcome = match self {
            Check::Standard(validator) => validator.check(value),
            Check::Pattern(regex) => match value.as_str() {
                Some(s) if regex.is_match(s) => Ok(()),
                _ => Err(format!("must match /{}/", regex.as_str())),
            },
            Check::Custom(validator) => validator.check(field, value),
        };
        outcome.map_err(|cause| ValidationError::validator_failed(field, self.name(), cause))
    }

    fn name(&self) -> &str {
        match self {
            Check::Standard(validator) => validator.name(),
            Check::Pattern(_) => "matching",
            Check::Custom(validator) => validator.name(),
        }
    }
}

#[derive(Debug)]
struct DescriptorInner {
    kind: DescriptorKind,
    nullable: bool,
    checks: Vec<Check>,
}

/// Immutable type descriptor.
///
/// Cloning is cheap; one descriptor can back any number of fields and
/// record instances across threads.
#[derive(Debug, Clone)]
pub struct Descriptor {
    inner: Arc<DescriptorInner>,
}

impl Descriptor {
    fn build(kind: DescriptorKind, options: FieldOptions) -> Result<Self, ConfigError> {
        let (nullable, specs) = options.into_parts();
        let shape = shape_of(&kind);

        let mut checks = Vec::with_capacity(specs.len());
        for spec in specs {
            let check = match spec {
                CheckSpec::Standard(validator) => {
                    let applies = if validator.is_sign_check() {
                        shape == Shape::Number
                    } else {
                        matches!(shape, Shape::Text | Shape::Collection)
                    };
                    if !applies {
                        return Err(inapplicable(validator.name(), &kind));
                    }
                    Check::Standard(validator)
                }
                CheckSpec::Pattern(pattern) => {
                    if shape != Shape::Text {
                        return Err(inapplicable("matching", &kind));
                    }
                    let regex = Regex::new(&pattern).map_err(|e| ConfigError::InvalidPattern {
                        pattern: pattern.clone(),
                        reason: e.to_string(),
                    })?;
                    Check::Pattern(regex)
                }
                CheckSpec::Custom(validator) => Check::Custom(validator),
            };
            checks.push(check);
        }

        Ok(Self {
            inner: Arc::new(DescriptorInner {
                kind,
                nullable,
                checks,
            }),
        })
    }

    /// Returns the canonical descriptor for a scalar kind.
    pub fn of_kind(kind: ScalarKind, options: FieldOptions) -> Result<Self, ConfigError> {
        match kind {
            ScalarKind::Boolean => Self::boolean(options),
            other => Self::build(DescriptorKind::Scalar(other), options),
        }
    }

    pub fn string(options: FieldOptions) -> Result<Self, ConfigError> {
        Self::of_kind(ScalarKind::String, options)
    }

    pub fn integer(options: FieldOptions) -> Result<Self, ConfigError> {
        Self::of_kind(ScalarKind::Integer, options)
    }

    pub fn float(options: FieldOptions) -> Result<Self, ConfigError> {
        Self::of_kind(ScalarKind::Float, options)
    }

    pub fn decimal(options: FieldOptions) -> Result<Self, ConfigError> {
        Self::of_kind(ScalarKind::Decimal, options)
    }

    /// Boolean descriptor: an enum over the two truth values.
    pub fn boolean(options: FieldOptions) -> Result<Self, ConfigError> {
        let element =
            Self::build(DescriptorKind::Scalar(ScalarKind::Boolean), FieldOptions::new())?;
        Self::enumeration(element, [true, false], options)
    }

    pub fn array(element: Descriptor, options: FieldOptions) -> Result<Self, ConfigError> {
        Self::build(DescriptorKind::Array(element), options)
    }

    /// Map descriptor. The key descriptor may not be nullable: a null key has
    /// no plain form distinct from the string `"null"`.
    pub fn map(
        key: Descriptor,
        value: Descriptor,
        options: FieldOptions,
    ) -> Result<Self, ConfigError> {
        if key.is_nullable() {
            return Err(ConfigError::NullableMapKey);
        }
        Self::build(DescriptorKind::Map { key, value }, options)
    }

    pub fn tuple<I>(elements: I, options: FieldOptions) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = Descriptor>,
    {
        Self::build(DescriptorKind::Tuple(elements.into_iter().collect()), options)
    }

    /// Enum over a fixed set of values.
    ///
    /// Each value must pass the element descriptor and is frozen once here.
    /// Duplicates are dropped.
    pub fn enumeration<I, T>(
        element: Descriptor,
        values: I,
        options: FieldOptions,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        let mut permitted: Vec<Value> = Vec::new();
        for value in values {
            let value = value.into();
            element
                .validate("", &value)
                .map_err(|e| ConfigError::InvalidEnumValue {
                    value: value.to_string(),
                    reason: e.to_string(),
                })?;
            let frozen = element.deep_freeze(&value);
            if !permitted.contains(&frozen) {
                permitted.push(frozen);
            }
        }
        if permitted.is_empty() {
            return Err(ConfigError::EmptyEnum);
        }

        Self::build(
            DescriptorKind::Enum {
                element,
                values: permitted,
            },
            options,
        )
    }

    pub fn structure(record_type: &RecordType, options: FieldOptions) -> Result<Self, ConfigError> {
        Self::build(DescriptorKind::Structure(record_type.clone()), options)
    }

    /// Polymorphic structure over `(discriminant id, record type)` candidates.
    ///
    /// Ids must be non-empty and unique, and a record type may be listed only
    /// once. A value matches a candidate only when its record type is exactly
    /// the candidate's type, so candidates related by `extends` stay distinct.
    pub fn polymorphic<I, S>(candidates: I, options: FieldOptions) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, RecordType)>,
        S: Into<String>,
    {
        let mut list: Vec<(String, RecordType)> = Vec::new();
        for (id, record_type) in candidates {
            let id = id.into();
            if id.is_empty() {
                return Err(ConfigError::EmptyCandidateId);
            }
            if list.iter().any(|(existing, _)| *existing == id) {
                return Err(ConfigError::DuplicateCandidateId(id));
            }
            if let Some((first, _)) = list.iter().find(|(_, rt)| rt.same_type(&record_type)) {
                return Err(ConfigError::DuplicateCandidateType {
                    record: record_type.name().to_string(),
                    first: first.clone(),
                    second: id,
                });
            }
            list.push((id, record_type));
        }
        if list.is_empty() {
            return Err(ConfigError::NoCandidates);
        }

        debug!(
            candidates = ?list.iter().map(|(id, _)| id.as_str()).collect::<Vec<_>>(),
            "configured polymorphic descriptor"
        );
        Self::build(DescriptorKind::Polymorphic(list), options)
    }

    pub fn kind(&self) -> &DescriptorKind {
        &self.inner.kind
    }

    pub fn is_nullable(&self) -> bool {
        self.inner.nullable
    }

    pub(super) fn checks(&self) -> &[Check] {
        &self.inner.checks
    }

    /// Human-readable type, e.g. `array<integer>` or `map<string, Hobby>`.
    pub fn type_name(&self) -> String {
        match self.kind() {
            DescriptorKind::Scalar(kind) => kind.name().to_string(),
            DescriptorKind::Array(element) => format!("array<{}>", element.type_name()),
            DescriptorKind::Map { key, value } => {
                format!("map<{}, {}>", key.type_name(), value.type_name())
            }
            DescriptorKind::Tuple(elements) => {
                let names: Vec<String> = elements.iter().map(Descriptor::type_name).collect();
                format!("tuple<{}>", names.join(", "))
            }
            DescriptorKind::Enum { element, .. } => match element.kind() {
                DescriptorKind::Scalar(ScalarKind::Boolean) => "boolean".to_string(),
                _ => format!("enum<{}>", element.type_name()),
            },
            DescriptorKind::Structure(record_type) => record_type.name().to_string(),
            DescriptorKind::Polymorphic(candidates) => {
                let ids: Vec<&str> = candidates.iter().map(|(id, _)| id.as_str()).collect();
                format!("one_of<{}>", ids.join(", "))
            }
        }
    }
}

fn shape_of(kind: &DescriptorKind) -> Shape {
    match kind {
        DescriptorKind::Scalar(ScalarKind::Integer | ScalarKind::Float | ScalarKind::Decimal) => {
            Shape::Number
        }
        DescriptorKind::Scalar(ScalarKind::String) => Shape::Text,
        DescriptorKind::Array(_) | DescriptorKind::Map { .. } => Shape::Collection,
        DescriptorKind::Enum { element, .. } => shape_of(element.kind()),
        DescriptorKind::Scalar(ScalarKind::Boolean)
        | DescriptorKind::Tuple(_)
        | DescriptorKind::Structure(_)
        | DescriptorKind::Polymorphic(_) => Shape::Opaque,
    }
}

fn inapplicable(validator: &str, kind: &DescriptorKind) -> ConfigError {
    let kind = match kind {
        DescriptorKind::Scalar(scalar) => scalar.name(),
        DescriptorKind::Array(_) => "array",
        DescriptorKind::Map { .. } => "map",
        DescriptorKind::Tuple(_) => "tuple",
        DescriptorKind::Enum { .. } => "enum",
        DescriptorKind::Structure(_) => "structure",
        DescriptorKind::Polymorphic(_) => "polymorphic",
    };
    ConfigError::InapplicableValidator {
        validator: validator.to_string(),
        kind: kind.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_kind_names_round_trip() {
        for kind in [
            ScalarKind::String,
            ScalarKind::Integer,
            ScalarKind::Float,
            ScalarKind::Decimal,
            ScalarKind::Boolean,
        ] {
            assert_eq!(kind.name().parse::<ScalarKind>().unwrap(), kind);
        }
        assert_eq!(
            "bytes".parse::<ScalarKind>().unwrap_err(),
            ConfigError::UnknownKind("bytes".into())
        );
    }

    #[test]
    fn test_sign_validator_rejected_on_strings() {
        let err = Descriptor::string(FieldOptions::new().positive()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InapplicableValidator {
                validator: "positive".into(),
                kind: "string".into()
            }
        );
    }

    #[test]
    fn test_nonempty_rejected_on_integers_and_tuples() {
        assert!(Descriptor::integer(FieldOptions::new().nonempty()).is_err());
        let element = Descriptor::integer(FieldOptions::new()).unwrap();
        assert!(Descriptor::tuple([element], FieldOptions::new().nonempty()).is_err());
    }

    #[test]
    fn test_pattern_only_on_strings() {
        assert!(Descriptor::string(FieldOptions::new().matching("^J")).is_ok());
        assert!(Descriptor::integer(FieldOptions::new().matching("^J")).is_err());
        assert!(matches!(
            Descriptor::string(FieldOptions::new().matching("(")),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_sign_validator_allowed_on_numeric_enum() {
        let element = Descriptor::integer(FieldOptions::new()).unwrap();
        let positive = FieldOptions::new().positive();
        assert!(Descriptor::enumeration(element, [1, 2, 3], positive).is_ok());
    }

    #[test]
    fn test_enum_values_checked_against_element() {
        let element = Descriptor::integer(FieldOptions::new().positive()).unwrap();
        let err =
            Descriptor::enumeration(element.clone(), [1, -1], FieldOptions::new()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnumValue { .. }));

        let err =
            Descriptor::enumeration(element, Vec::<Value>::new(), FieldOptions::new()).unwrap_err();
        assert_eq!(err, ConfigError::EmptyEnum);
    }

    #[test]
    fn test_type_names() {
        let int = Descriptor::integer(FieldOptions::new()).unwrap();
        let string = Descriptor::string(FieldOptions::new()).unwrap();
        let array = Descriptor::array(int.clone(), FieldOptions::new()).unwrap();
        let map = Descriptor::map(string.clone(), array.clone(), FieldOptions::new()).unwrap();
        let tuple = Descriptor::tuple([string, int], FieldOptions::new()).unwrap();

        assert_eq!(array.type_name(), "array<integer>");
        assert_eq!(map.type_name(), "map<string, array<integer>>");
        assert_eq!(tuple.type_name(), "tuple<string, integer>");
        assert_eq!(Descriptor::boolean(FieldOptions::new()).unwrap().type_name(), "boolean");
    }
}
