//! Descriptor error types
//!
//! Two tiers:
//! - `ValidationError`: a supplied value was rejected (data problem)
//! - `ConfigError`: a schema or descriptor was declared wrongly (programmer problem)
//!
//! Validation codes:
//! - NULL_VALUE
//! - TYPE_MISMATCH
//! - VALIDATOR_FAILED
//! - ARITY_MISMATCH
//! - NOT_A_MEMBER
//! - NO_MATCHING_TYPE
//! - AMBIGUOUS_TYPE
//! - UNKNOWN_FIELD
//! - UNKNOWN_TYPE_ID
//! - DUPLICATE_KEY
//! - RECORD_INVARIANT

use std::fmt;

use thiserror::Error;

use crate::value::Value;

/// Validation failure codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationCode {
    /// Null supplied for a non-nullable descriptor
    NullValue,
    /// Value is not of the descriptor's kind
    TypeMismatch,
    /// A standard or custom validator rejected the value
    ValidatorFailed,
    /// Tuple length differs from the declared arity
    ArityMismatch,
    /// Value is not one of the enum's permitted values
    NotAMember,
    /// No polymorphic candidate matches the value
    NoMatchingType,
    /// More than one polymorphic candidate matches the value
    AmbiguousType,
    /// Field name not declared by the record type
    UnknownField,
    /// Discriminant missing or not declared by the polymorphic descriptor
    UnknownTypeId,
    /// A record-level validator rejected the instance
    RecordInvariant,
    /// Two plain map keys decode to the same key
    DuplicateKey,
}

impl ValidationCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationCode::NullValue => "NULL_VALUE",
            ValidationCode::TypeMismatch => "TYPE_MISMATCH",
            ValidationCode::ValidatorFailed => "VALIDATOR_FAILED",
            ValidationCode::ArityMismatch => "ARITY_MISMATCH",
            ValidationCode::NotAMember => "NOT_A_MEMBER",
            ValidationCode::NoMatchingType => "NO_MATCHING_TYPE",
            ValidationCode::AmbiguousType => "AMBIGUOUS_TYPE",
            ValidationCode::UnknownField => "UNKNOWN_FIELD",
            ValidationCode::UnknownTypeId => "UNKNOWN_TYPE_ID",
            ValidationCode::RecordInvariant => "RECORD_INVARIANT",
            ValidationCode::DuplicateKey => "DUPLICATE_KEY",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A value was rejected at a data boundary.
///
/// `path` uses `.` for nested record fields and `[i]` for positions,
/// e.g. `hobbies[0].difficulty`. An empty path means the record itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    code: ValidationCode,
    path: String,
    message: String,
    cause: Option<String>,
}

impl ValidationError {
    fn new(code: ValidationCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
            cause: None,
        }
    }

    fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Null supplied for a non-nullable field
    pub fn null_value(path: impl Into<String>) -> Self {
        Self::new(ValidationCode::NullValue, path, "cannot be null")
    }

    /// Value has the wrong kind
    pub fn type_mismatch(
        path: impl Into<String>,
        expected: impl fmt::Display,
        actual: impl fmt::Display,
    ) -> Self {
        Self::new(
            ValidationCode::TypeMismatch,
            path,
            format!("expected {}, got {}", expected, actual),
        )
    }

    /// A named validator rejected the value
    pub fn validator_failed(
        path: impl Into<String>,
        validator: &str,
        cause: impl Into<String>,
    ) -> Self {
        let cause = cause.into();
        Self::new(
            ValidationCode::ValidatorFailed,
            path,
            format!("failed validator '{}': {}", validator, cause),
        )
        .with_cause(cause)
    }

    /// Tuple length differs from the declared arity
    pub fn arity_mismatch(path: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::new(
            ValidationCode::ArityMismatch,
            path,
            format!("expected {} elements, got {}", expected, actual),
        )
    }

    /// Value outside an enum's permitted set
    pub fn not_a_member(path: impl Into<String>, value: &Value) -> Self {
        Self::new(
            ValidationCode::NotAMember,
            path,
            format!("{} is not one of the permitted values", value),
        )
    }

    /// No polymorphic candidate matched
    pub fn no_match(path: impl Into<String>, actual: impl fmt::Display) -> Self {
        Self::new(
            ValidationCode::NoMatchingType,
            path,
            format!("no match among candidate types for {}", actual),
        )
    }

    /// Several polymorphic candidates matched
    pub fn ambiguous(path: impl Into<String>, actual: impl fmt::Display, ids: &[&str]) -> Self {
        Self::new(
            ValidationCode::AmbiguousType,
            path,
            format!("ambiguous: {} matches candidates {}", actual, ids.join(", ")),
        )
    }

    /// Plain map key decodes to a key already read
    pub fn duplicate_key(path: impl Into<String>, raw: &str, key: &Value) -> Self {
        Self::new(
            ValidationCode::DuplicateKey,
            path,
            format!("key '{}' decodes to {}, which appears earlier", raw, key),
        )
    }

    /// Field not declared by the record type
    pub fn unknown_field(field: impl Into<String>, record: &str) -> Self {
        Self::new(
            ValidationCode::UnknownField,
            field,
            format!("not a field of '{}'", record),
        )
    }

    /// Missing or undeclared discriminant
    pub fn unknown_type_id(path: impl Into<String>, id: Option<&str>) -> Self {
        let message = match id {
            Some(id) => format!("unknown type id '{}'", id),
            None => "missing type id".to_string(),
        };
        Self::new(ValidationCode::UnknownTypeId, path, message)
    }

    /// A record-level validator rejected the instance
    pub fn record_invariant(record: &str, validator: &str, cause: impl Into<String>) -> Self {
        let cause = cause.into();
        Self::new(
            ValidationCode::RecordInvariant,
            "",
            format!("'{}' failed validator '{}': {}", record, validator, cause),
        )
        .with_cause(cause)
    }

    /// Re-roots this error under `prefix`, e.g. `difficulty` under
    /// `hobbies[0]` becomes `hobbies[0].difficulty`.
    pub fn nested_under(mut self, prefix: &str) -> Self {
        self.path = join_path(prefix, &self.path);
        self
    }

    /// Returns the error code
    pub fn code(&self) -> ValidationCode {
        self.code
    }

    /// Returns the offending field path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the human-readable message (without the path)
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the original failure cause reported by a validator
    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}: {}", self.code, self.message)
        } else {
            write!(f, "{}: {}: {}", self.code, self.path, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// Joins a parent path and a child path using `.` / `[i]` notation.
pub(crate) fn join_path(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        path.to_string()
    } else if path.is_empty() {
        prefix.to_string()
    } else if path.starts_with('[') {
        format!("{}{}", prefix, path)
    } else {
        format!("{}.{}", prefix, path)
    }
}

/// Path of the element at `index` under `path`.
pub(crate) fn index_path(path: &str, index: usize) -> String {
    format!("{}[{}]", path, index)
}

/// Path of the map entry stored under `key`.
pub(crate) fn entry_path(path: &str, key: &Value) -> String {
    match key.as_str() {
        Some(s) => format!("{}[{}]", path, s),
        None => format!("{}[{}]", path, key),
    }
}

/// Schema or descriptor declared wrongly.
///
/// Raised only while building descriptors, record types or loading
/// declarations. Never raised while constructing instances.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("validator '{validator}' cannot be applied to {kind} descriptors")]
    InapplicableValidator { validator: String, kind: String },

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("enum descriptor requires at least one permitted value")]
    EmptyEnum,

    #[error("enum value {value} is not valid for its element descriptor: {reason}")]
    InvalidEnumValue { value: String, reason: String },

    #[error("polymorphic descriptor requires at least one candidate")]
    NoCandidates,

    #[error("polymorphic candidate id must not be empty")]
    EmptyCandidateId,

    #[error("polymorphic candidate id '{0}' is declared more than once")]
    DuplicateCandidateId(String),

    #[error("record type '{record}' is listed under both '{first}' and '{second}'")]
    DuplicateCandidateType {
        record: String,
        first: String,
        second: String,
    },

    #[error("record type name must not be empty")]
    EmptyRecordName,

    #[error("duplicate field '{field}' in record type '{record}'")]
    DuplicateField { record: String, field: String },

    #[error("field name '{0}' is reserved")]
    ReservedField(String),

    #[error("map key descriptor must not be nullable")]
    NullableMapKey,

    #[error("unknown descriptor kind '{0}'")]
    UnknownKind(String),

    #[error("unknown record type '{0}'")]
    UnknownRecordType(String),

    #[error("record type '{0}' is already registered")]
    DuplicateRecordType(String),

    #[error("record type '{0}' references itself")]
    CyclicReference(String),

    #[error("unknown validator '{0}'")]
    UnknownValidator(String),

    #[error("malformed declaration '{origin}': {reason}")]
    MalformedDeclaration { origin: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(ValidationCode::NullValue.code(), "NULL_VALUE");
        assert_eq!(ValidationCode::AmbiguousType.code(), "AMBIGUOUS_TYPE");
        assert_eq!(ValidationCode::RecordInvariant.code(), "RECORD_INVARIANT");
    }

    #[test]
    fn test_null_message() {
        let err = ValidationError::null_value("name");
        assert_eq!(err.to_string(), "NULL_VALUE: name: cannot be null");
        assert_eq!(err.path(), "name");
    }

    #[test]
    fn test_nesting_paths() {
        let err = ValidationError::null_value("difficulty").nested_under("hobbies[0]");
        assert_eq!(err.path(), "hobbies[0].difficulty");

        let err = ValidationError::null_value("[2]").nested_under("scores");
        assert_eq!(err.path(), "scores[2]");

        let err = ValidationError::record_invariant("Person", "name", "bad").nested_under("owner");
        assert_eq!(err.path(), "owner");
    }

    #[test]
    fn test_validator_failure_keeps_cause() {
        let err = ValidationError::validator_failed("age", "positive", "must be positive");
        assert_eq!(err.cause(), Some("must be positive"));
        assert!(err.message().contains("positive"));
    }

    #[test]
    fn test_entry_path_uses_raw_string_keys() {
        assert_eq!(entry_path("scores", &Value::from("alice")), "scores[alice]");
        assert_eq!(entry_path("scores", &Value::Int(3)), "scores[3]");
    }
}
