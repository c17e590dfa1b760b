//! Descriptor configuration
//!
//! Every recognized option is a method on [`FieldOptions`]; there is no
//! free-form option bag to check for stray keys. Standard validators are
//! keyword flags, custom predicates go through `validate`.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Signature of a custom field predicate: `(field path, value) -> Ok | Err(cause)`.
pub type FieldPredicate = dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync;

/// Built-in validators selectable by keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StandardValidator {
    /// `> 0`
    Positive,
    /// `< 0`
    Negative,
    /// `<= 0`
    Nonpositive,
    /// `>= 0`
    Nonnegative,
    /// Non-empty string, array or map
    Nonempty,
}

impl StandardValidator {
    pub fn name(&self) -> &'static str {
        match self {
            StandardValidator::Positive => "positive",
            StandardValidator::Negative => "negative",
            StandardValidator::Nonpositive => "nonpositive",
            StandardValidator::Nonnegative => "nonnegative",
            StandardValidator::Nonempty => "nonempty",
        }
    }

    /// Returns whether this validator inspects the sign of a number.
    pub fn is_sign_check(&self) -> bool {
        !matches!(self, StandardValidator::Nonempty)
    }

    /// Runs the check, returning the failure cause.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        let requirement = match self {
            StandardValidator::Nonempty => return check_nonempty(value),
            StandardValidator::Positive => "positive",
            StandardValidator::Negative => "negative",
            StandardValidator::Nonpositive => "non-positive",
            StandardValidator::Nonnegative => "non-negative",
        };

        let sign = sign_of(value)
            .ok_or_else(|| format!("cannot check the sign of {}", value.kind_name()))?;
        let accepted = matches!(
            (self, sign),
            (StandardValidator::Positive, Ordering::Greater)
                | (StandardValidator::Negative, Ordering::Less)
                | (StandardValidator::Nonpositive, Ordering::Less | Ordering::Equal)
                | (StandardValidator::Nonnegative, Ordering::Greater | Ordering::Equal)
        );
        if accepted {
            Ok(())
        } else {
            Err(format!("must be {} (got {})", requirement, value))
        }
    }
}

impl fmt::Display for StandardValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn check_nonempty(value: &Value) -> Result<(), String> {
    let empty = match value {
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Map(map) => map.is_empty(),
        other => return Err(format!("cannot check emptiness of {}", other.kind_name())),
    };
    if empty {
        Err("must not be empty".to_string())
    } else {
        Ok(())
    }
}

fn sign_of(value: &Value) -> Option<Ordering> {
    match value {
        Value::Int(i) => Some(i.cmp(&0)),
        Value::Float(f) => f.partial_cmp(&0.0),
        Value::Decimal(d) => Some(d.signum()),
        _ => None,
    }
}

/// Named custom field predicate.
#[derive(Clone)]
pub struct Validator {
    name: Arc<str>,
    predicate: Arc<FieldPredicate>,
}

impl Validator {
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.into()),
            predicate: Arc::new(predicate),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn check(&self, field: &str, value: &Value) -> Result<(), String> {
        (self.predicate)(field, value)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator").field("name", &self.name).finish()
    }
}

/// One declared check, in declaration order.
#[derive(Debug, Clone)]
pub(crate) enum CheckSpec {
    Standard(StandardValidator),
    Pattern(String),
    Custom(Validator),
}

/// Options accepted by every descriptor constructor.
///
/// ```
/// use strictrecord::FieldOptions;
///
/// let opts = FieldOptions::new().nullable().positive();
/// assert!(opts.is_nullable());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldOptions {
    nullable: bool,
    checks: Vec<CheckSpec>,
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allows the field to hold null.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn positive(self) -> Self {
        self.standard(StandardValidator::Positive)
    }

    pub fn negative(self) -> Self {
        self.standard(StandardValidator::Negative)
    }

    pub fn nonpositive(self) -> Self {
        self.standard(StandardValidator::Nonpositive)
    }

    pub fn nonnegative(self) -> Self {
        self.standard(StandardValidator::Nonnegative)
    }

    pub fn nonempty(self) -> Self {
        self.standard(StandardValidator::Nonempty)
    }

    /// Attaches a standard validator. Declaring the same one twice is a no-op.
    pub fn standard(mut self, validator: StandardValidator) -> Self {
        let present = self
            .checks
            .iter()
            .any(|c| matches!(c, CheckSpec::Standard(v) if *v == validator));
        if !present {
            self.checks.push(CheckSpec::Standard(validator));
        }
        self
    }

    /// Requires string values to match a regular expression (unanchored).
    pub fn matching(mut self, pattern: impl Into<String>) -> Self {
        self.checks.push(CheckSpec::Pattern(pattern.into()));
        self
    }

    /// Attaches a custom predicate.
    pub fn validate<F>(self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validate_with(Validator::new(name, predicate))
    }

    /// Attaches an already-built custom validator.
    pub fn validate_with(mut self, validator: Validator) -> Self {
        self.checks.push(CheckSpec::Custom(validator));
        self
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub(crate) fn into_parts(self) -> (bool, Vec<CheckSpec>) {
        (self.nullable, self.checks)
    }
}
