//! Type descriptors
//!
//! A descriptor defines how one field's values are validated, serialized to
//! the plain form, deserialized back and frozen. Descriptors compose:
//! arrays, maps, tuples and enums own child descriptors, and structure
//! descriptors wrap whole record types.
//!
//! # Design Principles
//!
//! - Descriptors are immutable once built and shared freely
//! - Configuration mistakes fail at construction (`ConfigError`)
//! - Data mistakes fail at the boundary (`ValidationError`)
//! - No silent coercion: every mismatch is an explicit failure

mod composite;
mod errors;
mod ops;
mod options;
mod plain;
mod scalar;
mod structure;
mod types;

pub use errors::{ConfigError, ValidationCode, ValidationError};
pub use options::{FieldOptions, FieldPredicate, StandardValidator, Validator};
pub use plain::TYPE_ID_KEY;
pub use types::{Descriptor, DescriptorKind, ScalarKind};

pub(crate) use plain::json_type_name;
