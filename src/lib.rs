//! strictrecord - strictly validated, immutable, serializable records
//!
//! A record type is declared once, as an ordered set of fields each governed
//! by a [`Descriptor`]. Instances are checked completely at construction,
//! deep-frozen, and round-trip through a plain JSON form.
//!
//! ```
//! use strictrecord::{Descriptor, FieldOptions, RecordType, Value};
//!
//! let hobby = RecordType::builder("Hobby")
//!     .string("desc", FieldOptions::new())
//!     .integer("difficulty", FieldOptions::new().positive())
//!     .build()
//!     .unwrap();
//! let person = RecordType::builder("Person")
//!     .string("name", FieldOptions::new())
//!     .array(
//!         "hobbies",
//!         Descriptor::structure(&hobby, FieldOptions::new()).unwrap(),
//!         FieldOptions::new().nullable(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let golf = hobby
//!     .new([("desc", Value::from("golfing")), ("difficulty", Value::from(20))])
//!     .unwrap();
//! let joe = person
//!     .new([("name", Value::from("Joe")), ("hobbies", Value::from(vec![Value::from(golf)]))])
//!     .unwrap();
//!
//! let plain = joe.serialize().unwrap();
//! assert_eq!(person.deserialize(&plain).unwrap(), joe);
//! ```

pub mod cli;
pub mod descriptor;
mod error;
pub mod record;
pub mod schema;
pub mod value;

pub use descriptor::{
    ConfigError, Descriptor, DescriptorKind, FieldOptions, ScalarKind, StandardValidator,
    ValidationCode, ValidationError, Validator, TYPE_ID_KEY,
};
pub use error::{Error, Result};
pub use record::{FieldDef, Record, RecordBuilder, RecordType, RecordValidator};
pub use schema::SchemaLoader;
pub use value::{Decimal, Value, ValueMap};
