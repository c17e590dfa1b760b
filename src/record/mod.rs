//! Record types and instances
//!
//! - `RecordBuilder` collects field declarations and record validators
//! - `RecordType` is the frozen schema, shared by all its instances
//! - `Record` is one immutable instance
//!
//! Instances are only ever created through `RecordType::new` (directly, via
//! `deserialize`, or via `Record::with`), so every instance has passed
//! every field and record check.

mod builder;
mod instance;
mod types;

pub use builder::RecordBuilder;
pub use instance::Record;
pub use types::{FieldDef, RecordCheck, RecordType, RecordValidator};
