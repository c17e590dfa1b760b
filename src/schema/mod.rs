//! Declarative schemas
//!
//! Record types described as JSON documents instead of builder calls, and a
//! loader that turns a set of such documents into a registry.
//!
//! # Design Principles
//!
//! - Declarations are data; behavior (custom predicates) is registered in
//!   code and referenced by id
//! - Unknown keys and options are rejected
//! - Loading is all-or-nothing per batch

mod loader;
mod types;

pub use loader::SchemaLoader;
pub use types::{DescriptorDecl, FieldDecl, KindDecl, OptionsDecl, RecordDecl};
