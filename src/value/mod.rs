//! Runtime value model
//!
//! Every value a record can hold is one of the variants of [`Value`].
//! Storage is shared through `Arc` and never mutated after construction,
//! so cloning a value never hands out a mutable alias into a record.

mod decimal;
mod map;
mod types;

pub use decimal::{Decimal, ParseDecimalError};
pub use map::ValueMap;
pub use types::Value;
