//! In-memory secondary indexes: label postings and `(label, property)` value postings.

mod label;
mod property;

pub use label::LabelIndex;
pub use property::{IndexDef, PropertyIndex};
