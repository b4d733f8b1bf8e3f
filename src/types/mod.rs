#![forbid(unsafe_code)]

//! Identifier newtypes and the storage error shared across the crate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Store-assigned node identifier. Never reused or changed once handed out.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct NodeId(pub u64);
/// Store-assigned relationship identifier.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct EdgeId(pub u64);
/// Dictionary entry identifier.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct StrId(pub u32);
/// Interned node label.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct LabelId(pub u32);
/// Interned relationship type.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct TypeId(pub u32);
/// Interned property key.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct PropId(pub u32);

/// Errors raised by the graph store.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// The request was structurally invalid for the store.
    #[error("invalid argument: {0}")]
    Invalid(&'static str),
    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// A write would give two nodes carrying `label` the same `prop` value.
    #[error("unique constraint violated: another node with label '{label}' already has property '{prop}' = {value}")]
    ConstraintViolation {
        /// Constrained label name.
        label: String,
        /// Constrained property key.
        prop: String,
        /// Offending value, rendered for diagnostics.
        value: String,
    },
    /// The owning transaction was terminated externally.
    #[error("transaction terminated")]
    Terminated,
}

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, GraphError>;

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for StrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PropId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<StrId> for LabelId {
    fn from(value: StrId) -> Self {
        LabelId(value.0)
    }
}

impl From<StrId> for TypeId {
    fn from(value: StrId) -> Self {
        TypeId(value.0)
    }
}

impl From<StrId> for PropId {
    fn from(value: StrId) -> Self {
        PropId(value.0)
    }
}

impl From<LabelId> for StrId {
    fn from(value: LabelId) -> Self {
        StrId(value.0)
    }
}

impl From<TypeId> for StrId {
    fn from(value: TypeId) -> Self {
        StrId(value.0)
    }
}

impl From<PropId> for StrId {
    fn from(value: PropId) -> Self {
        StrId(value.0)
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        NodeId(value)
    }
}
