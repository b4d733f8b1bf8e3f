#![forbid(unsafe_code)]

use thiserror::Error;

use crate::storage::value::ValueError;
use crate::types::GraphError;

/// Message of [`MergeError::EmptyIdentity`].
pub const EMPTY_IDENTITY_MESSAGE: &str =
    "you need to supply at least one identifying property for a merge";

/// Errors surfaced by the merge engine.
///
/// Validation failures (`EmptyIdentity`, `EmptyName`, `InvalidValue`) are raised before the
/// store is touched. The store-backed variants keep the underlying [`GraphError`] as their
/// source so callers can tell a constraint violation from a terminated transaction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MergeError {
    /// A node merge was given no identifying property.
    #[error("you need to supply at least one identifying property for a merge")]
    EmptyIdentity,
    /// A label or relationship type was the empty string.
    #[error("{what} must not be empty")]
    EmptyName {
        /// `"label"` or `"relationship type"`.
        what: &'static str,
    },
    /// A property value cannot be stored.
    #[error(transparent)]
    InvalidValue(#[from] ValueError),
    /// The store failed while looking up matches.
    #[error("failed to resolve {kind} matches: {source}")]
    Resolution {
        /// `"node"` or `"relationship"`.
        kind: &'static str,
        /// Store failure.
        #[source]
        source: GraphError,
    },
    /// The store refused to create the entity.
    #[error("failed to create {kind}: {source}")]
    EntityCreation {
        /// `"node"` or `"relationship"`.
        kind: &'static str,
        /// Store failure.
        #[source]
        source: GraphError,
    },
    /// The store failed while applying on-match properties.
    #[error("failed to update matched {kind}: {source}")]
    PropertyUpdate {
        /// `"node"` or `"relationship"`.
        kind: &'static str,
        /// Store failure.
        #[source]
        source: GraphError,
    },
}

impl MergeError {
    /// The store failure behind this error, if any.
    pub fn graph_error(&self) -> Option<&GraphError> {
        match self {
            MergeError::Resolution { source, .. }
            | MergeError::EntityCreation { source, .. }
            | MergeError::PropertyUpdate { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result alias for merge operations.
pub type Result<T> = std::result::Result<T, MergeError>;
