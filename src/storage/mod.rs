//! In-memory property graph store.
//!
//! Labels, relationship types and property keys are interned through the [`catalog`]
//! dictionary; nodes and edges are reachable through a label index, optional
//! `(label, property)` indexes and a `(start, type, end)` adjacency index. All access goes
//! through [`ReadTx`] and [`WriteTx`].

/// Name ↔ id dictionary.
pub mod catalog;

/// Property values and property maps.
pub mod value;

mod adjacency;
mod graph;
mod index;
mod metrics;
mod options;
mod patch;
mod types;

pub use graph::{Graph, ReadTx, TxTerminator, WriteTx};
pub use metrics::{default_metrics, CounterMetrics, NoopMetrics, StorageMetrics};
pub use options::{GraphOptions, DEFAULT_MAX_LABELS_PER_NODE};
pub use patch::PropPatch;
pub use types::{EdgeSpec, NodeSpec, PropEntry};
pub use value::{
    identity_matches, overlay, props_from_json, value_from_json, PropValueOwned, PropertyMap,
    TypeTag, ValueError,
};
