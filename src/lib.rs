//! Idempotent find-or-create ("merge") for property graph nodes and relationships.
//!
//! The [`merge`] module holds the engine: it validates a request, resolves the entities
//! matching a structural shape and an identifying property set, and then either creates
//! exactly one entity or applies a property policy to every match. The engine talks to the
//! graph through [`merge::MergeStore`]; [`storage::Graph`] is an in-memory store whose
//! write transactions implement it.
//!
//! ```
//! use sombra_merge::merge::MergeExecutor;
//! use sombra_merge::props;
//! use sombra_merge::storage::{Graph, GraphOptions};
//!
//! let graph = Graph::open(GraphOptions::default());
//! let mut tx = graph.begin_write();
//! let mut merge = MergeExecutor::new(&mut tx);
//! let first = merge
//!     .merge_node(&["Person"], Some(props! { "ssid" => "123" }), props! { "name" => "Jim" })
//!     .unwrap();
//! let again = merge
//!     .merge_node(&["Person"], Some(props! { "ssid" => "123" }), props! { "name" => "John" })
//!     .unwrap();
//! assert!(first.was_created());
//! assert!(!again.was_created());
//! assert_eq!(again.rows()[0].prop("name"), first.rows()[0].prop("name"));
//! drop(merge);
//! tx.commit().unwrap();
//! ```
//!
//! Known limitation: the engine takes no locks of its own. Two transactions merging the
//! same identity at the same time may both create unless a unique constraint covers the
//! identity; see [`merge::CreationGuarantee`].

#![warn(missing_docs)]

pub mod config;
pub mod logging;
pub mod merge;
pub mod storage;
pub mod types;
