//! Idempotent find-or-create for nodes and relationships.
//!
//! A merge runs in four steps:
//!
//! 1. [`validate`] rejects malformed requests before the store is touched. Node merges
//!    need at least one identifying property; relationship merges may omit it.
//! 2. [`resolve`] enumerates the entities carrying the requested labels (or type and
//!    endpoints) whose properties equal every identity value. Equality is exact and
//!    type-aware.
//! 3. With no match, [`factory`] creates exactly one entity seeded with the identity
//!    overlaid by the create-time properties.
//! 4. Otherwise every match becomes a row. Basic merges return matches untouched; eager
//!    merges apply the on-match properties to each of them through [`apply`].
//!
//! [`ExecutionMode`] decides whether matches are all loaded before the first write
//! (`MaterializeThenMutate`, always used by the eager APIs) or examined and updated one
//! by one (`StreamAndMutate`).

pub mod apply;
pub mod executor;
pub mod factory;
pub mod resolve;
pub mod validate;

mod errors;
mod store;
mod testing;
mod types;

pub use errors::{MergeError, Result, EMPTY_IDENTITY_MESSAGE};
pub use executor::MergeExecutor;
pub use store::MergeStore;
pub use types::{
    CreationGuarantee, EagerPolicy, Entity, EntityId, ExecutionMode, MergeOptions,
    MergeOutcome, MergePolicy, MergeRequest, MergeRows, Node, Relationship, Shape,
};
