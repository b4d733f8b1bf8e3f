use crate::storage::value::PropertyMap;
use crate::types::Result;

use super::types::{Entity, EntityId, Shape};

/// Graph access needed by the merge engine.
///
/// Every call runs inside the caller's transaction: the engine never begins, commits or
/// rolls back, and it never retries a failed call. Names handed to the store are opaque
/// strings and must be matched verbatim.
pub trait MergeStore {
    /// Ids of entities that may satisfy `shape` and `identity`, in the store's natural
    /// iteration order.
    ///
    /// The result may over-approximate; the engine re-checks every candidate. It must never
    /// omit an entity that satisfies the predicate, and it must not write anything.
    fn candidates(&self, shape: &Shape, identity: &PropertyMap) -> Result<Vec<EntityId>>;

    /// Loads the current state of `id`, or `None` if it no longer exists.
    fn load(&self, id: EntityId) -> Result<Option<Entity>>;

    /// Atomically creates an entity with the structure of `shape` and the properties `seed`.
    fn create(&mut self, shape: &Shape, seed: &PropertyMap) -> Result<Entity>;

    /// Sets every key of `partial` on `id`, leaving other keys untouched, and returns the
    /// updated entity.
    fn set_properties(&mut self, id: EntityId, partial: &PropertyMap) -> Result<Entity>;

    /// Returns true when a unique constraint covers `key` among nodes labelled `label`.
    fn has_unique_constraint(&self, label: &str, key: &str) -> bool;
}
