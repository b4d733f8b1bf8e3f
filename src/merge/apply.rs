//! Property application on matched entities.

use tracing::trace;

use crate::storage::value::PropertyMap;

use super::errors::{MergeError, Result};
use super::store::MergeStore;
use super::types::Entity;

/// Sets every key of `partial` on `entity` and returns the updated entity.
///
/// Keys missing from `partial` keep their values; nothing is removed. An empty map issues
/// no write and hands `entity` back as loaded.
pub fn apply_properties<S: MergeStore + ?Sized>(
    store: &mut S,
    entity: Entity,
    partial: &PropertyMap,
) -> Result<Entity> {
    if partial.is_empty() {
        return Ok(entity);
    }
    let kind = entity.kind();
    trace!(kind, keys = partial.len(), "merge.apply");
    store
        .set_properties(entity.id(), partial)
        .map_err(|source| MergeError::PropertyUpdate { kind, source })
}
