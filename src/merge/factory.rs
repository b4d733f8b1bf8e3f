//! Entity creation for merges that found no match.

use tracing::debug;

use crate::storage::value::{overlay, PropertyMap};

use super::errors::{MergeError, Result};
use super::store::MergeStore;
use super::types::{Entity, Shape};

/// Properties of a newly created entity: the identity overlaid by the create-time map.
pub fn seed_properties(identity: Option<&PropertyMap>, on_create: &PropertyMap) -> PropertyMap {
    match identity {
        Some(identity) => overlay(identity, on_create),
        None => on_create.clone(),
    }
}

/// Creates one entity. The store creates atomically, so a failure leaves nothing behind.
pub fn create_entity<S: MergeStore + ?Sized>(
    store: &mut S,
    shape: &Shape,
    seed: &PropertyMap,
) -> Result<Entity> {
    let entity = store
        .create(shape, seed)
        .map_err(|source| MergeError::EntityCreation {
            kind: shape.kind(),
            source,
        })?;
    debug!(kind = shape.kind(), id = ?entity.id(), "merge.create");
    Ok(entity)
}
