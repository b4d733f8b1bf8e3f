//! Match resolution: turns a shape and an identity into the entities that satisfy them.

use tracing::trace;

use crate::storage::value::{identity_matches, PropertyMap};
use crate::types::GraphError;

use super::errors::{MergeError, Result};
use super::store::MergeStore;
use super::types::{Entity, EntityId, Shape};

fn resolution_error(kind: &'static str) -> impl FnOnce(GraphError) -> MergeError {
    move |source| MergeError::Resolution { kind, source }
}

/// Returns true when `entity` has the structure of `shape` and carries every identity value.
pub fn satisfies(entity: &Entity, shape: &Shape, identity: &PropertyMap) -> bool {
    entity.fits(shape) && identity_matches(entity.props(), identity)
}

/// Walks a fixed candidate list, loading and checking one entity at a time.
///
/// The candidate ids are taken once, up front; each entity is loaded only when the cursor
/// reaches it, so writes made between two calls to [`MatchCursor::next_match`] are visible to
/// the later loads.
pub struct MatchCursor<'a> {
    shape: &'a Shape,
    identity: &'a PropertyMap,
    candidates: std::vec::IntoIter<EntityId>,
}

impl<'a> MatchCursor<'a> {
    /// Enumerates candidates for `shape` and `identity`.
    pub fn open<S: MergeStore + ?Sized>(
        store: &S,
        shape: &'a Shape,
        identity: &'a PropertyMap,
    ) -> Result<Self> {
        let candidates = store
            .candidates(shape, identity)
            .map_err(resolution_error(shape.kind()))?;
        trace!(kind = shape.kind(), candidates = candidates.len(), "merge.resolve.open");
        Ok(Self {
            shape,
            identity,
            candidates: candidates.into_iter(),
        })
    }

    /// Loads candidates until one satisfies the predicate.
    pub fn next_match<S: MergeStore + ?Sized>(&mut self, store: &S) -> Result<Option<Entity>> {
        for id in self.candidates.by_ref() {
            let loaded = store.load(id).map_err(resolution_error(self.shape.kind()))?;
            match loaded {
                Some(entity) if satisfies(&entity, self.shape, self.identity) => {
                    return Ok(Some(entity))
                }
                _ => {}
            }
        }
        Ok(None)
    }
}

/// Resolves every current match, in store order.
pub fn resolve<S: MergeStore + ?Sized>(
    store: &S,
    shape: &Shape,
    identity: &PropertyMap,
) -> Result<Vec<Entity>> {
    let mut cursor = MatchCursor::open(store, shape, identity)?;
    let mut matches = Vec::new();
    while let Some(entity) = cursor.next_match(store)? {
        matches.push(entity);
    }
    Ok(matches)
}
