use std::collections::BTreeSet;

use crate::types::{EdgeId, NodeId, TypeId};

/// Forward adjacency key, ordered `(src, ty, dst, edge)` so that every edge of one type
/// between one ordered pair of nodes is a contiguous range.
pub type FwdKey = (NodeId, TypeId, NodeId, EdgeId);

pub fn fwd_key(src: NodeId, ty: TypeId, dst: NodeId, edge: EdgeId) -> FwdKey {
    (src, ty, dst, edge)
}

/// Directed adjacency index over `(src, ty, dst)`.
#[derive(Default)]
pub struct Adjacency {
    fwd: BTreeSet<FwdKey>,
}

impl Adjacency {
    pub fn insert(&mut self, src: NodeId, ty: TypeId, dst: NodeId, edge: EdgeId) {
        self.fwd.insert(fwd_key(src, ty, dst, edge));
    }

    pub fn remove(&mut self, src: NodeId, ty: TypeId, dst: NodeId, edge: EdgeId) {
        self.fwd.remove(&fwd_key(src, ty, dst, edge));
    }

    /// Edges of type `ty` from `src` to `dst`, ascending by edge id.
    pub fn between(&self, src: NodeId, ty: TypeId, dst: NodeId) -> Vec<EdgeId> {
        let lo = fwd_key(src, ty, dst, EdgeId(0));
        let hi = fwd_key(src, ty, dst, EdgeId(u64::MAX));
        self.fwd.range(lo..=hi).map(|key| key.3).collect()
    }
}
