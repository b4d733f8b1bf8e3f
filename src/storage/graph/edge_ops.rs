use tracing::trace;

use super::helpers::entries_to_map;
use super::{EdgeRecord, GraphState, UndoEntry, WriteTx};
use crate::merge::Relationship;
use crate::storage::patch::PropPatch;
use crate::storage::EdgeSpec;
use crate::types::{EdgeId, GraphError, Result, StrId};

impl GraphState {
    pub(super) fn edge_view(&self, id: EdgeId) -> Result<Option<Relationship>> {
        let Some(rec) = self.edges.get(&id) else {
            return Ok(None);
        };
        Ok(Some(Relationship {
            id,
            ty: self.dict.resolve(StrId::from(rec.ty))?.to_owned(),
            start: rec.src,
            end: rec.dst,
            props: self.named_props(&rec.props)?,
        }))
    }
}

impl WriteTx<'_> {
    /// Creates a directed edge. Both endpoints must exist.
    pub fn create_edge(&mut self, spec: EdgeSpec<'_>) -> Result<EdgeId> {
        self.check_live()?;
        let props = entries_to_map(spec.props)?;
        let state = &mut *self.state;
        if !state.nodes.contains_key(&spec.src) {
            return Err(GraphError::NotFound("start node"));
        }
        if !state.nodes.contains_key(&spec.dst) {
            return Err(GraphError::NotFound("end node"));
        }
        let id = EdgeId(state.next_edge_id);
        state.next_edge_id += 1;
        state.adjacency.insert(spec.src, spec.ty, spec.dst, id);
        state.edges.insert(
            id,
            EdgeRecord {
                src: spec.src,
                dst: spec.dst,
                ty: spec.ty,
                props,
            },
        );
        self.undo.push(UndoEntry::EdgeCreated(id));
        self.graph.metrics.edge_created();
        trace!(edge = id.0, src = spec.src.0, dst = spec.dst.0, "graph.create_edge");
        Ok(id)
    }

    /// Applies a property patch to an edge. Keys absent from the patch are kept.
    pub fn update_edge(&mut self, id: EdgeId, patch: PropPatch) -> Result<()> {
        self.check_live()?;
        if patch.is_empty() {
            return Ok(());
        }
        let changes = entries_to_map(&patch.sets)?;
        let rec = self
            .state
            .edges
            .get_mut(&id)
            .ok_or(GraphError::NotFound("edge"))?;
        let prev = rec.props.clone();
        rec.props.extend(changes);
        self.undo.push(UndoEntry::EdgeProps { id, prev });
        self.graph.metrics.edge_updated();
        trace!(edge = id.0, "graph.update_edge");
        Ok(())
    }
}
