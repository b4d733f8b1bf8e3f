use std::collections::BTreeMap;

use tracing::trace;

use super::helpers::{entries_to_map, normalize_labels};
use super::{Graph, GraphState, NodeRecord, UndoEntry, WriteTx};
use crate::merge::Node;
use crate::storage::index::IndexDef;
use crate::storage::patch::PropPatch;
use crate::storage::value::{PropValueOwned, PropertyMap};
use crate::storage::NodeSpec;
use crate::types::{GraphError, LabelId, NodeId, PropId, Result, StrId};

impl GraphState {
    pub(super) fn node_view(&self, id: NodeId) -> Result<Option<Node>> {
        let Some(rec) = self.nodes.get(&id) else {
            return Ok(None);
        };
        let mut labels = Vec::with_capacity(rec.labels.len());
        for label in &rec.labels {
            labels.push(self.dict.resolve(StrId::from(*label))?.to_owned());
        }
        labels.sort();
        Ok(Some(Node {
            id,
            labels,
            props: self.named_props(&rec.props)?,
        }))
    }

    pub(super) fn named_props(&self, props: &BTreeMap<PropId, PropValueOwned>) -> Result<PropertyMap> {
        let mut named = PropertyMap::new();
        for (prop, value) in props {
            named.insert(
                self.dict.resolve(StrId::from(*prop))?.to_owned(),
                value.clone(),
            );
        }
        Ok(named)
    }

    pub(super) fn property_lookup(
        &self,
        graph: &Graph,
        label: LabelId,
        prop: PropId,
        value: &PropValueOwned,
    ) -> Option<Vec<NodeId>> {
        if !graph.use_property_indexes {
            return None;
        }
        let hits = self.props.lookup(IndexDef { label, prop }, value)?;
        graph.metrics.index_lookup();
        Some(hits)
    }

    /// Fails when `props` would give `id` a value already held by another node under a
    /// unique constraint on one of `labels`.
    pub(super) fn check_unique(
        &self,
        id: NodeId,
        labels: &[LabelId],
        props: &BTreeMap<PropId, PropValueOwned>,
    ) -> Result<()> {
        for def in self.props.unique_defs() {
            if !labels.contains(&def.label) {
                continue;
            }
            let Some(value) = props.get(&def.prop) else {
                continue;
            };
            let holders = self.props.lookup(def, value).unwrap_or_default();
            if holders.iter().any(|holder| *holder != id) {
                return Err(GraphError::ConstraintViolation {
                    label: self.dict.resolve(StrId::from(def.label))?.to_owned(),
                    prop: self.dict.resolve(StrId::from(def.prop))?.to_owned(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl WriteTx<'_> {
    /// Creates a new node in the graph with the given specification.
    ///
    /// Either the node is fully created (record, label and property postings) or the graph
    /// is left untouched.
    pub fn create_node(&mut self, spec: NodeSpec<'_>) -> Result<NodeId> {
        self.check_live()?;
        let labels = normalize_labels(spec.labels, self.graph.max_labels_per_node)?;
        let props = entries_to_map(spec.props)?;
        let state = &mut *self.state;
        let id = NodeId(state.next_node_id);
        state.check_unique(id, &labels, &props)?;
        state.next_node_id += 1;
        state.labels.insert(id, &labels);
        state.props.insert(id, &labels, &props);
        state.nodes.insert(id, NodeRecord { labels, props });
        self.undo.push(UndoEntry::NodeCreated(id));
        self.graph.metrics.node_created();
        trace!(node = id.0, "graph.create_node");
        Ok(id)
    }

    /// Applies a property patch to a node. Keys absent from the patch are kept.
    pub fn update_node(&mut self, id: NodeId, patch: PropPatch) -> Result<()> {
        self.check_live()?;
        if patch.is_empty() {
            return Ok(());
        }
        let changes = entries_to_map(&patch.sets)?;
        let state = &mut *self.state;
        let rec = state.nodes.get(&id).ok_or(GraphError::NotFound("node"))?;
        let mut next = rec.props.clone();
        next.extend(changes);
        state.check_unique(id, &rec.labels, &next)?;
        let rec = state
            .nodes
            .get_mut(&id)
            .ok_or(GraphError::NotFound("node"))?;
        state.props.remove(id, &rec.labels, &rec.props);
        state.props.insert(id, &rec.labels, &next);
        let prev = std::mem::replace(&mut rec.props, next);
        self.undo.push(UndoEntry::NodeProps { id, prev });
        self.graph.metrics.node_updated();
        trace!(node = id.0, "graph.update_node");
        Ok(())
    }
}
