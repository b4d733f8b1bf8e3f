use tracing::trace;

use super::WriteTx;
use crate::merge::{Entity, EntityId, MergeStore, Shape};
use crate::storage::patch::PropPatch;
use crate::storage::types::PropEntry;
use crate::storage::value::PropertyMap;
use crate::storage::{EdgeSpec, NodeSpec};
use crate::types::{EdgeId, GraphError, LabelId, NodeId, PropId, Result, TypeId};

impl WriteTx<'_> {
    fn prop_entries(&mut self, props: &PropertyMap) -> Result<Vec<PropEntry>> {
        let mut entries = Vec::with_capacity(props.len());
        for (key, value) in props {
            let prop = PropId::from(self.state.dict.intern(key)?);
            entries.push(PropEntry::new(prop, value.clone()));
        }
        Ok(entries)
    }

    /// Creates a node from label and property names, interning them as needed.
    pub fn create_node_with(&mut self, labels: &[&str], props: &PropertyMap) -> Result<NodeId> {
        self.check_live()?;
        let mut label_ids = Vec::with_capacity(labels.len());
        for label in labels {
            label_ids.push(LabelId::from(self.state.dict.intern(label)?));
        }
        let entries = self.prop_entries(props)?;
        self.create_node(NodeSpec {
            labels: &label_ids,
            props: &entries,
        })
    }

    /// Creates an edge from a type name and property names, interning them as needed.
    pub fn create_edge_with(
        &mut self,
        src: NodeId,
        ty: &str,
        dst: NodeId,
        props: &PropertyMap,
    ) -> Result<EdgeId> {
        self.check_live()?;
        let ty = TypeId::from(self.state.dict.intern(ty)?);
        let entries = self.prop_entries(props)?;
        self.create_edge(EdgeSpec {
            src,
            dst,
            ty,
            props: &entries,
        })
    }

    /// Sets properties on a node by name, interning keys as needed.
    pub fn set_node_props(&mut self, id: NodeId, props: &PropertyMap) -> Result<()> {
        self.check_live()?;
        let entries = self.prop_entries(props)?;
        self.update_node(id, PropPatch::new(entries))
    }

    fn node_candidates(&self, labels: &[String], identity: &PropertyMap) -> Result<Vec<NodeId>> {
        // Unknown names cannot be carried by any node.
        let mut label_ids = Vec::with_capacity(labels.len());
        for label in labels {
            match self.state.dict.lookup(label) {
                Some(id) => label_ids.push(LabelId::from(id)),
                None => return Ok(Vec::new()),
            }
        }
        let mut keyed = Vec::with_capacity(identity.len());
        for (key, value) in identity {
            match self.state.dict.lookup(key) {
                Some(id) => keyed.push((PropId::from(id), value)),
                None => return Ok(Vec::new()),
            }
        }

        let mut best: Option<Vec<NodeId>> = None;
        for label in &label_ids {
            for (prop, value) in &keyed {
                let Some(hits) = self.state.property_lookup(self.graph, *label, *prop, value)
                else {
                    continue;
                };
                if best.as_ref().map_or(true, |b| hits.len() < b.len()) {
                    best = Some(hits);
                }
            }
        }
        if let Some(hits) = best {
            trace!(hits = hits.len(), "merge.candidates.index");
            return Ok(hits);
        }

        let narrowest = label_ids
            .iter()
            .copied()
            .min_by_key(|label| self.state.labels.cardinality(*label));
        match narrowest {
            Some(label) => self.label_scan(label),
            None => self.scan_nodes(),
        }
    }

    fn edge_candidates(&self, start: NodeId, ty: &str, end: NodeId) -> Result<Vec<EdgeId>> {
        match self.state.dict.lookup(ty) {
            Some(id) => self.edges_between(start, TypeId::from(id), end),
            None => Ok(Vec::new()),
        }
    }
}

impl MergeStore for WriteTx<'_> {
    fn candidates(&self, shape: &Shape, identity: &PropertyMap) -> Result<Vec<EntityId>> {
        self.check_live()?;
        match shape {
            Shape::Node { labels } => Ok(self
                .node_candidates(labels, identity)?
                .into_iter()
                .map(EntityId::Node)
                .collect()),
            Shape::Relationship { start, ty, end } => Ok(self
                .edge_candidates(*start, ty, *end)?
                .into_iter()
                .map(EntityId::Relationship)
                .collect()),
        }
    }

    fn load(&self, id: EntityId) -> Result<Option<Entity>> {
        match id {
            EntityId::Node(id) => Ok(self.node_view(id)?.map(Entity::Node)),
            EntityId::Relationship(id) => Ok(self.edge_view(id)?.map(Entity::Relationship)),
        }
    }

    fn create(&mut self, shape: &Shape, seed: &PropertyMap) -> Result<Entity> {
        match shape {
            Shape::Node { labels } => {
                let names: Vec<&str> = labels.iter().map(String::as_str).collect();
                let id = self.create_node_with(&names, seed)?;
                self.node_view(id)?
                    .map(Entity::Node)
                    .ok_or(GraphError::NotFound("node"))
            }
            Shape::Relationship { start, ty, end } => {
                let id = self.create_edge_with(*start, ty, *end, seed)?;
                self.edge_view(id)?
                    .map(Entity::Relationship)
                    .ok_or(GraphError::NotFound("edge"))
            }
        }
    }

    fn set_properties(&mut self, id: EntityId, partial: &PropertyMap) -> Result<Entity> {
        self.check_live()?;
        let entries = self.prop_entries(partial)?;
        match id {
            EntityId::Node(node) => {
                self.update_node(node, PropPatch::new(entries))?;
                self.node_view(node)?
                    .map(Entity::Node)
                    .ok_or(GraphError::NotFound("node"))
            }
            EntityId::Relationship(edge) => {
                self.update_edge(edge, PropPatch::new(entries))?;
                self.edge_view(edge)?
                    .map(Entity::Relationship)
                    .ok_or(GraphError::NotFound("edge"))
            }
        }
    }

    fn has_unique_constraint(&self, label: &str, key: &str) -> bool {
        match (self.state.dict.lookup(label), self.state.dict.lookup(key)) {
            (Some(label), Some(key)) => self.is_unique(LabelId::from(label), PropId::from(key)),
            _ => false,
        }
    }
}
