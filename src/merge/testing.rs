#![cfg(test)]

//! Minimal store for engine unit tests. Candidate lists over-approximate on purpose.

use std::collections::BTreeMap;

use crate::storage::value::PropertyMap;
use crate::types::{EdgeId, GraphError, NodeId, Result};

use super::store::MergeStore;
use super::types::{Entity, EntityId, Node, Relationship, Shape};

#[derive(Default)]
pub(crate) struct MemStore {
    entities: BTreeMap<EntityId, Entity>,
    next_id: u64,
    pub(crate) unique: Vec<(String, String)>,
    pub(crate) fail_candidates: Option<GraphError>,
    pub(crate) fail_create: Option<GraphError>,
    /// Fails the n-th `set_properties` call (0-based).
    pub(crate) fail_set_at: Option<(usize, GraphError)>,
    pub(crate) creates: usize,
    pub(crate) sets: usize,
}

impl MemStore {
    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub(crate) fn add_node(&mut self, labels: &[&str], props: PropertyMap) -> NodeId {
        let id = NodeId(self.next());
        let mut labels: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        labels.sort();
        labels.dedup();
        self.entities
            .insert(EntityId::Node(id), Entity::Node(Node { id, labels, props }));
        id
    }

    pub(crate) fn add_rel(&mut self, start: NodeId, ty: &str, end: NodeId, props: PropertyMap) -> EdgeId {
        let id = EdgeId(self.next());
        self.entities.insert(
            EntityId::Relationship(id),
            Entity::Relationship(Relationship {
                id,
                ty: ty.to_owned(),
                start,
                end,
                props,
            }),
        );
        id
    }

    pub(crate) fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub(crate) fn set(&mut self, id: EntityId, props: PropertyMap) {
        if let Some(entity) = self.entities.get_mut(&id) {
            let target = match entity {
                Entity::Node(node) => &mut node.props,
                Entity::Relationship(rel) => &mut rel.props,
            };
            target.extend(props);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entities.len()
    }
}

impl MergeStore for MemStore {
    fn candidates(&self, shape: &Shape, _identity: &PropertyMap) -> Result<Vec<EntityId>> {
        if let Some(err) = &self.fail_candidates {
            return Err(err.clone());
        }
        let want_nodes = matches!(shape, Shape::Node { .. });
        Ok(self
            .entities
            .keys()
            .copied()
            .filter(|id| matches!(id, EntityId::Node(_)) == want_nodes)
            .collect())
    }

    fn load(&self, id: EntityId) -> Result<Option<Entity>> {
        Ok(self.entities.get(&id).cloned())
    }

    fn create(&mut self, shape: &Shape, seed: &PropertyMap) -> Result<Entity> {
        if let Some(err) = &self.fail_create {
            return Err(err.clone());
        }
        self.creates += 1;
        let id = match shape {
            Shape::Node { labels } => {
                let names: Vec<&str> = labels.iter().map(String::as_str).collect();
                EntityId::Node(self.add_node(&names, seed.clone()))
            }
            Shape::Relationship { start, ty, end } => {
                EntityId::Relationship(self.add_rel(*start, ty, *end, seed.clone()))
            }
        };
        self.entities.get(&id).cloned().ok_or(GraphError::NotFound("entity"))
    }

    fn set_properties(&mut self, id: EntityId, partial: &PropertyMap) -> Result<Entity> {
        if let Some((at, err)) = &self.fail_set_at {
            if *at == self.sets {
                return Err(err.clone());
            }
        }
        self.sets += 1;
        self.set(id, partial.clone());
        self.entities.get(&id).cloned().ok_or(GraphError::NotFound("entity"))
    }

    fn has_unique_constraint(&self, label: &str, key: &str) -> bool {
        self.unique.iter().any(|(l, k)| l == label && k == key)
    }
}
