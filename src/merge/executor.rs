//! The merge entry points: validation, resolution, then update or creation.

use tracing::{debug, debug_span, warn};

use crate::storage::value::PropertyMap;
use crate::types::{GraphError, NodeId};

use super::apply::apply_properties;
use super::errors::{MergeError, Result};
use super::factory::{create_entity, seed_properties};
use super::resolve::{resolve, MatchCursor};
use super::store::MergeStore;
use super::types::{
    CreationGuarantee, EagerPolicy, Entity, ExecutionMode, MergeOptions, MergePolicy,
    MergeRequest, MergeRows, Node, Relationship, Shape,
};
use super::validate::validate;

/// Runs merges against a store, inside whatever transaction the store represents.
///
/// The executor never commits or rolls back. A failed call returns an error and no rows;
/// if it failed midway through an eager fan-out, the updates already applied stay in the
/// caller's transaction until the caller rolls it back.
pub struct MergeExecutor<'s, S: MergeStore + ?Sized> {
    store: &'s mut S,
    options: MergeOptions,
}

impl<'s, S: MergeStore + ?Sized> MergeExecutor<'s, S> {
    /// Executor with default options.
    pub fn new(store: &'s mut S) -> Self {
        Self::with_options(store, MergeOptions::default())
    }

    /// Executor with explicit options.
    pub fn with_options(store: &'s mut S, options: MergeOptions) -> Self {
        Self { store, options }
    }

    /// Runs one merge request.
    ///
    /// With zero matches exactly one entity is created from the identity overlaid by the
    /// policy's create-time properties. Otherwise every match yields one row, in store
    /// order, with the on-match properties (eager policies only) applied.
    pub fn merge(&mut self, request: &MergeRequest) -> Result<MergeRows<Entity>> {
        validate(request)?;
        let span = debug_span!("merge", kind = request.shape.kind(), mode = ?request.mode);
        let _guard = span.enter();

        let empty = PropertyMap::new();
        let identity = request.identity.as_ref().unwrap_or(&empty);
        let rows = match request.mode {
            ExecutionMode::MaterializeThenMutate => {
                let matches = resolve(&*self.store, &request.shape, identity)?;
                let mut rows = Vec::with_capacity(matches.len());
                for entity in matches {
                    rows.push(self.on_match(entity, &request.policy)?);
                }
                rows
            }
            ExecutionMode::StreamAndMutate => {
                let mut cursor = MatchCursor::open(&*self.store, &request.shape, identity)?;
                let mut rows = Vec::new();
                while let Some(entity) = cursor.next_match(&*self.store)? {
                    rows.push(self.on_match(entity, &request.policy)?);
                }
                rows
            }
        };

        if !rows.is_empty() {
            debug!(matched = rows.len(), "merge.matched");
            return Ok(MergeRows::matched(rows));
        }

        let guarantee = self.creation_guarantee(&request.shape, request.identity.as_ref());
        if self.options.warn_without_unique_constraint && guarantee == CreationGuarantee::BestEffort
        {
            warn!(
                kind = request.shape.kind(),
                "creating without a unique constraint on the identity; concurrent merges may duplicate it"
            );
        }
        let seed = seed_properties(request.identity.as_ref(), request.policy.on_create());
        let entity = create_entity(&mut *self.store, &request.shape, &seed)?;
        Ok(MergeRows::created(entity))
    }

    fn on_match(&mut self, entity: Entity, policy: &MergePolicy) -> Result<Entity> {
        match policy.on_match() {
            Some(props) => apply_properties(&mut *self.store, entity, props),
            None => Ok(entity),
        }
    }

    /// Finds or creates a node; matches are returned unmodified and `create_props` is used
    /// only when creating.
    pub fn merge_node(
        &mut self,
        labels: &[&str],
        identity: Option<PropertyMap>,
        create_props: PropertyMap,
    ) -> Result<MergeRows<Node>> {
        let request = MergeRequest {
            shape: Shape::node(labels.iter().copied()),
            identity,
            policy: MergePolicy::Basic { create_props },
            mode: self.options.basic_mode,
        };
        self.merge(&request)?.try_map(into_node)
    }

    /// Finds or creates a relationship of type `ty` from `start` to `end`.
    ///
    /// A missing or empty identity matches any relationship of that type between the two
    /// nodes.
    pub fn merge_relationship(
        &mut self,
        start: NodeId,
        ty: &str,
        identity: Option<PropertyMap>,
        create_props: Option<PropertyMap>,
        end: NodeId,
    ) -> Result<MergeRows<Relationship>> {
        let request = MergeRequest {
            shape: Shape::relationship(start, ty, end),
            identity,
            policy: MergePolicy::Basic {
                create_props: create_props.unwrap_or_default(),
            },
            mode: self.options.basic_mode,
        };
        self.merge(&request)?.try_map(into_relationship)
    }

    /// Finds or creates a node, resolving every match before updating any of them.
    pub fn merge_node_eager(
        &mut self,
        labels: &[&str],
        identity: Option<PropertyMap>,
        policy: EagerPolicy,
    ) -> Result<MergeRows<Node>> {
        let request = MergeRequest {
            shape: Shape::node(labels.iter().copied()),
            identity,
            policy: MergePolicy::Eager(policy),
            mode: ExecutionMode::MaterializeThenMutate,
        };
        self.merge(&request)?.try_map(into_node)
    }

    /// Finds or creates a relationship, resolving every match before updating any of them.
    pub fn merge_relationship_eager(
        &mut self,
        start: NodeId,
        ty: &str,
        identity: Option<PropertyMap>,
        policy: EagerPolicy,
        end: NodeId,
    ) -> Result<MergeRows<Relationship>> {
        let request = MergeRequest {
            shape: Shape::relationship(start, ty, end),
            identity,
            policy: MergePolicy::Eager(policy),
            mode: ExecutionMode::MaterializeThenMutate,
        };
        self.merge(&request)?.try_map(into_relationship)
    }

    /// Whether a creation for `shape` and `identity` is protected against concurrent
    /// duplicates by the store.
    pub fn creation_guarantee(
        &self,
        shape: &Shape,
        identity: Option<&PropertyMap>,
    ) -> CreationGuarantee {
        let (Shape::Node { labels }, Some(identity)) = (shape, identity) else {
            return CreationGuarantee::BestEffort;
        };
        let covered = labels.iter().any(|label| {
            identity
                .keys()
                .any(|key| self.store.has_unique_constraint(label, key))
        });
        if covered {
            CreationGuarantee::ExactlyOnce
        } else {
            CreationGuarantee::BestEffort
        }
    }
}

fn wrong_kind(kind: &'static str) -> MergeError {
    MergeError::Resolution {
        kind,
        source: GraphError::Invalid("store returned an entity of the wrong kind"),
    }
}

fn into_node(entity: Entity) -> Result<Node> {
    entity.into_node().ok_or_else(|| wrong_kind("node"))
}

fn into_relationship(entity: Entity) -> Result<Relationship> {
    entity
        .into_relationship()
        .ok_or_else(|| wrong_kind("relationship"))
}
