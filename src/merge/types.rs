use serde::{Deserialize, Serialize};

use crate::storage::value::{props_from_json, PropValueOwned, PropertyMap, ValueError};
use crate::types::{EdgeId, NodeId};

/// A node as returned by a merge: labels sorted by name, properties by key.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Node {
    /// Store-assigned id.
    pub id: NodeId,
    /// Label names.
    pub labels: Vec<String>,
    /// Properties by name.
    pub props: PropertyMap,
}

impl Node {
    /// Returns true when the node carries `label`.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Returns the value of `key`, if present.
    pub fn prop(&self, key: &str) -> Option<&PropValueOwned> {
        self.props.get(key)
    }
}

/// A relationship as returned by a merge.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Relationship {
    /// Store-assigned id.
    pub id: EdgeId,
    /// Relationship type name.
    pub ty: String,
    /// Start node.
    pub start: NodeId,
    /// End node.
    pub end: NodeId,
    /// Properties by name.
    pub props: PropertyMap,
}

impl Relationship {
    /// Returns the value of `key`, if present.
    pub fn prop(&self, key: &str) -> Option<&PropValueOwned> {
        self.props.get(key)
    }
}

/// Structural part of a merge identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    /// Nodes carrying every one of `labels` (sorted, deduplicated).
    Node {
        /// Required labels.
        labels: Vec<String>,
    },
    /// Relationships of type `ty` from `start` to `end`.
    Relationship {
        /// Start node.
        start: NodeId,
        /// Relationship type.
        ty: String,
        /// End node.
        end: NodeId,
    },
}

impl Shape {
    /// Node shape from any collection of label names. Duplicates collapse.
    pub fn node<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        labels.sort();
        labels.dedup();
        Shape::Node { labels }
    }

    /// Relationship shape.
    pub fn relationship(start: NodeId, ty: impl Into<String>, end: NodeId) -> Self {
        Shape::Relationship {
            start,
            ty: ty.into(),
            end,
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Node { .. } => "node",
            Shape::Relationship { .. } => "relationship",
        }
    }
}

/// Reference to a stored entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityId {
    /// Node reference.
    Node(NodeId),
    /// Relationship reference.
    Relationship(EdgeId),
}

/// A loaded node or relationship.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    /// A node.
    Node(Node),
    /// A relationship.
    Relationship(Relationship),
}

impl Entity {
    /// Reference to this entity.
    pub fn id(&self) -> EntityId {
        match self {
            Entity::Node(node) => EntityId::Node(node.id),
            Entity::Relationship(rel) => EntityId::Relationship(rel.id),
        }
    }

    /// `"node"` or `"relationship"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Entity::Node(_) => "node",
            Entity::Relationship(_) => "relationship",
        }
    }

    /// Property map of this entity.
    pub fn props(&self) -> &PropertyMap {
        match self {
            Entity::Node(node) => &node.props,
            Entity::Relationship(rel) => &rel.props,
        }
    }

    /// Returns true when the entity has the structure described by `shape`.
    pub fn fits(&self, shape: &Shape) -> bool {
        match (self, shape) {
            (Entity::Node(node), Shape::Node { labels }) => {
                labels.iter().all(|label| node.has_label(label))
            }
            (Entity::Relationship(rel), Shape::Relationship { start, ty, end }) => {
                rel.start == *start && rel.end == *end && rel.ty == *ty
            }
            _ => false,
        }
    }

    /// Unwraps a node.
    pub fn into_node(self) -> Option<Node> {
        match self {
            Entity::Node(node) => Some(node),
            Entity::Relationship(_) => None,
        }
    }

    /// Unwraps a relationship.
    pub fn into_relationship(self) -> Option<Relationship> {
        match self {
            Entity::Relationship(rel) => Some(rel),
            Entity::Node(_) => None,
        }
    }
}

/// When matches are enumerated relative to the writes of one merge call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Candidates are examined one at a time and each match is updated before the next
    /// candidate is loaded.
    #[default]
    StreamAndMutate,
    /// Every match is loaded from one snapshot before the first write.
    MaterializeThenMutate,
}

/// Engine settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeOptions {
    /// Enumeration order used by the basic (create-only) merge APIs.
    pub basic_mode: ExecutionMode,
    /// Log a warning whenever an entity is created without a unique constraint covering
    /// its identity.
    pub warn_without_unique_constraint: bool,
}

/// On-create / on-match property sets of an eager merge.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EagerPolicy {
    /// Applied only to a newly created entity, over the identity properties.
    pub on_create_props: PropertyMap,
    /// Applied to every matched entity.
    pub on_match_props: PropertyMap,
}

impl EagerPolicy {
    /// Builds a policy from its two maps.
    pub fn new(on_create_props: PropertyMap, on_match_props: PropertyMap) -> Self {
        Self {
            on_create_props,
            on_match_props,
        }
    }

    /// Parses `{"onCreateProps": {...}, "onMatchProps": {...}}`; either key may be missing
    /// or null.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ValueError> {
        let field = |name: &str| -> Result<PropertyMap, ValueError> {
            match value.get(name) {
                Some(inner) => Ok(props_from_json(inner)?.unwrap_or_default()),
                None => Ok(PropertyMap::new()),
            }
        };
        if !(value.is_object() || value.is_null()) {
            return Err(ValueError {
                key: String::new(),
                reason: "merge policy must be a JSON object or null",
            });
        }
        Ok(Self {
            on_create_props: field("onCreateProps")?,
            on_match_props: field("onMatchProps")?,
        })
    }
}

/// What to write when creating versus matching.
#[derive(Clone, Debug, PartialEq)]
pub enum MergePolicy {
    /// Apply `create_props` on creation only; matches are returned unmodified.
    Basic {
        /// Properties laid over the identity on creation.
        create_props: PropertyMap,
    },
    /// Separate on-create and on-match property sets.
    Eager(EagerPolicy),
}

impl MergePolicy {
    pub(crate) fn on_create(&self) -> &PropertyMap {
        match self {
            MergePolicy::Basic { create_props } => create_props,
            MergePolicy::Eager(policy) => &policy.on_create_props,
        }
    }

    pub(crate) fn on_match(&self) -> Option<&PropertyMap> {
        match self {
            MergePolicy::Basic { .. } => None,
            MergePolicy::Eager(policy) => Some(&policy.on_match_props),
        }
    }
}

/// A complete merge call.
#[derive(Clone, Debug, PartialEq)]
pub struct MergeRequest {
    /// Labels, or type and endpoints.
    pub shape: Shape,
    /// Identifying properties; `None` means none were supplied.
    pub identity: Option<PropertyMap>,
    /// Write policy.
    pub policy: MergePolicy,
    /// Match enumeration order.
    pub mode: ExecutionMode,
}

/// Whether a merge created an entity or matched existing ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeOutcome {
    /// No entity matched; exactly one was created.
    Created,
    /// `count` entities matched and none was created.
    Matched {
        /// Number of matches (and rows).
        count: usize,
    },
}

/// Rows produced by one merge call.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MergeRows<T> {
    rows: Vec<T>,
    outcome: MergeOutcome,
}

impl<T> MergeRows<T> {
    pub(crate) fn created(row: T) -> Self {
        Self {
            rows: vec![row],
            outcome: MergeOutcome::Created,
        }
    }

    pub(crate) fn matched(rows: Vec<T>) -> Self {
        let count = rows.len();
        Self {
            rows,
            outcome: MergeOutcome::Matched { count },
        }
    }

    /// How the rows came about.
    pub fn outcome(&self) -> MergeOutcome {
        self.outcome
    }

    /// True when the call created an entity.
    pub fn was_created(&self) -> bool {
        self.outcome == MergeOutcome::Created
    }

    /// Rows in resolution order.
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Never true for a successful merge; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Consumes the result, returning the rows.
    pub fn into_rows(self) -> Vec<T> {
        self.rows
    }

    pub(crate) fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<MergeRows<U>, E> {
        Ok(MergeRows {
            rows: self.rows.into_iter().map(f).collect::<Result<Vec<U>, E>>()?,
            outcome: self.outcome,
        })
    }
}

impl<T> IntoIterator for MergeRows<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a MergeRows<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Whether a store prevents concurrent identical merges from creating duplicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationGuarantee {
    /// A unique constraint covers one of the identity keys under one of the labels, so a
    /// racing duplicate creation fails instead of succeeding.
    ExactlyOnce,
    /// Nothing in the store rejects duplicates; two concurrent merges of the same identity
    /// in separate transactions may both create.
    BestEffort,
}
