use crate::storage::value::PropValueOwned;
use crate::types::{LabelId, NodeId, PropId, TypeId};

/// Property entry associating a property ID with a value.
#[derive(Clone, Debug, PartialEq)]
pub struct PropEntry {
    /// The property identifier.
    pub prop: PropId,
    /// The property value.
    pub value: PropValueOwned,
}

impl PropEntry {
    /// Creates a new property entry.
    pub fn new(prop: PropId, value: PropValueOwned) -> Self {
        Self { prop, value }
    }
}

/// Specification for creating a new node.
#[derive(Clone, Debug)]
pub struct NodeSpec<'a> {
    /// Labels to assign to the node.
    pub labels: &'a [LabelId],
    /// Properties to set on the node.
    pub props: &'a [PropEntry],
}

/// Specification for creating a new edge.
#[derive(Clone, Debug)]
pub struct EdgeSpec<'a> {
    /// Source node ID.
    pub src: NodeId,
    /// Destination node ID.
    pub dst: NodeId,
    /// Edge type ID.
    pub ty: TypeId,
    /// Properties to set on the edge.
    pub props: &'a [PropEntry],
}
