use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use smallvec::SmallVec;
use tracing::debug;

use crate::storage::adjacency::Adjacency;
use crate::storage::catalog::{Dict, DictMetricsSnapshot};
use crate::storage::index::{IndexDef, LabelIndex, PropertyIndex};
use crate::storage::value::PropValueOwned;
use crate::types::{EdgeId, GraphError, LabelId, NodeId, PropId, Result, TypeId};

use super::metrics::StorageMetrics;
use super::options::GraphOptions;

mod edge_ops;
mod helpers;
mod index_ops;
mod merge_ops;
mod node_ops;

pub(crate) struct NodeRecord {
    labels: SmallVec<[LabelId; 4]>,
    props: BTreeMap<PropId, PropValueOwned>,
}

pub(crate) struct EdgeRecord {
    src: NodeId,
    dst: NodeId,
    ty: TypeId,
    props: BTreeMap<PropId, PropValueOwned>,
}

pub(crate) struct GraphState {
    dict: Dict,
    nodes: BTreeMap<NodeId, NodeRecord>,
    edges: BTreeMap<EdgeId, EdgeRecord>,
    next_node_id: u64,
    next_edge_id: u64,
    labels: LabelIndex,
    props: PropertyIndex,
    adjacency: Adjacency,
}

impl GraphState {
    fn new() -> Self {
        Self {
            dict: Dict::new(),
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            next_node_id: 1,
            next_edge_id: 1,
            labels: LabelIndex::default(),
            props: PropertyIndex::default(),
            adjacency: Adjacency::default(),
        }
    }
}

/// In-memory property graph with single-writer transactions.
///
/// Labels, relationship types and property keys are interned in a dictionary and only
/// reach the indexes as ids. Every label is indexed; `(label, property)` indexes and
/// unique constraints are opt-in per pair.
pub struct Graph {
    state: RwLock<GraphState>,
    metrics: Arc<dyn StorageMetrics>,
    max_labels_per_node: usize,
    use_property_indexes: bool,
}

impl Graph {
    /// Creates an empty graph.
    pub fn open(opts: GraphOptions) -> Self {
        Self {
            state: RwLock::new(GraphState::new()),
            metrics: opts.metrics.unwrap_or_else(super::metrics::default_metrics),
            max_labels_per_node: opts.max_labels_per_node,
            use_property_indexes: opts.use_property_indexes,
        }
    }

    /// Starts a read transaction. Any number of readers may run while no writer is active.
    pub fn begin_read(&self) -> ReadTx<'_> {
        ReadTx {
            graph: self,
            state: self.state.read(),
        }
    }

    /// Starts a write transaction, blocking until any other writer or reader finishes.
    ///
    /// Changes become permanent on [`WriteTx::commit`]; dropping the transaction without
    /// committing rolls every change back.
    pub fn begin_write(&self) -> WriteTx<'_> {
        WriteTx {
            graph: self,
            state: self.state.write(),
            undo: Vec::new(),
            terminated: Arc::new(AtomicBool::new(false)),
            committed: false,
        }
    }

    /// Returns dictionary counters.
    pub fn dict_metrics(&self) -> DictMetricsSnapshot {
        self.state.read().dict.metrics_snapshot()
    }
}

/// Change recorded by a write transaction so it can be reverted on rollback.
enum UndoEntry {
    NodeCreated(NodeId),
    EdgeCreated(EdgeId),
    NodeProps {
        id: NodeId,
        prev: BTreeMap<PropId, PropValueOwned>,
    },
    EdgeProps {
        id: EdgeId,
        prev: BTreeMap<PropId, PropValueOwned>,
    },
    IndexCreated(IndexDef),
    ConstraintCreated(IndexDef),
}

impl GraphState {
    fn undo(&mut self, entry: UndoEntry) {
        match entry {
            UndoEntry::NodeCreated(id) => {
                if let Some(rec) = self.nodes.remove(&id) {
                    self.labels.remove(id, &rec.labels);
                    self.props.remove(id, &rec.labels, &rec.props);
                }
            }
            UndoEntry::EdgeCreated(id) => {
                if let Some(rec) = self.edges.remove(&id) {
                    self.adjacency.remove(rec.src, rec.ty, rec.dst, id);
                }
            }
            UndoEntry::NodeProps { id, prev } => {
                if let Some(rec) = self.nodes.get_mut(&id) {
                    self.props.remove(id, &rec.labels, &rec.props);
                    rec.props = prev;
                    self.props.insert(id, &rec.labels, &rec.props);
                }
            }
            UndoEntry::EdgeProps { id, prev } => {
                if let Some(rec) = self.edges.get_mut(&id) {
                    rec.props = prev;
                }
            }
            UndoEntry::IndexCreated(def) => self.props.drop_index(def),
            UndoEntry::ConstraintCreated(def) => self.props.unmark_unique(def),
        }
    }
}

/// Handle that terminates a running write transaction from anywhere.
///
/// After termination every operation on the transaction fails with
/// [`GraphError::Terminated`]; the caller is expected to drop it, which rolls back.
#[derive(Clone, Debug)]
pub struct TxTerminator(Arc<AtomicBool>);

impl TxTerminator {
    /// Marks the transaction as terminated.
    pub fn terminate(&self) {
        self.0.store(true, AtomicOrdering::SeqCst);
    }

    /// Returns true once [`TxTerminator::terminate`] has been called.
    pub fn is_terminated(&self) -> bool {
        self.0.load(AtomicOrdering::SeqCst)
    }
}

/// Shared read access to a [`Graph`].
pub struct ReadTx<'g> {
    graph: &'g Graph,
    state: RwLockReadGuard<'g, GraphState>,
}

impl ReadTx<'_> {
    fn check_live(&self) -> Result<()> {
        Ok(())
    }
}

/// Exclusive write access to a [`Graph`].
pub struct WriteTx<'g> {
    graph: &'g Graph,
    state: RwLockWriteGuard<'g, GraphState>,
    undo: Vec<UndoEntry>,
    terminated: Arc<AtomicBool>,
    committed: bool,
}

impl WriteTx<'_> {
    fn check_live(&self) -> Result<()> {
        if self.terminated.load(AtomicOrdering::SeqCst) {
            return Err(GraphError::Terminated);
        }
        Ok(())
    }

    /// Returns a handle that can terminate this transaction.
    pub fn terminator(&self) -> TxTerminator {
        TxTerminator(Arc::clone(&self.terminated))
    }

    /// Makes every change of this transaction permanent.
    pub fn commit(mut self) -> Result<()> {
        self.check_live()?;
        debug!(changes = self.undo.len(), "graph.commit");
        self.undo.clear();
        self.committed = true;
        Ok(())
    }

    /// Number of changes recorded so far.
    pub fn pending_changes(&self) -> usize {
        self.undo.len()
    }
}

impl Drop for WriteTx<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if !self.undo.is_empty() {
            debug!(changes = self.undo.len(), "graph.rollback");
        }
        while let Some(entry) = self.undo.pop() {
            self.state.undo(entry);
        }
        self.graph.metrics.rollback();
    }
}

macro_rules! read_ops {
    ($tx:ident) => {
        impl $tx<'_> {
            /// Looks up the dictionary id of `name` without interning it.
            pub fn lookup_name(&self, name: &str) -> Result<Option<crate::types::StrId>> {
                self.check_live()?;
                Ok(self.state.dict.lookup(name))
            }

            /// Retrieves a node with names resolved.
            pub fn node_view(&self, id: NodeId) -> Result<Option<crate::merge::Node>> {
                self.check_live()?;
                self.state.node_view(id)
            }

            /// Retrieves an edge with names resolved.
            pub fn edge_view(&self, id: EdgeId) -> Result<Option<crate::merge::Relationship>> {
                self.check_live()?;
                self.state.edge_view(id)
            }

            /// Every node id in ascending order.
            pub fn scan_nodes(&self) -> Result<Vec<NodeId>> {
                self.check_live()?;
                self.graph.metrics.full_scan();
                Ok(self.state.nodes.keys().copied().collect())
            }

            /// Every node carrying `label`, in ascending id order.
            pub fn label_scan(&self, label: LabelId) -> Result<Vec<NodeId>> {
                self.check_live()?;
                self.graph.metrics.label_scan();
                Ok(self.state.labels.scan(label))
            }

            /// Nodes whose `prop` equals `value` among nodes carrying `label`, when an index
            /// covers the pair; `None` otherwise.
            pub fn property_lookup(
                &self,
                label: LabelId,
                prop: PropId,
                value: &PropValueOwned,
            ) -> Result<Option<Vec<NodeId>>> {
                self.check_live()?;
                Ok(self.state.property_lookup(self.graph, label, prop, value))
            }

            /// Edges of type `ty` from `src` to `dst`, ascending by id.
            pub fn edges_between(&self, src: NodeId, ty: TypeId, dst: NodeId) -> Result<Vec<EdgeId>> {
                self.check_live()?;
                self.graph.metrics.adjacency_scan();
                Ok(self.state.adjacency.between(src, ty, dst))
            }

            /// Returns true when a `(label, prop)` index exists.
            pub fn has_property_index(&self, label: LabelId, prop: PropId) -> bool {
                self.state.props.has_index(IndexDef { label, prop })
            }

            /// Returns true when a unique constraint covers `(label, prop)`.
            pub fn is_unique(&self, label: LabelId, prop: PropId) -> bool {
                self.state.props.is_unique(IndexDef { label, prop })
            }

            /// Number of nodes.
            pub fn node_count(&self) -> usize {
                self.state.nodes.len()
            }

            /// Number of edges.
            pub fn edge_count(&self) -> usize {
                self.state.edges.len()
            }
        }
    };
}

read_ops!(ReadTx);
read_ops!(WriteTx);
