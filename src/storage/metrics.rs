use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Trait for tracking storage operations performed against the graph.
///
/// Implementations collect statistics about creations, property updates and the lookup
/// paths used to find entities, which is how callers can tell whether identity lookups
/// were served by an index or by a scan.
pub trait StorageMetrics: Send + Sync {
    /// Records the creation of a new node in the graph.
    fn node_created(&self);

    /// Records the creation of a new edge in the graph.
    fn edge_created(&self);

    /// Records a property patch applied to a node.
    fn node_updated(&self);

    /// Records a property patch applied to an edge.
    fn edge_updated(&self);

    /// Records a lookup served by a `(label, property)` index.
    fn index_lookup(&self);

    /// Records a scan over every node carrying a label.
    fn label_scan(&self);

    /// Records a scan over every node in the graph.
    fn full_scan(&self);

    /// Records a lookup of edges between two endpoints.
    fn adjacency_scan(&self);

    /// Records a transaction rolled back by drop.
    fn rollback(&self);
}

/// A no-op implementation of [`StorageMetrics`] that discards all recorded metrics.
#[derive(Default)]
pub struct NoopMetrics;

impl StorageMetrics for NoopMetrics {
    fn node_created(&self) {}
    fn edge_created(&self) {}
    fn node_updated(&self) {}
    fn edge_updated(&self) {}
    fn index_lookup(&self) {}
    fn label_scan(&self) {}
    fn full_scan(&self) {}
    fn adjacency_scan(&self) {}
    fn rollback(&self) {}
}

/// A thread-safe counter-based implementation of [`StorageMetrics`].
#[derive(Default)]
pub struct CounterMetrics {
    /// Number of nodes created.
    pub nodes_created: AtomicU64,

    /// Number of edges created.
    pub edges_created: AtomicU64,

    /// Number of node property patches applied.
    pub nodes_updated: AtomicU64,

    /// Number of edge property patches applied.
    pub edges_updated: AtomicU64,

    /// Number of property index lookups.
    pub index_lookups: AtomicU64,

    /// Number of label scans.
    pub label_scans: AtomicU64,

    /// Number of full node scans.
    pub full_scans: AtomicU64,

    /// Number of endpoint adjacency scans.
    pub adjacency_scans: AtomicU64,

    /// Number of rolled back transactions.
    pub rollbacks: AtomicU64,
}

impl CounterMetrics {
    /// Reads a counter.
    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}

impl StorageMetrics for CounterMetrics {
    fn node_created(&self) {
        self.nodes_created.fetch_add(1, Ordering::Relaxed);
    }

    fn edge_created(&self) {
        self.edges_created.fetch_add(1, Ordering::Relaxed);
    }

    fn node_updated(&self) {
        self.nodes_updated.fetch_add(1, Ordering::Relaxed);
    }

    fn edge_updated(&self) {
        self.edges_updated.fetch_add(1, Ordering::Relaxed);
    }

    fn index_lookup(&self) {
        self.index_lookups.fetch_add(1, Ordering::Relaxed);
    }

    fn label_scan(&self) {
        self.label_scans.fetch_add(1, Ordering::Relaxed);
    }

    fn full_scan(&self) {
        self.full_scans.fetch_add(1, Ordering::Relaxed);
    }

    fn adjacency_scan(&self) {
        self.adjacency_scans.fetch_add(1, Ordering::Relaxed);
    }

    fn rollback(&self) {
        self.rollbacks.fetch_add(1, Ordering::Relaxed);
    }
}

/// Returns the default metrics implementation (no-op).
pub fn default_metrics() -> Arc<dyn StorageMetrics> {
    Arc::new(NoopMetrics)
}
