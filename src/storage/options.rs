use std::sync::Arc;

/// Default cap on labels per node.
pub const DEFAULT_MAX_LABELS_PER_NODE: usize = u8::MAX as usize;

/// Configuration options supplied when opening a [`super::Graph`].
#[derive(Clone)]
pub struct GraphOptions {
    /// Optional metrics collection implementation
    pub metrics: Option<Arc<dyn super::metrics::StorageMetrics>>,
    /// Maximum number of distinct labels a node may carry
    pub max_labels_per_node: usize,
    /// Whether lookups may use `(label, property)` indexes. When disabled, lookups fall
    /// back to label scans; results are the same either way.
    pub use_property_indexes: bool,
}

impl GraphOptions {
    /// Creates a new GraphOptions with default settings.
    pub fn new() -> Self {
        Self {
            metrics: None,
            max_labels_per_node: DEFAULT_MAX_LABELS_PER_NODE,
            use_property_indexes: true,
        }
    }

    /// Sets the metrics collection implementation.
    pub fn metrics(mut self, metrics: Arc<dyn super::metrics::StorageMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Sets the per-node label cap.
    pub fn max_labels_per_node(mut self, max: usize) -> Self {
        self.max_labels_per_node = max;
        self
    }

    /// Enables or disables property index use during lookups.
    pub fn use_property_indexes(mut self, enabled: bool) -> Self {
        self.use_property_indexes = enabled;
        self
    }
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self::new()
    }
}
