use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use crate::types::{LabelId, NodeId};

/// Label → node postings. Every label is indexed; postings are kept sorted by node id.
#[derive(Default)]
pub struct LabelIndex {
    postings: FxHashMap<LabelId, BTreeSet<NodeId>>,
}

impl LabelIndex {
    pub fn insert(&mut self, node: NodeId, labels: &[LabelId]) {
        for label in labels {
            self.postings.entry(*label).or_default().insert(node);
        }
    }

    pub fn remove(&mut self, node: NodeId, labels: &[LabelId]) {
        for label in labels {
            if let Some(set) = self.postings.get_mut(label) {
                set.remove(&node);
                if set.is_empty() {
                    self.postings.remove(label);
                }
            }
        }
    }

    /// Number of nodes carrying `label`.
    pub fn cardinality(&self, label: LabelId) -> usize {
        self.postings.get(&label).map_or(0, BTreeSet::len)
    }

    pub fn scan(&self, label: LabelId) -> Vec<NodeId> {
        self.postings
            .get(&label)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }
}
