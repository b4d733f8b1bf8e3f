use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::storage::value::PropValueOwned;
use crate::types::{LabelId, NodeId, PropId};

/// Definition of a `(label, property)` index.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct IndexDef {
    /// Indexed label.
    pub label: LabelId,
    /// Indexed property key.
    pub prop: PropId,
}

type Postings = BTreeMap<Vec<u8>, BTreeSet<NodeId>>;

/// Exact-value postings per `(label, property)` pair, plus the unique constraints that
/// are enforced on top of them.
#[derive(Default)]
pub struct PropertyIndex {
    defs: FxHashMap<IndexDef, Postings>,
    unique: FxHashSet<IndexDef>,
}

impl PropertyIndex {
    pub fn has_index(&self, def: IndexDef) -> bool {
        self.defs.contains_key(&def)
    }

    pub fn is_unique(&self, def: IndexDef) -> bool {
        self.unique.contains(&def)
    }

    pub fn unique_defs(&self) -> impl Iterator<Item = IndexDef> + '_ {
        self.unique.iter().copied()
    }

    /// Registers an empty index. Returns false when it already existed.
    pub fn create(&mut self, def: IndexDef) -> bool {
        if self.defs.contains_key(&def) {
            return false;
        }
        self.defs.insert(def, Postings::new());
        true
    }

    pub fn drop_index(&mut self, def: IndexDef) {
        self.unique.remove(&def);
        self.defs.remove(&def);
    }

    pub fn mark_unique(&mut self, def: IndexDef) {
        self.unique.insert(def);
    }

    pub fn unmark_unique(&mut self, def: IndexDef) {
        self.unique.remove(&def);
    }

    /// Nodes indexed under `def` with exactly `value`, or `None` when no such index exists.
    pub fn lookup(&self, def: IndexDef, value: &PropValueOwned) -> Option<Vec<NodeId>> {
        let postings = self.defs.get(&def)?;
        Some(
            postings
                .get(&value.index_key())
                .map(|set| set.iter().copied().collect())
                .unwrap_or_default(),
        )
    }

    pub fn insert(
        &mut self,
        node: NodeId,
        labels: &[LabelId],
        props: &BTreeMap<PropId, PropValueOwned>,
    ) {
        self.visit(labels, props, |postings, key| {
            postings.entry(key).or_default().insert(node);
        });
    }

    pub fn remove(
        &mut self,
        node: NodeId,
        labels: &[LabelId],
        props: &BTreeMap<PropId, PropValueOwned>,
    ) {
        self.visit(labels, props, |postings, key| {
            if let Some(set) = postings.get_mut(&key) {
                set.remove(&node);
                if set.is_empty() {
                    postings.remove(&key);
                }
            }
        });
    }

    fn visit(
        &mut self,
        labels: &[LabelId],
        props: &BTreeMap<PropId, PropValueOwned>,
        mut f: impl FnMut(&mut Postings, Vec<u8>),
    ) {
        if self.defs.is_empty() {
            return;
        }
        for label in labels {
            for (prop, value) in props {
                let def = IndexDef {
                    label: *label,
                    prop: *prop,
                };
                if let Some(postings) = self.defs.get_mut(&def) {
                    f(postings, value.index_key());
                }
            }
        }
    }
}
