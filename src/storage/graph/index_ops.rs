use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use tracing::debug;

use super::{GraphState, UndoEntry, WriteTx};
use crate::storage::index::IndexDef;
use crate::types::{GraphError, NodeId, Result, StrId};

impl GraphState {
    /// Registers `def` and back-fills it from existing nodes. Returns false if it existed.
    fn build_index(&mut self, def: IndexDef) -> bool {
        if !self.props.create(def) {
            return false;
        }
        for id in self.labels.scan(def.label) {
            let Some(rec) = self.nodes.get(&id) else {
                continue;
            };
            if let Some(value) = rec.props.get(&def.prop) {
                let single = BTreeMap::from([(def.prop, value.clone())]);
                self.props.insert(id, &[def.label], &single);
            }
        }
        true
    }

    fn verify_unique(&self, def: IndexDef) -> Result<()> {
        let mut seen: FxHashMap<Vec<u8>, NodeId> = FxHashMap::default();
        for id in self.labels.scan(def.label) {
            let Some(value) = self.nodes.get(&id).and_then(|rec| rec.props.get(&def.prop)) else {
                continue;
            };
            if seen.insert(value.index_key(), id).is_some() {
                return Err(GraphError::ConstraintViolation {
                    label: self.dict.resolve(StrId::from(def.label))?.to_owned(),
                    prop: self.dict.resolve(StrId::from(def.prop))?.to_owned(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl WriteTx<'_> {
    fn index_def(&mut self, label: &str, prop: &str) -> Result<IndexDef> {
        if label.is_empty() || prop.is_empty() {
            return Err(GraphError::Invalid("index label and property must not be empty"));
        }
        Ok(IndexDef {
            label: self.state.dict.intern(label)?.into(),
            prop: self.state.dict.intern(prop)?.into(),
        })
    }

    /// Creates an exact-value index on `(label, prop)`. Returns false if it already existed.
    pub fn create_property_index(&mut self, label: &str, prop: &str) -> Result<bool> {
        self.check_live()?;
        let def = self.index_def(label, prop)?;
        let created = self.state.build_index(def);
        if created {
            self.undo.push(UndoEntry::IndexCreated(def));
            debug!(label, prop, "graph.create_property_index");
        }
        Ok(created)
    }

    /// Requires `prop` to be unique among nodes carrying `label`.
    ///
    /// The pair is indexed as a side effect. Fails with
    /// [`GraphError::ConstraintViolation`] if existing data already holds a duplicate.
    pub fn create_unique_constraint(&mut self, label: &str, prop: &str) -> Result<()> {
        self.check_live()?;
        let def = self.index_def(label, prop)?;
        if self.state.props.is_unique(def) {
            return Ok(());
        }
        if self.state.build_index(def) {
            self.undo.push(UndoEntry::IndexCreated(def));
        }
        self.state.verify_unique(def)?;
        self.state.props.mark_unique(def);
        self.undo.push(UndoEntry::ConstraintCreated(def));
        debug!(label, prop, "graph.create_unique_constraint");
        Ok(())
    }
}
