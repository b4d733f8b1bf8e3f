use crate::storage::types::PropEntry;

/// A batch of property assignments applied to one node or edge.
///
/// Patches only ever overwrite or add keys; properties not named in the patch are kept.
#[derive(Clone, Debug, Default)]
pub struct PropPatch {
    /// Assignments in application order. A later entry for the same key wins.
    pub sets: Vec<PropEntry>,
}

impl PropPatch {
    /// Creates a new property patch from a vector of assignments.
    pub fn new(sets: Vec<PropEntry>) -> Self {
        Self { sets }
    }

    /// Returns true if this patch contains no assignments.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
