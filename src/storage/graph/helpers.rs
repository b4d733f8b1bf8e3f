use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::storage::types::PropEntry;
use crate::storage::value::PropValueOwned;
use crate::types::{GraphError, LabelId, PropId, Result};

pub(crate) fn normalize_labels(labels: &[LabelId], max: usize) -> Result<SmallVec<[LabelId; 4]>> {
    let mut result: SmallVec<[LabelId; 4]> = labels.iter().copied().collect();
    result.sort_by(|a, b| a.0.cmp(&b.0));
    result.dedup_by(|a, b| a.0 == b.0);
    if result.len() > max {
        return Err(GraphError::Invalid("too many labels for node"));
    }
    Ok(result)
}

/// Collects entries into a map; a later entry for the same key wins.
pub(crate) fn entries_to_map(entries: &[PropEntry]) -> Result<BTreeMap<PropId, PropValueOwned>> {
    let mut props = BTreeMap::new();
    for entry in entries {
        entry
            .value
            .check_shape()
            .map_err(|_| GraphError::Invalid("array property values must be flat and homogeneous"))?;
        props.insert(entry.prop, entry.value.clone());
    }
    Ok(props)
}
