use std::io::Read;

use semlink_types::{GroupingTable, MappingCollection};
use tracing::debug;

use crate::MappingError;

/// Read a flat `{"fine id": "grouped id"}` JSON object.
pub fn read_grouping_json<R: Read>(reader: R) -> Result<GroupingTable, MappingError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Rewrite `target_arg` in every rolemap through the grouping table.
///
/// Only existing values with a grouping entry are replaced; no key is ever
/// added, and empty values on either side are left alone. Returns the number
/// of rewritten mappings.
pub fn regroup(
    target_arg: &str,
    collection: &mut MappingCollection,
    groups: &GroupingTable,
) -> usize {
    let mut rewritten = 0;
    for mapping in collection.iter_mut() {
        let Some(value) = mapping.rolemap.get_mut(target_arg) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        match groups.get(value.as_str()) {
            Some(grouped) if !grouped.is_empty() => {
                debug!(
                    "{} ({}) arg {}: {} -> {}",
                    mapping.roleset, mapping.lemma, target_arg, value, grouped
                );
                *value = grouped.clone();
                rewritten += 1;
            }
            _ => {}
        }
    }
    rewritten
}
