use std::collections::BTreeMap;
use std::io::{Read, Write};

use semlink_types::{MappingCollection, RoleMap, VnMapping};
use serde::{Deserialize, Serialize};

use crate::MappingError;

/// One mapping as stored on disk. Field order is the sorted key order
/// (`roles`, `rs`, `vncls`) so the written document has sorted keys.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub roles: RoleMap,
    #[serde(rename = "rs")]
    pub roleset: String,
    pub vncls: String,
}

/// The on-disk shape: lemma to its mappings.
pub type LemmaDocument = BTreeMap<String, Vec<MappingEntry>>;

/// Group a roleset-keyed collection by lemma for writing.
pub fn to_document(collection: &MappingCollection) -> LemmaDocument {
    collection
        .by_lemma()
        .into_iter()
        .map(|(lemma, mappings)| {
            let entries = mappings
                .into_iter()
                .map(|m| MappingEntry {
                    roles: m.rolemap.clone(),
                    roleset: m.roleset.clone(),
                    vncls: m.vncls.clone(),
                })
                .collect();
            (lemma.to_string(), entries)
        })
        .collect()
}

/// Re-index a lemma-keyed document by roleset.
pub fn from_document(document: LemmaDocument) -> MappingCollection {
    let mut collection = MappingCollection::new();
    for (lemma, entries) in document {
        for entry in entries {
            collection.push(VnMapping::new(
                lemma.clone(),
                entry.roleset,
                entry.vncls,
                entry.roles,
            ));
        }
    }
    collection
}

/// Write the collection keyed by lemma, sorted keys, two-space indent.
/// Non-ASCII text is written as raw UTF-8, not `\u` escapes.
pub fn write_mappings_json<W: Write>(
    collection: &MappingCollection,
    writer: W,
) -> Result<(), MappingError> {
    serde_json::to_writer_pretty(writer, &to_document(collection))?;
    Ok(())
}

/// Read a lemma-keyed document back into a roleset-keyed collection.
pub fn read_mappings_json<R: Read>(reader: R) -> Result<MappingCollection, MappingError> {
    let document: LemmaDocument = serde_json::from_reader(reader)?;
    Ok(from_document(document))
}
