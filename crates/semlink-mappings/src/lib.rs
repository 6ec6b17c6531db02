//! SemLink PropBank-to-VerbNet mappings: XML in, JSON out, argument regrouping.
//!
//! The SemLink `type_map.xml` resource nests `predicate[@lemma]` >
//! `argmap[@pb-roleset, @vn-class]` > `role[@pb-arg, @vn-theta]`. Loading it
//! yields a roleset-keyed [`MappingCollection`]; storing it writes a
//! lemma-keyed JSON document (`{lemma: [{roles, rs, vncls}]}`), and reading
//! that document re-indexes it by roleset again. [`regroup`] rewrites one
//! PropBank argument's VerbNet value through a coarser grouping table.
//!
//! # Example
//! ```no_run
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! semlink_mappings::xml_to_json(Path::new("data/type_map.xml"), Path::new("data/type_map.json"))?;
//! let regrouped = semlink_mappings::regroup_json(
//!     Path::new("data/type_map.json"),
//!     "2",
//!     Path::new("mappings/ylp2007-a2.json"),
//!     Path::new("mappings/semlink-ylp2007-a2.json"),
//! )?;
//! println!("{} rolesets", regrouped.roleset_count());
//! # Ok(()) }
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use semlink_types::{GroupingTable, MappingCollection};
use thiserror::Error;
use tracing::info;

pub mod loader;
pub mod regroup;
pub mod store;

pub use loader::MappingLoader;
pub use regroup::{read_grouping_json, regroup};
pub use store::{
    LemmaDocument, MappingEntry, from_document, read_mappings_json, to_document,
    write_mappings_json,
};

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("repeat lemma found in mappings file: {lemma}")]
    DuplicateLemma { lemma: String },
    #[error("non deterministic mapping for {lemma} ({roleset}) arg {arg}")]
    NonDeterministicMapping {
        lemma: String,
        roleset: String,
        arg: String,
    },
    #[error("<{element}> without required attribute {attribute}")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed XML attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load a mappings XML file.
pub fn load_mappings_xml(path: &Path) -> Result<MappingCollection> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let collection = MappingLoader::new()
        .read(BufReader::new(file))
        .with_context(|| format!("load mappings from {}", path.display()))?;
    info!(
        "loaded {} mappings over {} rolesets from {}",
        collection.len(),
        collection.roleset_count(),
        path.display()
    );
    Ok(collection)
}

/// Load a lemma-keyed mappings JSON file, indexed by roleset.
pub fn load_mappings_json(path: &Path) -> Result<MappingCollection> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    read_mappings_json(BufReader::new(file))
        .with_context(|| format!("read mappings from {}", path.display()))
}

pub fn save_mappings_json(collection: &MappingCollection, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_mappings_json(collection, &mut writer)
        .and_then(|()| writer.flush().map_err(MappingError::from))
        .with_context(|| format!("write mappings to {}", path.display()))
}

pub fn load_grouping_json(path: &Path) -> Result<GroupingTable> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    read_grouping_json(BufReader::new(file))
        .with_context(|| format!("read grouping table from {}", path.display()))
}

/// Convert the XML resource into the lemma-keyed JSON document.
pub fn xml_to_json(xml: &Path, output: &Path) -> Result<MappingCollection> {
    let collection = load_mappings_xml(xml)?;
    save_mappings_json(&collection, output)?;
    Ok(collection)
}

/// Regroup `target_arg` of stored mappings through a grouping table and
/// write the result to `output`.
pub fn regroup_json(
    mappings: &Path,
    target_arg: &str,
    grouping: &Path,
    output: &Path,
) -> Result<MappingCollection> {
    let mut collection = load_mappings_json(mappings)?;
    let groups = load_grouping_json(grouping)?;
    let rewritten = regroup(target_arg, &mut collection, &groups);
    info!(
        "arg {target_arg}: regrouped {rewritten} of {} mappings using {}",
        collection.len(),
        grouping.display()
    );
    save_mappings_json(&collection, output)?;
    Ok(collection)
}
