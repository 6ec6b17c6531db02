//! Normalise PropBank pointer records and count their labels.
//!
//! A pointer file holds one record per line: fixed positional fields
//! (path, sentence, token, annotator, `lemma.sense`, ...) followed by role
//! pointers of the form `address:height-ROLE`. A pass parses every line
//! losslessly, canonicalises the role labels, optionally sorts, filters, and
//! rewrites the records, and reports lemma/predicate/role/sense frequencies.
//!
//! # Example
//! ```no_run
//! use std::path::Path;
//! use semlink_props::{RecordPipeline, TransformOptions, transform_file};
//!
//! # fn main() -> anyhow::Result<()> {
//! let options = TransformOptions::semlink()?.with_sort_columns(vec![0, 1, 2]);
//! let pipeline = RecordPipeline::new(options)?;
//! let summary = transform_file(&pipeline, Path::new("props.txt"), Path::new("props.txt.out"))?;
//! println!("{} records kept", summary.remaining);
//! # Ok(()) }
//! ```

pub mod pipeline;
pub mod record;
pub mod roles;
pub mod stats;

pub use pipeline::{
    RecordPipeline, Rewrite, SEMLINK_FILTER, SEMLINK_REPLACE, SEMLINK_SEARCH, TransformError,
    TransformOptions, TransformSummary, Transformed, normalize_replacement, transform_file,
};
pub use record::Record;
pub use roles::{CleanedToken, LegacyTopicScope, RecordRoles, RoleCleaner, RoleError, RolePatterns};
pub use stats::{Counts, PropStats};
