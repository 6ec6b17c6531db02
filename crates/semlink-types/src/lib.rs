//! Shared types for PropBank pointer records and SemLink role mappings.
//!
//! Pointer records are plain text lines whose fields sit at fixed positions
//! (see [`RecordLayout`]); the predicate field is a `lemma.sense` string that
//! [`PredicateSense`] splits without allocating. Mapping data is modelled as
//! [`VnMapping`] values gathered into a roleset-keyed [`MappingCollection`].
//!
//! ```rust
//! use semlink_types::{PredicateSense, RecordLayout};
//!
//! let layout = RecordLayout::default();
//! assert!(layout.is_numeric(layout.token_field));
//! let pred = PredicateSense::parse("give.01");
//! assert_eq!((pred.lemma, pred.sense), ("give", "01"));
//! ```

use std::collections::BTreeMap;

/// PropBank argument label (`"0"`, `"1"`, ...) to VerbNet thematic role or grouped id.
pub type RoleMap = BTreeMap<String, String>;

/// Fine-grained VerbNet role/class id to its coarse grouped id.
pub type GroupingTable = BTreeMap<String, String>;

/// Positional field indices of a pointer record (whitespace-delimited fields).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RecordLayout {
    pub sentence_field: usize,
    pub token_field: usize,
    pub sense_field: usize,
    /// Index of the first role pointer; everything from here on is the tail.
    pub role_start: usize,
}

impl Default for RecordLayout {
    fn default() -> Self {
        Self {
            sentence_field: 1,
            token_field: 2,
            sense_field: 4,
            role_start: 6,
        }
    }
}

impl RecordLayout {
    /// Whether a column is compared as an integer when sorting.
    pub fn is_numeric(&self, column: usize) -> bool {
        column == self.sentence_field || column == self.token_field
    }
}

/// A predicate field split on its first `.` into lemma and sense id.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PredicateSense<'a> {
    pub lemma: &'a str,
    pub sense: &'a str,
}

impl<'a> PredicateSense<'a> {
    /// Split `lemma.sense`; a field without a dot is all lemma and an empty sense.
    pub fn parse(predicate: &'a str) -> Self {
        match predicate.split_once('.') {
            Some((lemma, sense)) => Self { lemma, sense },
            None => Self {
                lemma: predicate,
                sense: "",
            },
        }
    }
}

/// One `<argmap>`: a roleset of a lemma mapped onto a VerbNet class.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VnMapping {
    pub lemma: String,
    pub roleset: String,
    pub vncls: String,
    pub rolemap: RoleMap,
}

impl VnMapping {
    pub fn new(
        lemma: impl Into<String>,
        roleset: impl Into<String>,
        vncls: impl Into<String>,
        rolemap: RoleMap,
    ) -> Self {
        Self {
            lemma: lemma.into(),
            roleset: roleset.into(),
            vncls: vncls.into(),
            rolemap,
        }
    }
}

/// Roleset id to every mapping carrying it, in insertion order per roleset.
///
/// Several lemmas may contribute mappings under the same roleset id, so a
/// bucket can hold more than one entry.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MappingCollection {
    rolesets: BTreeMap<String, Vec<VnMapping>>,
}

impl MappingCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mapping to the bucket of its own roleset.
    pub fn push(&mut self, mapping: VnMapping) {
        self.rolesets
            .entry(mapping.roleset.clone())
            .or_default()
            .push(mapping);
    }

    /// Mappings stored under a roleset, or an empty slice.
    pub fn get(&self, roleset: &str) -> &[VnMapping] {
        self.rolesets
            .get(roleset)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterate `(roleset, mappings)` buckets in roleset order.
    pub fn rolesets(&self) -> impl Iterator<Item = (&str, &[VnMapping])> + '_ {
        self.rolesets
            .iter()
            .map(|(rs, mappings)| (rs.as_str(), mappings.as_slice()))
    }

    /// Iterate every mapping across all buckets.
    pub fn iter(&self) -> impl Iterator<Item = &VnMapping> + '_ {
        self.rolesets.values().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut VnMapping> + '_ {
        self.rolesets.values_mut().flatten()
    }

    /// Regroup every mapping under its lemma, keeping bucket order within a lemma.
    pub fn by_lemma(&self) -> BTreeMap<&str, Vec<&VnMapping>> {
        let mut lemmas: BTreeMap<&str, Vec<&VnMapping>> = BTreeMap::new();
        for mapping in self.iter() {
            lemmas.entry(mapping.lemma.as_str()).or_default().push(mapping);
        }
        lemmas
    }

    /// Number of distinct roleset ids.
    pub fn roleset_count(&self) -> usize {
        self.rolesets.len()
    }

    /// Number of mappings across all rolesets.
    pub fn len(&self) -> usize {
        self.rolesets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rolesets.is_empty()
    }
}
