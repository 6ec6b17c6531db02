use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use semlink_types::{PredicateSense, RecordLayout};
use tracing::warn;

use crate::roles::RolePatterns;

/// Frequency counter that remembers first-seen order for tie breaking.
#[derive(Clone, Debug, Default)]
pub struct Counts {
    slots: HashMap<String, usize>,
    entries: Vec<(String, usize)>,
}

impl Counts {
    pub fn add(&mut self, key: &str) {
        match self.slots.get(key) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.slots.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), 1));
            }
        }
    }

    pub fn get(&self, key: &str) -> usize {
        self.slots.get(key).map_or(0, |&slot| self.entries[slot].1)
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries by descending count; ties keep first-seen order.
    pub fn ranked(&self) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .entries
            .iter()
            .map(|(key, n)| (key.as_str(), *n))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// Grand total on the first line, then one `label\tcount` line per entry.
    pub fn write_to<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        writeln!(out, "{}", self.total())?;
        for (key, n) in self.ranked() {
            writeln!(out, "{key}\t{n}")?;
        }
        out.flush()
    }
}

/// Lemma, predicate, role, and sense frequencies over finished records.
#[derive(Clone, Debug, Default)]
pub struct PropStats {
    pub lemmas: Counts,
    pub predicates: Counts,
    pub roles: Counts,
    pub senses: Counts,
}

impl PropStats {
    pub fn collect<'a, I>(lines: I, layout: &RecordLayout, patterns: &RolePatterns) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut stats = Self::default();
        for (idx, line) in lines.into_iter().enumerate() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let Some(predicate) = fields.get(layout.sense_field) else {
                warn!("record {}: no predicate field, not counted", idx + 1);
                continue;
            };
            let sense = PredicateSense::parse(predicate);
            stats.lemmas.add(sense.lemma);
            stats.predicates.add(predicate);
            stats.senses.add(sense.sense);
            for token in fields.iter().skip(layout.role_start) {
                stats.roles.add(patterns.role_part(token));
            }
        }
        stats
    }

    /// Write `<base>.lemmas.txt`, `.preds.txt`, `.roles.txt`, and `.senses.txt`.
    pub fn write_all(&self, base: &Path) -> Result<()> {
        for (suffix, counts) in [
            (".lemmas.txt", &self.lemmas),
            (".preds.txt", &self.predicates),
            (".roles.txt", &self.roles),
            (".senses.txt", &self.senses),
        ] {
            let path = with_suffix(base, suffix);
            let file =
                File::create(&path).with_context(|| format!("create {}", path.display()))?;
            counts
                .write_to(BufWriter::new(file))
                .with_context(|| format!("write {}", path.display()))?;
        }
        Ok(())
    }
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
