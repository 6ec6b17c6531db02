use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use semlink_types::RecordLayout;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::record::Record;
use crate::roles::{LegacyTopicScope, RecordRoles, RoleCleaner, RolePatterns};
use crate::stats::PropStats;

/// Drops pointers with core PropBank arguments, missing arguments, or the `-by` typo.
pub const SEMLINK_FILTER: &str = r"-ARG[^M]|\d-\s| -by";
/// Captures the leading four fields, the lemma, and the `VN=` sense of a joint PB/VN field.
pub const SEMLINK_SEARCH: &str = r"^((?:\S+\s+){4})(\S+?)\.[^;]+;VN=(\S+)";
pub const SEMLINK_REPLACE: &str = r"\1\2.\3";

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("line {line}: no field {column} to sort on")]
    MissingSortColumn { line: usize, column: usize },
    #[error("line {line}: sort field {column} is not numeric: {value:?}")]
    NonNumericSortColumn {
        line: usize,
        column: usize,
        value: String,
    },
}

/// A search pattern and its replacement, applied to every line.
#[derive(Clone, Debug)]
pub struct Rewrite {
    search: Regex,
    replacement: String,
}

impl Rewrite {
    /// `replacement` is a backslash template, see [`normalize_replacement`].
    pub fn new(search: &str, replacement: &str) -> Result<Self, TransformError> {
        Ok(Self {
            search: Regex::new(search)?,
            replacement: normalize_replacement(replacement),
        })
    }

    pub fn apply(&self, line: &str) -> String {
        self.search
            .replace_all(line, self.replacement.as_str())
            .into_owned()
    }
}

/// Everything a transform pass needs, compiled up front.
#[derive(Clone, Debug, Default)]
pub struct TransformOptions {
    pub filter: Option<Regex>,
    pub rewrite: Option<Rewrite>,
    pub sort_columns: Vec<usize>,
    pub legacy_topic: LegacyTopicScope,
    pub layout: RecordLayout,
}

impl TransformOptions {
    /// Defaults for SemLink pointers: drop core arguments, lift `VN=` senses.
    pub fn semlink() -> Result<Self, TransformError> {
        Ok(Self {
            filter: Some(Regex::new(SEMLINK_FILTER)?),
            rewrite: Some(Rewrite::new(SEMLINK_SEARCH, SEMLINK_REPLACE)?),
            ..Self::default()
        })
    }

    pub fn with_filter(mut self, pattern: &str) -> Result<Self, TransformError> {
        self.filter = Some(Regex::new(pattern)?);
        Ok(self)
    }

    pub fn with_rewrite(mut self, search: &str, replacement: &str) -> Result<Self, TransformError> {
        self.rewrite = Some(Rewrite::new(search, replacement)?);
        Ok(self)
    }

    pub fn with_sort_columns(mut self, columns: Vec<usize>) -> Self {
        self.sort_columns = columns;
        self
    }

    pub fn with_legacy_topic(mut self, scope: LegacyTopicScope) -> Self {
        self.legacy_topic = scope;
        self
    }
}

/// Counts reported at the end of a pass.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TransformSummary {
    /// Records that survived role cleaning.
    pub parsed: usize,
    /// Records dropped by the filter pattern.
    pub removed: usize,
    pub remaining: usize,
    /// Records dropped because a role token was malformed.
    pub rejected: usize,
}

#[derive(Clone, Debug)]
pub struct Transformed {
    pub lines: Vec<String>,
    pub summary: TransformSummary,
}

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
enum SortKey {
    Number(i64),
    Text(String),
}

/// Parse -> clean -> sort -> reassemble -> filter -> rewrite.
#[derive(Clone, Debug)]
pub struct RecordPipeline {
    cleaner: RoleCleaner,
    options: TransformOptions,
}

impl RecordPipeline {
    pub fn new(options: TransformOptions) -> Result<Self, TransformError> {
        let cleaner = RoleCleaner::new(RolePatterns::compile()?, options.legacy_topic);
        Ok(Self { cleaner, options })
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    pub fn patterns(&self) -> &RolePatterns {
        self.cleaner.patterns()
    }

    /// Run the pass over raw lines (each keeping its own line terminator).
    pub fn transform<'a, I>(&self, lines: I) -> Result<Transformed, TransformError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let layout = &self.options.layout;
        let mut rejected = 0usize;
        let mut records: Vec<(usize, Record)> = Vec::new();
        for (idx, line) in lines.into_iter().enumerate() {
            let lineno = idx + 1;
            let mut record = Record::parse(line);
            if record.field_count() < layout.role_start {
                debug!("line {lineno}: fewer than {} fields, skipped", layout.role_start);
                continue;
            }
            match self.cleaner.clean_tail(record.tail(layout)) {
                RecordRoles::Cleaned(tail) => {
                    record.replace_tail(layout, tail);
                    records.push((lineno, record));
                }
                RecordRoles::Rejected(err) => {
                    warn!("line {lineno}: {err}");
                    rejected += 1;
                }
            }
        }

        if !self.options.sort_columns.is_empty() {
            records = self.sort(records)?;
        }

        let parsed = records.len();
        let mut lines: Vec<String> = records.iter().map(|(_, r)| r.to_line()).collect();
        if let Some(filter) = &self.options.filter {
            lines.retain(|line| !filter.is_match(line));
        }
        if let Some(rewrite) = &self.options.rewrite {
            lines = lines.iter().map(|line| rewrite.apply(line)).collect();
        }

        let summary = TransformSummary {
            parsed,
            removed: parsed - lines.len(),
            remaining: lines.len(),
            rejected,
        };
        info!(
            "Processed {} props, removed {} ({} remaining)",
            summary.parsed, summary.removed, summary.remaining
        );
        Ok(Transformed { lines, summary })
    }

    fn sort(&self, records: Vec<(usize, Record)>) -> Result<Vec<(usize, Record)>, TransformError> {
        let mut keyed = records
            .into_iter()
            .map(|(lineno, record)| {
                let key = self.sort_key(lineno, &record)?;
                Ok((key, (lineno, record)))
            })
            .collect::<Result<Vec<_>, TransformError>>()?;
        // Stable: records with equal keys keep their input order.
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(keyed.into_iter().map(|(_, rec)| rec).collect())
    }

    fn sort_key(&self, line: usize, record: &Record) -> Result<Vec<SortKey>, TransformError> {
        self.options
            .sort_columns
            .iter()
            .map(|&column| {
                let value = record
                    .field(column)
                    .ok_or(TransformError::MissingSortColumn { line, column })?;
                if self.options.layout.is_numeric(column) {
                    value.parse::<i64>().map(SortKey::Number).map_err(|_| {
                        TransformError::NonNumericSortColumn {
                            line,
                            column,
                            value: value.to_string(),
                        }
                    })
                } else {
                    Ok(SortKey::Text(value.to_string()))
                }
            })
            .collect()
    }
}

/// Translate a backslash replacement template into `regex` syntax.
///
/// `\1` becomes `${1}`, `\\` a single backslash, `\n` and `\t` a newline
/// and a tab. A literal `$` is escaped; any other escape is kept verbatim.
pub fn normalize_replacement(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '$' => out.push_str("$$"),
            '\\' => match chars.peek().copied() {
                Some(d) if d.is_ascii_digit() => {
                    out.push_str("${");
                    while let Some(d) = chars.next_if(char::is_ascii_digit) {
                        out.push(d);
                    }
                    out.push('}');
                }
                Some(escaped @ ('\\' | 'n' | 't')) => {
                    chars.next();
                    out.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        other => other,
                    });
                }
                _ => out.push(ch),
            },
            _ => out.push(ch),
        }
    }
    out
}

/// Whole-file pass: transform `input`, write the result to `output`, and
/// write the four count tables next to it.
pub fn transform_file(
    pipeline: &RecordPipeline,
    input: &Path,
    output: &Path,
) -> Result<TransformSummary> {
    let content =
        fs::read_to_string(input).with_context(|| format!("read {}", input.display()))?;
    let transformed = pipeline
        .transform(content.split_inclusive('\n'))
        .with_context(|| format!("transform {}", input.display()))?;

    let stats = PropStats::collect(
        transformed.lines.iter().map(String::as_str),
        &pipeline.options().layout,
        pipeline.patterns(),
    );
    stats.write_all(output)?;

    fs::write(output, transformed.lines.concat())
        .with_context(|| format!("write {}", output.display()))?;
    Ok(transformed.summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(options: TransformOptions, lines: &[&str]) -> Transformed {
        RecordPipeline::new(options)
            .unwrap()
            .transform(lines.iter().copied())
            .unwrap()
    }

    #[test]
    fn identity_pass_keeps_well_formed_lines() {
        let line = "1  2  rel  give.01  0:1-ARG0 2:1-ARG1";
        let out = run(TransformOptions::default(), &[line]);
        assert_eq!(out.lines, vec![line]);
        assert_eq!(
            out.summary,
            TransformSummary {
                parsed: 1,
                removed: 0,
                remaining: 1,
                rejected: 0
            }
        );
    }

    #[test]
    fn filter_removes_core_argument_records() {
        let options = TransformOptions::default().with_filter("-ARG[^M]").unwrap();
        let out = run(
            options,
            &[
                "f 1 2 x give.01 y 0:1-ARG2\n",
                "f 1 3 x give.01 y 0:1-ARGM-TMP\n",
            ],
        );
        assert_eq!(out.lines, vec!["f 1 3 x give.01 y 0:1-ARGM-TMP\n"]);
        assert_eq!(out.summary.removed, 1);
        assert_eq!(out.summary.remaining, 1);
    }

    #[test]
    fn malformed_records_are_dropped_and_counted() {
        let out = run(
            TransformOptions::default(),
            &[
                "f 1 2 x give.01 y 0:1-ARG0\n",
                "f 1 3 x give.01 y ARG0\n",
                "f 1 4 x give.01 y 0:1-ARGM-XY\n",
            ],
        );
        assert_eq!(out.lines.len(), 1);
        assert_eq!(out.summary.parsed, 1);
        assert_eq!(out.summary.rejected, 2);
        assert_eq!(out.summary.removed, 0);
    }

    #[test]
    fn short_records_are_skipped() {
        let out = run(TransformOptions::default(), &["\n", "a b c\n", "f 1 2 x give.01\n"]);
        assert!(out.lines.is_empty());
        assert_eq!(out.summary.parsed, 0);
    }

    #[test]
    fn records_with_only_fixed_fields_are_kept() {
        let out = run(
            TransformOptions::default().with_sort_columns(vec![1]),
            &["f 2 1 x give.01 y\n", "f 1 1 x give.01 y 0:1-ARG0\n"],
        );
        assert_eq!(
            out.lines,
            vec!["f 1 1 x give.01 y 0:1-ARG0\n", "f 2 1 x give.01 y\n"]
        );
        assert_eq!(out.summary.parsed, 2);
        assert_eq!(out.summary.remaining, 2);
    }

    #[test]
    fn numeric_columns_sort_by_value() {
        let options = TransformOptions::default().with_sort_columns(vec![1, 2]);
        let out = run(
            options,
            &[
                "f 10 1 x a.01 y 0:1-ARG0\n",
                "f 9 2 x a.01 y 0:1-ARG0\n",
                "f 9 10 x a.01 y 0:1-ARG0\n",
            ],
        );
        assert_eq!(
            out.lines,
            vec![
                "f 9 2 x a.01 y 0:1-ARG0\n",
                "f 9 10 x a.01 y 0:1-ARG0\n",
                "f 10 1 x a.01 y 0:1-ARG0\n",
            ]
        );
    }

    #[test]
    fn text_columns_sort_lexically_and_stably() {
        let options = TransformOptions::default().with_sort_columns(vec![4]);
        let out = run(
            options,
            &[
                "b 1 1 x run.01 y 0:1-ARG0\n",
                "a 1 1 x give.01 y 0:1-ARG0\n",
                "c 1 1 x give.01 y 0:1-ARG0\n",
            ],
        );
        let firsts: Vec<&str> = out.lines.iter().map(|l| &l[..1]).collect();
        assert_eq!(firsts, vec!["a", "c", "b"]);
    }

    #[test]
    fn non_numeric_sort_field_is_an_error() {
        let pipeline =
            RecordPipeline::new(TransformOptions::default().with_sort_columns(vec![1])).unwrap();
        let err = pipeline
            .transform(["f one 2 x a.01 y 0:1-ARG0\n"])
            .unwrap_err();
        assert!(matches!(
            err,
            TransformError::NonNumericSortColumn { line: 1, column: 1, .. }
        ));
    }

    #[test]
    fn semlink_defaults_rewrite_sense_to_verbnet() {
        let out = run(
            TransformOptions::semlink().unwrap(),
            &[
                "wsj/00/wsj_0003.mrg 0 5 gold give.01;VN=13.1-1 ----- 0:1-Agent 3:0-Recipient\n",
                "wsj/00/wsj_0003.mrg 1 5 gold give.01;VN=13.1-1 ----- 0:1-ARG0 3:0-Recipient\n",
            ],
        );
        assert_eq!(
            out.lines,
            vec!["wsj/00/wsj_0003.mrg 0 5 gold give.13.1-1 ----- 0:1-Agent 3:0-Recipient\n"]
        );
        assert_eq!(out.summary.removed, 1);
    }

    #[test]
    fn translates_backslash_group_references() {
        assert_eq!(normalize_replacement(r"\1\2.\3"), "${1}${2}.${3}");
        assert_eq!(normalize_replacement(r"a\\b\12"), r"a\b${12}");
        assert_eq!(normalize_replacement(r"\d\t"), "\\d\t");
    }

    #[test]
    fn dollar_and_backslash_are_literal_in_replacements() {
        assert_eq!(Rewrite::new("(a)", r"US$\1x").unwrap().apply("a"), "US$ax");
        assert_eq!(Rewrite::new("a", r"\\").unwrap().apply("a"), r"\");
        assert_eq!(Rewrite::new("(a)", "${1}").unwrap().apply("a"), "${1}");
    }

    #[test]
    fn transform_file_writes_output_and_counts() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("props.txt");
        let output = dir.path().join("props.out");
        fs::write(
            &input,
            "f 1 2 x give.01 y 0:1-ARG0 2:1-ARG1*\nf 1 3 x take.01 y 0:1-ARG0\n",
        )
        .unwrap();

        let pipeline = RecordPipeline::new(TransformOptions::default()).unwrap();
        let summary = transform_file(&pipeline, &input, &output).unwrap();
        assert_eq!(summary.remaining, 2);
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "f 1 2 x give.01 y 0:1-ARG0 2:1-ARG1\nf 1 3 x take.01 y 0:1-ARG0\n"
        );
        let roles = fs::read_to_string(dir.path().join("props.out.roles.txt")).unwrap();
        assert_eq!(roles, "3\nARG0\t2\nARG1\t1\n");
    }
}
