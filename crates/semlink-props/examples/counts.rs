use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use semlink_props::{PropStats, RecordPipeline, TransformOptions};

const TOP: usize = 10;

fn main() -> Result<()> {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: cargo run -p semlink-props --example counts -- <pointers-file>")?;

    let content =
        fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let pipeline = RecordPipeline::new(TransformOptions::default())?;
    let transformed = pipeline.transform(content.split_inclusive('\n'))?;
    let stats = PropStats::collect(
        transformed.lines.iter().map(String::as_str),
        &pipeline.options().layout,
        pipeline.patterns(),
    );

    println!("Pointers file: {}", path.display());
    println!("Records kept : {}", transformed.summary.parsed);
    println!("Rejected     : {}", transformed.summary.rejected);
    for (name, counts) in [
        ("lemmas", &stats.lemmas),
        ("predicates", &stats.predicates),
        ("roles", &stats.roles),
        ("senses", &stats.senses),
    ] {
        println!("{name}: {} distinct, {} total", counts.len(), counts.total());
        for (label, n) in counts.ranked().into_iter().take(TOP) {
            println!("  {label:<20} {n}");
        }
    }

    Ok(())
}
