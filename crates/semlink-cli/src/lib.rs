//! Command surface of the `semlink` binary.
//!
//! Each subcommand is one whole-file pass: `props` cleans and transforms a
//! PropBank pointer file, `xml-to-json` converts the SemLink type map,
//! `regroup` rewrites one argument through a grouping table, and `bootstrap`
//! runs the conversion plus both standard regroupings over default paths.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use semlink_mappings::{regroup_json, xml_to_json};
use semlink_props::{
    LegacyTopicScope, RecordPipeline, SEMLINK_FILTER, SEMLINK_REPLACE, SEMLINK_SEARCH,
    TransformOptions, TransformSummary, transform_file,
};
use semlink_types::MappingCollection;
use tracing::{Subscriber, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_MAPPINGS_DIR: &str = "mappings";
const TYPE_MAP_XML: &str = "type_map.xml";
const TYPE_MAP_JSON: &str = "type_map.json";
/// `(target argument, grouping table name)` pairs regrouped by `bootstrap`.
const BOOTSTRAP_GROUPINGS: [(&str, &str); 2] = [("1", "ylp2007-a1"), ("2", "ylp2007-a2")];

#[derive(Parser, Debug)]
#[command(name = "semlink")]
#[command(about = "Sort, filter, and transform PropBank pointers; convert and regroup SemLink mappings")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clean, sort, filter, and rewrite a PropBank pointers file.
    Props(PropsArgs),
    /// Convert a SemLink type map XML file into lemma-keyed JSON.
    XmlToJson {
        #[arg(long)]
        xml: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Rewrite one PropBank argument's VerbNet value through a grouping table.
    Regroup {
        /// Lemma-keyed mappings JSON.
        #[arg(long)]
        mappings: PathBuf,
        /// Core PropBank argument to rewrite (e.g. `2`).
        #[arg(long)]
        arg: String,
        /// JSON object mapping VerbNet roles onto grouped roles.
        #[arg(long)]
        groups: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Convert `<data>/type_map.xml` and regroup arguments 1 and 2.
    Bootstrap(BootstrapArgs),
}

#[derive(Args, Debug)]
pub struct PropsArgs {
    /// PropBank pointers file.
    #[arg(long = "pb")]
    pub input: PathBuf,
    /// Output path; defaults to `<pb>.out`.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Drop pointers matching this regex, e.g. "-ARG[^M]" removes core PB arguments.
    #[arg(long, allow_hyphen_values = true)]
    pub filter: Option<String>,
    /// Regex searched in every pointer line; needs --replace.
    #[arg(long, allow_hyphen_values = true)]
    pub search: Option<String>,
    /// Replacement for --search; `\1` refers to a group, `$` is literal.
    #[arg(long, allow_hyphen_values = true)]
    pub replace: Option<String>,
    /// Comma-separated field indices to sort by, e.g. "4,0,1".
    #[arg(long, value_delimiter = ',', default_value = "0,1,2")]
    pub sort_columns: Vec<usize>,
    /// Use SemLink defaults: drop core PropBank arguments, change senses to VerbNet.
    #[arg(long)]
    pub semlink: bool,
    /// Reach of the legacy `announcement` -> `Topic` correction.
    #[arg(long, value_enum, default_value_t = TopicScope::WholeRecord)]
    pub legacy_topic: TopicScope,
}

#[derive(Args, Debug)]
pub struct BootstrapArgs {
    #[arg(long, env = "SEMLINK_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,
    #[arg(long, env = "SEMLINK_MAPPINGS_DIR", default_value = DEFAULT_MAPPINGS_DIR)]
    pub mappings_dir: PathBuf,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum TopicScope {
    WholeRecord,
    SingleToken,
}

impl From<TopicScope> for LegacyTopicScope {
    fn from(scope: TopicScope) -> Self {
        match scope {
            TopicScope::WholeRecord => LegacyTopicScope::WholeRecord,
            TopicScope::SingleToken => LegacyTopicScope::SingleToken,
        }
    }
}

/// Log formatter for the binary; every `RUST_LOG` directive in `env_filter` applies.
pub fn log_subscriber<W>(env_filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_writer(writer)
        .finish()
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Props(args) => {
            run_props(&args)?;
        }
        Commands::XmlToJson { xml, output } => {
            xml_to_json(&xml, &output)?;
            info!("wrote {}", output.display());
        }
        Commands::Regroup {
            mappings,
            arg,
            groups,
            output,
        } => {
            regroup_json(&mappings, &arg, &groups, &output)?;
            info!("wrote {}", output.display());
        }
        Commands::Bootstrap(args) => {
            run_bootstrap(&args)?;
        }
    }
    Ok(())
}

pub fn run_props(args: &PropsArgs) -> Result<TransformSummary> {
    let output = args.output.clone().unwrap_or_else(|| default_output(&args.input));
    let pipeline = RecordPipeline::new(transform_options(args)?)?;
    let summary = transform_file(&pipeline, &args.input, &output)?;
    if summary.rejected > 0 {
        warn!("{} malformed props dropped", summary.rejected);
    }
    info!("wrote {}", output.display());
    Ok(summary)
}

/// Assemble pass options; explicit patterns win over the SemLink defaults.
pub fn transform_options(args: &PropsArgs) -> Result<TransformOptions> {
    let mut filter = args.filter.clone();
    let mut search = args.search.clone();
    let mut replace = args.replace.clone();
    if args.semlink {
        filter.get_or_insert_with(|| SEMLINK_FILTER.to_string());
        search.get_or_insert_with(|| SEMLINK_SEARCH.to_string());
        replace.get_or_insert_with(|| SEMLINK_REPLACE.to_string());
    }

    let mut options = TransformOptions::default()
        .with_sort_columns(args.sort_columns.clone())
        .with_legacy_topic(args.legacy_topic.into());
    if let Some(filter) = filter {
        options = options.with_filter(&filter)?;
    }
    match (search, replace) {
        (Some(search), Some(replace)) => options = options.with_rewrite(&search, &replace)?,
        (Some(_), None) | (None, Some(_)) => {
            warn!("--search and --replace must be given together; no rewrite applied")
        }
        (None, None) => {}
    }
    Ok(options)
}

/// SemLink XML -> JSON, then the standard argument regroupings.
pub fn run_bootstrap(args: &BootstrapArgs) -> Result<Vec<MappingCollection>> {
    let json = args.data_dir.join(TYPE_MAP_JSON);
    xml_to_json(&args.data_dir.join(TYPE_MAP_XML), &json)?;
    info!("wrote {}", json.display());

    let mut regrouped = Vec::with_capacity(BOOTSTRAP_GROUPINGS.len());
    for (arg, name) in BOOTSTRAP_GROUPINGS {
        let grouping = args.mappings_dir.join(format!("{name}.json"));
        let output = args.mappings_dir.join(format!("semlink-{name}.json"));
        regrouped.push(regroup_json(&json, arg, &grouping, &output)?);
        info!("wrote {}", output.display());
    }
    Ok(regrouped)
}

fn default_output(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".out");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("semlink").chain(args.iter().copied())).unwrap()
    }

    fn props(args: &[&str]) -> PropsArgs {
        match parse(args).command {
            Commands::Props(props) => props,
            other => panic!("expected props, got {other:?}"),
        }
    }

    #[test]
    fn props_defaults() {
        let args = props(&["props", "--pb", "in.txt"]);
        assert_eq!(args.sort_columns, vec![0, 1, 2]);
        assert!(!args.semlink);
        assert_eq!(args.legacy_topic, TopicScope::WholeRecord);
        assert_eq!(default_output(&args.input), PathBuf::from("in.txt.out"));
    }

    #[test]
    fn parses_sort_columns_and_scope() {
        let args = props(&[
            "props",
            "--pb",
            "in.txt",
            "--sort-columns",
            "4,0,1",
            "--legacy-topic",
            "single-token",
        ]);
        assert_eq!(args.sort_columns, vec![4, 0, 1]);
        assert_eq!(args.legacy_topic, TopicScope::SingleToken);
    }

    #[test]
    fn semlink_flag_fills_only_missing_patterns() {
        let args = props(&["props", "--pb", "in.txt", "--semlink", "--filter", "-ARG0"]);
        let options = transform_options(&args).unwrap();
        assert_eq!(options.filter.unwrap().as_str(), "-ARG0");
        assert!(options.rewrite.is_some());
    }

    #[test]
    fn patterns_may_start_with_a_hyphen() {
        let args = props(&[
            "props",
            "--pb",
            "in.txt",
            "--filter",
            "-ARG[^M]",
            "--search",
            "-by",
            "--replace",
            "-\\1",
        ]);
        assert_eq!(args.filter.as_deref(), Some("-ARG[^M]"));
        assert_eq!(args.search.as_deref(), Some("-by"));
        assert_eq!(args.replace.as_deref(), Some(r"-\1"));
        assert!(transform_options(&args).unwrap().rewrite.is_some());
    }

    #[test]
    fn lone_search_is_ignored() {
        let args = props(&["props", "--pb", "in.txt", "--search", "x"]);
        let options = transform_options(&args).unwrap();
        assert!(options.rewrite.is_none());
        assert!(options.filter.is_none());
    }

    #[test]
    fn invalid_filter_is_an_error() {
        let args = props(&["props", "--pb", "in.txt", "--filter", "(unclosed"]);
        assert!(transform_options(&args).is_err());
    }

    #[test]
    fn per_target_log_directives_apply() {
        let subscriber = log_subscriber(EnvFilter::new("warn,semlink_props=debug"), std::io::sink);
        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(target: "semlink_props", tracing::Level::DEBUG));
            assert!(!tracing::enabled!(target: "semlink_mappings", tracing::Level::DEBUG));
            assert!(tracing::enabled!(target: "semlink_mappings", tracing::Level::WARN));
        });
    }

    #[test]
    fn requires_pointer_file() {
        assert!(Cli::try_parse_from(["semlink", "props"]).is_err());
    }
}
