#![doc = include_str!("../README.md")]
//! Xylem CLI tool
//!
//! Input handling:
//!   - Arguments naming directories are walked recursively for `.xml` files
//!     (extension match is ASCII case-insensitive, entries visited in name
//!     order).
//!   - Arguments naming files are loaded as-is, whatever their extension.
//!   - A single `-` reads one document from stdin.
//!
//! Examples:
//!   xylem gen --root plant corpus/          - schema into ./RWSchema.xsd
//!   xylem gen --root plant --split corpus/  - partitioned schema documents
//!   xylem stats corpus/                     - tag graph as JSON on stdout

use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;
use xylem_stats::{CorpusError, DEFAULT_LIST_MARKER, TagGraph, TagId};
use xylem_tree::{Document, ParseError};
use xylem_xsd::{EmitError, EmitOptions, FileSink, Truncation, emit};

// ============================================================================
// Exit codes
// ============================================================================

const EXIT_SUCCESS: i32 = 0;
const EXIT_SYNTAX_ERROR: i32 = 1;
const EXIT_CORPUS_ERROR: i32 = 2;
const EXIT_IO_ERROR: i32 = 3;

// ============================================================================
// CLI argument structures
// ============================================================================

/// Derive an XSD-like schema from a corpus of XML documents.
#[derive(Parser, Debug)]
#[command(name = "xylem", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Infer a schema from a corpus and write the documents to disk
    Gen(GenArgs),
    /// Aggregate a corpus and dump the linked tag graph as JSON
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
struct GenArgs {
    /// Tag to start the traversal from
    #[arg(long)]
    root: String,

    /// Maximum traversal depth, counted from the root
    #[arg(long, default_value_t = 8)]
    depth: usize,

    /// Base name for the emitted schema documents
    #[arg(long, default_value = "RWSchema")]
    base_name: String,

    /// Directory the schema documents are written into
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Suffix that marks list-item keys
    #[arg(long, default_value = DEFAULT_LIST_MARKER)]
    marker: String,

    /// Write one schema document per root child, imported by the root document
    #[arg(long)]
    split: bool,

    /// What to do with children that fall beyond the depth bound
    #[arg(long, value_enum, default_value = "omit")]
    truncate: TruncateArg,

    /// Input files, directories, or "-" for stdin
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<String>,
}

#[derive(Args, Debug)]
struct StatsArgs {
    /// Suffix that marks list-item keys
    #[arg(long, default_value = DEFAULT_LIST_MARKER)]
    marker: String,

    /// File to write the JSON dump to, or "-" for stdout
    #[arg(long, default_value = "-")]
    json_out: String,

    /// Input files, directories, or "-" for stdin
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TruncateArg {
    /// Drop out-of-depth children from their parent's choice
    Omit,
    /// Keep the typed reference without declaring the child
    Reference,
}

// ============================================================================
// Entry point
// ============================================================================

fn main() {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_SUCCESS,
                _ => EXIT_SYNTAX_ERROR,
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    let result = match cli.command {
        Commands::Gen(args) => run_gen(args),
        Commands::Stats(args) => run_stats(args),
    };

    if let Err(err) = result {
        match &err {
            CliError::ParseDiagnostic {
                error,
                source,
                filename,
            } => {
                error.write_report(filename, source, io::stderr());
            }
            other => eprintln!("error: {other}"),
        }
        std::process::exit(err.exit_code());
    }
    std::process::exit(EXIT_SUCCESS);
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug)]
enum CliError {
    Io(io::Error),
    ParseDiagnostic {
        error: ParseError,
        source: String,
        filename: String,
    },
    Corpus(CorpusError),
    Emit(EmitError),
    Usage(String),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Io(_) => EXIT_IO_ERROR,
            CliError::ParseDiagnostic { .. } => EXIT_SYNTAX_ERROR,
            CliError::Corpus(_) => EXIT_CORPUS_ERROR,
            CliError::Emit(EmitError::UnknownRoot(_)) => EXIT_CORPUS_ERROR,
            CliError::Emit(EmitError::Io(_)) => EXIT_IO_ERROR,
            CliError::Usage(_) => EXIT_SYNTAX_ERROR,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(err) => write!(f, "{err}"),
            CliError::ParseDiagnostic {
                error, filename, ..
            } => write!(f, "{filename}: {error}"),
            CliError::Corpus(err) => write!(f, "{err}"),
            CliError::Emit(err) => write!(f, "{err}"),
            CliError::Usage(message) => write!(f, "{message}"),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Io(err)
    }
}

impl From<CorpusError> for CliError {
    fn from(err: CorpusError) -> Self {
        CliError::Corpus(err)
    }
}

impl From<EmitError> for CliError {
    fn from(err: EmitError) -> Self {
        CliError::Emit(err)
    }
}

// ============================================================================
// Subcommands
// ============================================================================

fn run_gen(args: GenArgs) -> Result<(), CliError> {
    if args.depth == 0 {
        return Err(CliError::Usage("--depth must be at least 1".to_string()));
    }

    let corpus = load_corpus(&args.inputs)?;
    let documents = parse_corpus(corpus)?;
    let graph = xylem_stats::analyze(&documents, &args.marker)?;
    debug!(documents = documents.len(), tags = graph.len(), "corpus aggregated");

    let mut options = EmitOptions::new(args.root)
        .depth(args.depth)
        .base_name(args.base_name)
        .truncation(match args.truncate {
            TruncateArg::Omit => Truncation::Omit,
            TruncateArg::Reference => Truncation::Reference,
        });
    if args.split {
        options = options.split();
    }

    let mut sink = FileSink::new(&args.out_dir)?;
    emit(&graph, &options, &mut sink)?;
    eprintln!(
        "Wrote {}.xsd to {}",
        options.base_name,
        args.out_dir.display()
    );
    Ok(())
}

fn run_stats(args: StatsArgs) -> Result<(), CliError> {
    let corpus = load_corpus(&args.inputs)?;
    let documents = parse_corpus(corpus)?;
    let graph = xylem_stats::analyze(&documents, &args.marker)?;

    let dump = graph_to_json(&graph);
    let mut rendered = serde_json::to_string_pretty(&dump).map_err(io::Error::other)?;
    rendered.push('\n');
    write_output(&args.json_out, &rendered)?;
    Ok(())
}

// ============================================================================
// Corpus loading
// ============================================================================

/// One corpus document: a name for diagnostics and the raw markup.
#[derive(Debug)]
struct CorpusDocument {
    name: String,
    source: String,
}

fn load_corpus(inputs: &[String]) -> Result<Vec<CorpusDocument>, CliError> {
    let mut corpus = Vec::new();
    for input in inputs {
        if input == "-" {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            corpus.push(CorpusDocument {
                name: "<stdin>".to_string(),
                source: buffer,
            });
            continue;
        }

        let path = Path::new(input);
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.map_err(|err| CliError::Io(io::Error::other(err)))?;
                if entry.file_type().is_file() && has_xml_extension(entry.path()) {
                    corpus.push(read_document(entry.path())?);
                }
            }
        } else {
            corpus.push(read_document(path)?);
        }
    }
    debug!(documents = corpus.len(), "corpus loaded");
    Ok(corpus)
}

fn has_xml_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
}

fn read_document(path: &Path) -> Result<CorpusDocument, CliError> {
    let source = std::fs::read_to_string(path)
        .map_err(|err| io::Error::new(err.kind(), format!("{}: {err}", path.display())))?;
    Ok(CorpusDocument {
        name: path.display().to_string(),
        source,
    })
}

/// Parses every corpus document, aborting on the first failure.
fn parse_corpus(corpus: Vec<CorpusDocument>) -> Result<Vec<Document>, CliError> {
    let mut documents = Vec::with_capacity(corpus.len());
    for entry in corpus {
        match xylem_tree::parse(&entry.source) {
            Ok(document) => documents.push(document),
            Err(error) => {
                return Err(CliError::ParseDiagnostic {
                    error,
                    source: entry.source,
                    filename: entry.name,
                });
            }
        }
    }
    Ok(documents)
}

// ============================================================================
// Tag graph JSON dump
// ============================================================================

fn graph_to_json(graph: &TagGraph) -> serde_json::Value {
    use serde_json::{Map, Value};

    let mut tags = Vec::with_capacity(graph.len());
    for (_, stats) in graph.iter() {
        let mut tag = Map::new();
        tag.insert("key".to_string(), Value::String(stats.key.clone()));
        if let Some(origin) = &stats.origin {
            tag.insert("origin".to_string(), Value::String(origin.clone()));
        }
        tag.insert("list_item".to_string(), Value::Bool(stats.is_list_item));
        tag.insert("complex".to_string(), Value::Bool(stats.is_complex));
        tag.insert("mixed".to_string(), Value::Bool(stats.is_mixed));
        if stats.is_leaf() {
            let base = match stats.content_type() {
                xylem_stats::ContentType::Integer => "integer",
                xylem_stats::ContentType::String => "string",
            };
            tag.insert("content_type".to_string(), Value::String(base.to_string()));
        }
        tag.insert(
            "values".to_string(),
            Value::Array(stats.values.iter().cloned().map(Value::String).collect()),
        );
        let attributes: Map<String, Value> = stats
            .attributes
            .iter()
            .map(|(name, sample)| (name.clone(), Value::String(sample.clone())))
            .collect();
        tag.insert("attributes".to_string(), Value::Object(attributes));
        tag.insert("children".to_string(), id_keys(graph, &stats.children));
        tag.insert("parents".to_string(), id_keys(graph, &stats.parents));
        if !stats.ghost_parents.is_empty() {
            tag.insert(
                "ghost_parents".to_string(),
                string_array(&stats.ghost_parents),
            );
        }
        if !stats.ghost_children.is_empty() {
            tag.insert(
                "ghost_children".to_string(),
                string_array(&stats.ghost_children),
            );
        }
        tags.push(Value::Object(tag));
    }
    Value::Array(tags)
}

fn id_keys(graph: &TagGraph, ids: &[TagId]) -> serde_json::Value {
    serde_json::Value::Array(
        ids.iter()
            .map(|&id| serde_json::Value::String(graph[id].key.clone()))
            .collect(),
    )
}

fn string_array(items: &[String]) -> serde_json::Value {
    serde_json::Value::Array(
        items
            .iter()
            .cloned()
            .map(serde_json::Value::String)
            .collect(),
    )
}

// ============================================================================
// Output helpers
// ============================================================================

fn write_output(path: &str, content: &str) -> io::Result<()> {
    if path == "-" {
        print!("{content}");
        Ok(())
    } else {
        std::fs::write(path, content)
    }
}

// ============================================================================
// Tests
// ============================================================================
