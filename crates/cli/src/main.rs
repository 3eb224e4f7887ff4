use anyhow::{Context as AnyhowContext, Result};
use browsecloud_formats::{DocEntry, DocEntryPosition, LexiconWord, RgbColor};
use browsecloud_grid::{
    write_results_csv, ArtifactBundle, CountingGridModel, GridConfig, RankedDocument,
    ScaledGridData, SearchTerms, Viewport,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "browsecloud")]
#[command(about = "Query trained Counting Grid artifacts", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Grid configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a trained grid
    Inspect(InspectArgs),

    /// Lay out word labels for a viewport
    Grid(GridArgs),

    /// Rank the documents of a grid cell
    Docs(DocsArgs),

    /// Look up words or document entries
    Lookup(LookupArgs),
}

#[derive(Args)]
struct InspectArgs {
    /// Directory holding the training artifacts
    dir: PathBuf,
}

#[derive(Args)]
struct SearchArgs {
    /// Search words as typed (comma-separated); unknown words are reported
    #[arg(long, short = 's', value_delimiter = ',')]
    search: Vec<String>,
}

#[derive(Args)]
struct GridArgs {
    /// Directory holding the training artifacts
    dir: PathBuf,

    #[command(flatten)]
    search: SearchArgs,

    /// Surface width in pixels
    #[arg(long, default_value_t = 1000.0)]
    width: f64,

    /// Surface height in pixels
    #[arg(long, default_value_t = 1000.0)]
    height: f64,

    /// Horizontal pan in pixels
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    translate_x: f64,

    /// Vertical pan in pixels
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    translate_y: f64,

    /// Zoom ratio (1 shows the whole grid)
    #[arg(long, default_value_t = 1.0)]
    zoom: f64,
}

#[derive(Args)]
struct DocsArgs {
    /// Directory holding the training artifacts
    dir: PathBuf,

    /// Cell row (1-indexed)
    #[arg(long)]
    row: usize,

    /// Cell column (1-indexed)
    #[arg(long)]
    col: usize,

    #[command(flatten)]
    search: SearchArgs,

    /// Cell words taking part in ranking (defaults to the configured value)
    #[arg(long)]
    max_words: Option<usize>,

    /// Write CSV instead of JSON
    #[arg(long)]
    csv: bool,

    /// Write to a file instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct LookupArgs {
    /// Directory holding the training artifacts
    dir: PathBuf,

    /// Surface form to resolve
    #[arg(long, conflicts_with_all = ["word_id", "entry"])]
    word: Option<String>,

    /// Word id (0-indexed)
    #[arg(long, conflicts_with = "entry")]
    word_id: Option<usize>,

    /// Document entry id (0-indexed)
    #[arg(long)]
    entry: Option<usize>,
}

#[derive(Serialize)]
struct GridOutput {
    search: SearchTerms,
    #[serde(flatten)]
    data: ScaledGridData,
}

#[derive(Serialize)]
struct DocsOutput {
    row: usize,
    col: usize,
    search: SearchTerms,
    highlight_words: Vec<String>,
    documents: Vec<RankedDocument>,
}

#[derive(Serialize)]
struct WordLookup {
    word_id: usize,
    lexicon: Option<LexiconWord>,
    surface_forms: Vec<String>,
}

#[derive(Serialize)]
struct EntryLookup {
    entry: DocEntry,
    position: Option<DocEntryPosition>,
    legend_color: Option<RgbColor>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Inspect(args) => run_inspect(args, config),
        Commands::Grid(args) => run_grid(args, config),
        Commands::Docs(args) => run_docs(args, config),
        Commands::Lookup(args) => run_lookup(args, config),
    }
}

fn load_config(path: Option<&Path>) -> Result<GridConfig> {
    match path {
        Some(path) => GridConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(GridConfig::default()),
    }
}

fn load_model(dir: &Path, config: GridConfig) -> Result<CountingGridModel> {
    let bundle = ArtifactBundle::from_dir(dir)
        .with_context(|| format!("Failed to read artifacts from {}", dir.display()))?;
    CountingGridModel::new(&bundle, config)
        .with_context(|| format!("Failed to load counting grid from {}", dir.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Summarize a trained grid
fn run_inspect(args: InspectArgs, config: GridConfig) -> Result<()> {
    let model = load_model(&args.dir, config)?;
    print_json(&model.summary())
}

/// Lay out word labels for a viewport
fn run_grid(args: GridArgs, config: GridConfig) -> Result<()> {
    let model = load_model(&args.dir, config)?;
    let search = resolve_search(&model, &args.search);

    let viewport = Viewport::new(args.width, args.height)
        .with_translation(args.translate_x, args.translate_y)
        .with_zoom(args.zoom);
    let data = model
        .scaled_grid_data(&search.word_ids(), &viewport)
        .context("Failed to lay out word labels")?;

    print_json(&GridOutput { search, data })
}

/// Rank the documents of a grid cell
fn run_docs(args: DocsArgs, config: GridConfig) -> Result<()> {
    let max_words = args.max_words.unwrap_or(config.max_words_in_search);
    let model = load_model(&args.dir, config)?;
    let search = resolve_search(&model, &args.search);
    let word_ids = search.word_ids();

    let (row, col) = (args.row, args.col);
    let documents = model
        .ranked_documents(row, col, &word_ids, max_words)
        .with_context(|| format!("Failed to rank documents of cell ({row}, {col})"))?;
    log::info!("Ranked {} documents for cell ({row}, {col})", documents.len());

    if args.csv {
        let entries: Vec<DocEntry> = documents.into_iter().map(|d| d.entry).collect();
        let extra_columns = model.database().extra_columns();
        match &args.output {
            Some(path) => {
                let file = fs::File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                write_results_csv(file, &entries, extra_columns)?;
            }
            None => write_results_csv(io::stdout().lock(), &entries, extra_columns)?,
        }
        return Ok(());
    }

    let output = DocsOutput {
        row,
        col,
        highlight_words: model.highlight_words(&word_ids),
        search,
        documents,
    };
    match &args.output {
        Some(path) => fs::write(path, serde_json::to_string_pretty(&output)?)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print_json(&output)?,
    }
    Ok(())
}

/// Look up words or document entries
fn run_lookup(args: LookupArgs, config: GridConfig) -> Result<()> {
    let model = load_model(&args.dir, config)?;
    let vocabulary = model.vocabulary();

    if let Some(entry_id) = args.entry {
        let entry = model
            .database()
            .doc_entry(entry_id)
            .with_context(|| format!("No document entry {entry_id}"))?;
        return print_json(&EntryLookup {
            position: model.entry_position(entry_id),
            legend_color: model.legend_color_for_entry(entry),
            entry: entry.clone(),
        });
    }

    let word_id = match (&args.word, args.word_id) {
        (Some(word), _) => {
            vocabulary
                .lexicon_word_by_word(word)
                .with_context(|| format!("'{word}' is not in the vocabulary"))?
                .word_id
        }
        (None, Some(word_id)) => word_id,
        (None, None) => anyhow::bail!("One of --word, --word-id or --entry is required"),
    };

    print_json(&WordLookup {
        word_id,
        lexicon: vocabulary.lexicon_word_by_id(word_id).cloned(),
        surface_forms: vocabulary
            .vocabulary_words_by_id(word_id)
            .map(<[String]>::to_vec)
            .unwrap_or_default(),
    })
}

fn resolve_search(model: &CountingGridModel, args: &SearchArgs) -> SearchTerms {
    let terms = model.resolve_search_terms(&args.search);
    if !terms.unresolved.is_empty() {
        log::warn!("Not in the vocabulary: {}", terms.unresolved.join(", "));
    }
    terms
}
