//! template-analyser command-line front end
//!
//! Usage:
//!     template-analyser analyse --dir ./templates --output analysis.csv
//!     template-analyser analyse --database templates.db --workers 4
//!     template-analyser catalog --config analyser.yaml

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use template_analyser::{
    build_table, export_csv_file, load_config, run_analysis, AnalyserConfig, CancellationToken,
    DatabaseSource, DirectorySource, DispatchMode, ExtractorRegistry, ProgressUpdate,
    TemplateSource,
};
use tracing_subscriber::layer::SubscriberExt;

#[derive(Parser, Debug)]
#[command(
    name = "template-analyser",
    version,
    about = "Counts field codes in document templates and exports a CSV matrix"
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyse every template of a directory or database
    Analyse(AnalyseArgs),

    /// Print the effective field code catalog
    Catalog {
        /// Config file (JSON or YAML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct AnalyseArgs {
    /// Directory whose files are templates
    #[arg(long, conflicts_with = "database", required_unless_present = "database")]
    dir: Option<PathBuf>,

    /// File name pattern applied inside --dir (e.g. "*.docx")
    #[arg(long, requires = "dir")]
    glob: Option<String>,

    /// SQLite database holding the template table
    #[arg(long)]
    database: Option<PathBuf>,

    /// Config file (JSON or YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of concurrent workers (overrides config)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Dispatch templates in fixed batches of --workers
    #[arg(long)]
    lockstep: bool,

    /// CSV output path (default: template-analysis-<timestamp>.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Command::Analyse(args) => analyse(args),
        Command::Catalog { config } => print_catalog(config.as_deref()),
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    tracing_log::LogTracer::init().context("Failed to bridge log records")?;

    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;
    Ok(())
}

fn load_config_or_default(path: Option<&Path>) -> Result<AnalyserConfig> {
    match path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(AnalyserConfig::default()),
    }
}

fn default_output_path() -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    PathBuf::from(format!("template-analysis-{}.csv", timestamp))
}

fn analyse(args: AnalyseArgs) -> Result<()> {
    let config = load_config_or_default(args.config.as_deref())?;
    let catalog = config.catalog().context("Invalid field code catalog")?;

    let mut options = config.run_options();
    if let Some(workers) = args.workers {
        options.worker_count = workers;
    }
    if args.lockstep {
        options = options.dispatch(DispatchMode::Lockstep);
    }

    let token = CancellationToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nCancelling; waiting for running templates to finish...");
        handler_token.cancel();
    })
    .context("Failed to install Ctrl-C handler")?;
    let options = options.cancellation(token);

    let mut source: Box<dyn TemplateSource> = match (args.dir, args.database) {
        (Some(dir), _) => {
            let source = DirectorySource::new(&dir);
            match args.glob.as_deref() {
                Some(pattern) => Box::new(source.with_pattern(pattern)?),
                None => Box::new(source),
            }
        }
        (None, Some(database)) => Box::new(
            DatabaseSource::open(&database, config.database.clone())
                .with_context(|| format!("Failed to open database {}", database.display()))?,
        ),
        (None, None) => anyhow::bail!("Either --dir or --database is required"),
    };

    let extractor = ExtractorRegistry::new();
    let progress = |update: ProgressUpdate| {
        eprint!(
            "\rAnalysing templates: {:>3}% ({}/{})",
            update.percent(),
            update.completed,
            update.total
        );
        let _ = std::io::stderr().flush();
    };

    let result = run_analysis(source.as_mut(), &catalog, &extractor, &options, &progress);
    eprintln!();
    let result = result.context("Analysis failed")?;

    let table = build_table(&result);
    let output = args.output.unwrap_or_else(default_output_path);
    export_csv_file(&table, &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "Analysed {} templates; results written to {}",
        result.len(),
        output.display()
    );
    Ok(())
}

fn print_catalog(config: Option<&Path>) -> Result<()> {
    let config = load_config_or_default(config)?;
    let catalog = config.catalog().context("Invalid field code catalog")?;

    for pattern in &catalog {
        println!("{}\t{}\t{}", pattern.label(), pattern.kind(), pattern.pattern());
    }
    Ok(())
}
