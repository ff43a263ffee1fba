//! Static analysis of document templates.
//!
//! Counts how often each field code of a [`FieldCodeCatalog`] occurs in every
//! template of a [`TemplateSource`], using a bounded pool of worker threads,
//! and exports the result as a template-by-field-code CSV matrix.

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod extractor;
pub mod matcher;
pub mod progress;
pub mod result;
pub mod scheduler;
pub mod source;
pub mod table;

pub use catalog::{FieldCodeCatalog, FieldCodePattern, FieldCodeSpec, PatternKind};
pub use config::{load_config, load_config_from_str, AnalyserConfig, ConfigFormat};
pub use error::{
    AnalyserError, AnalysisError, CatalogError, ConfigError, ExportError, ExtractionError, Result,
    SourceError,
};
pub use export::{export_csv, export_csv_file, write_csv, TEMPLATE_NAME_HEADER};
pub use extractor::{
    DocumentFormat, DocxExtractor, ExtractorRegistry, PlainTextExtractor, TextExtractor,
};
pub use matcher::{analyse_text, count_matches, FieldCodeCount};
pub use progress::{ChannelProgress, NoopProgress, ProgressListener, ProgressUpdate, RecordingProgress};
pub use result::{RunResult, TemplateAnalysis};
pub use scheduler::{run_analysis, CancellationToken, DispatchMode, RunOptions, DEFAULT_WORKER_COUNT};
pub use source::{
    DatabaseSource, DatabaseSourceConfig, DirectorySource, MemorySource, Template, TemplateSource,
};
pub use table::{build_table, Table, TableRow};
