use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyserError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Template source error: {0}")]
    Source(#[from] SourceError),

    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Failed to parse config YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Invalid field code catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Problems found while building a field-code catalog. Any of these prevents
/// a run from starting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Field code catalog must contain at least one entry")]
    Empty,

    #[error("Duplicate field code label '{label}'")]
    DuplicateLabel { label: String },

    #[error("Invalid pattern for '{label}': {reason}")]
    InvalidPattern { label: String, reason: String },

    #[error("Field code label must not be empty (pattern '{pattern}')")]
    EmptyLabel { pattern: String },

    #[error("Field code '{label}' has an empty pattern")]
    EmptyPattern { label: String },
}

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to process DOCX: {0}")]
    DocxProcessing(String),

    #[error("Document text is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("Text extraction failed: {0}")]
    TextExtraction(String),
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Directory scan failed for '{path}': {source}")]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read template '{path}': {source}")]
    ReadTemplate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Template row {rowid} disappeared while streaming")]
    MissingRow { rowid: i64 },
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Template source declared {declared} templates but delivered {delivered}")]
    SourceCountMismatch { declared: usize, delivered: usize },

    #[error("Failed to extract text from template '{template}': {source}")]
    ExtractionFailure {
        template: String,
        #[source]
        source: ExtractionError,
    },

    #[error("Template source failed: {0}")]
    Source(#[from] SourceError),

    #[error("Template '{template}' has more than one count for '{label}'")]
    DuplicateCount { template: String, label: String },

    #[error("Analysis cancelled after {completed} of {total} templates")]
    Cancelled { completed: usize, total: usize },

    #[error("Worker count must be > 0")]
    InvalidWorkerCount,

    #[error("Worker pool stopped unexpectedly: {0}")]
    WorkerFailed(String),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, AnalyserError>;
