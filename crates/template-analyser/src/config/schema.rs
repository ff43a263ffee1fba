use serde::{Deserialize, Serialize};

use crate::catalog::{FieldCodeCatalog, FieldCodeSpec};
use crate::error::CatalogError;
use crate::scheduler::{DispatchMode, RunOptions, DEFAULT_WORKER_COUNT};
use crate::source::DatabaseSourceConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyserConfig {
    pub version: String,
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    #[serde(default)]
    pub dispatch: DispatchMode,
    /// Replaces the built-in catalog when present.
    #[serde(default)]
    pub field_codes: Option<Vec<FieldCodeSpec>>,
    #[serde(default)]
    pub database: DatabaseSourceConfig,
}

fn default_worker_count() -> usize {
    DEFAULT_WORKER_COUNT
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            worker_count: default_worker_count(),
            dispatch: DispatchMode::default(),
            field_codes: None,
            database: DatabaseSourceConfig::default(),
        }
    }
}

impl AnalyserConfig {
    pub fn catalog(&self) -> Result<FieldCodeCatalog, CatalogError> {
        match &self.field_codes {
            Some(specs) => FieldCodeCatalog::new(specs),
            None => FieldCodeCatalog::builtin(),
        }
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions::with_workers(self.worker_count).dispatch(self.dispatch)
    }
}
