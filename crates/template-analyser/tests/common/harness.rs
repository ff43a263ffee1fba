//! Test harness for isolated test execution.
//!
//! `TestHarness` owns a temporary directory holding a template folder, an
//! output folder and an optional SQLite template store laid out like the
//! production `Docs` table.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use tempfile::TempDir;

use template_analyser::{DatabaseSource, DatabaseSourceConfig, DirectorySource};

pub struct TestHarness {
    temp_dir: TempDir,
    pub template_dir: PathBuf,
    pub output_dir: PathBuf,
    pub database_path: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();

        let template_dir = base.join("templates");
        let output_dir = base.join("output");
        let database_path = base.join("templates.db");

        std::fs::create_dir_all(&template_dir).expect("Failed to create template dir");
        std::fs::create_dir_all(&output_dir).expect("Failed to create output dir");

        Self {
            temp_dir,
            template_dir,
            output_dir,
            database_path,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a template file into the template directory.
    pub fn write_template(&self, filename: &str, content: &[u8]) -> PathBuf {
        let path = self.template_dir.join(filename);
        std::fs::write(&path, content).expect("Failed to write template");
        path
    }

    pub fn write_text_template(&self, filename: &str, content: &str) -> PathBuf {
        self.write_template(filename, content.as_bytes())
    }

    /// Write a config file into the temp directory.
    pub fn write_config(&self, filename: &str, content: &str) -> PathBuf {
        let path = self.temp_path().join(filename);
        std::fs::write(&path, content).expect("Failed to write config");
        path
    }

    pub fn output_path(&self, filename: &str) -> PathBuf {
        self.output_dir.join(filename)
    }

    pub fn directory_source(&self) -> DirectorySource {
        DirectorySource::new(&self.template_dir)
    }

    /// Create the `Docs` table. Rows are `(template_id, name, content)`; a
    /// `None` template id marks a non-template document.
    pub fn create_database(&self, rows: &[(Option<i64>, &str, &[u8])]) {
        let conn = Connection::open(&self.database_path).expect("Failed to open database");
        conn.execute_batch(
            "CREATE TABLE Docs (
                 DocId INTEGER PRIMARY KEY,
                 TemplateId INTEGER,
                 DocFileName TEXT,
                 DocName TEXT,
                 DocContent BLOB
             );",
        )
        .expect("Failed to create Docs table");

        for (template_id, name, content) in rows {
            conn.execute(
                "INSERT INTO Docs (TemplateId, DocFileName, DocName, DocContent)
                 VALUES (?1, ?2, ?3, ?4)",
                params![template_id, format!("{}.docx", name), name, content],
            )
            .expect("Failed to insert row");
        }
    }

    pub fn database_source(&self) -> DatabaseSource {
        DatabaseSource::open(&self.database_path, DatabaseSourceConfig::default())
            .expect("Failed to open database source")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
