//! SQLite-backed template store.
//!
//! The count and the row stream share one `WHERE` filter so the declared
//! total matches what is streamed. Blobs are fetched one row at a time.

use std::path::{Path, PathBuf};

use log::{info, warn};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::source::{Template, TemplateIter, TemplateSource};

/// Table layout of the template store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSourceConfig {
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_name_column")]
    pub name_column: String,
    #[serde(default = "default_content_column")]
    pub content_column: String,
    /// Raw SQL condition selecting template rows. `None` selects every row.
    #[serde(default = "default_filter")]
    pub filter: Option<String>,
}

fn default_table() -> String {
    "Docs".to_string()
}

fn default_name_column() -> String {
    "DocName".to_string()
}

fn default_content_column() -> String {
    "DocContent".to_string()
}

/// Every row with a template id. `.docx` rows are kept: DOCX is extracted
/// natively, unlike the legacy `.doc` format.
fn default_filter() -> Option<String> {
    Some("TemplateId IS NOT NULL".to_string())
}

impl Default for DatabaseSourceConfig {
    fn default() -> Self {
        Self {
            table: default_table(),
            name_column: default_name_column(),
            content_column: default_content_column(),
            filter: default_filter(),
        }
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

impl DatabaseSourceConfig {
    fn where_clause(&self) -> String {
        match self.filter.as_deref().map(str::trim) {
            Some(filter) if !filter.is_empty() => format!(" WHERE {}", filter),
            _ => String::new(),
        }
    }

    fn count_sql(&self) -> String {
        format!(
            "SELECT COUNT(*) FROM {}{}",
            quote_ident(&self.table),
            self.where_clause()
        )
    }

    fn rowid_sql(&self) -> String {
        format!(
            "SELECT rowid FROM {}{} ORDER BY rowid",
            quote_ident(&self.table),
            self.where_clause()
        )
    }

    fn row_sql(&self) -> String {
        format!(
            "SELECT {}, {} FROM {} WHERE rowid = ?1",
            quote_ident(&self.name_column),
            quote_ident(&self.content_column),
            quote_ident(&self.table)
        )
    }
}

pub struct DatabaseSource {
    conn: Connection,
    config: DatabaseSourceConfig,
    path: Option<PathBuf>,
}

impl DatabaseSource {
    /// Opens the database file read-only.
    pub fn open(path: &Path, config: DatabaseSourceConfig) -> Result<Self, SourceError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        info!("Template database opened at {}", path.display());

        Ok(Self {
            conn,
            config,
            path: Some(path.to_path_buf()),
        })
    }

    /// Wraps an existing connection, e.g. an in-memory database in tests.
    pub fn from_connection(conn: Connection, config: DatabaseSourceConfig) -> Self {
        Self {
            conn,
            config,
            path: None,
        }
    }

    pub fn config(&self) -> &DatabaseSourceConfig {
        &self.config
    }

    fn row_ids(&self) -> Result<Vec<i64>, SourceError> {
        let mut stmt = self.conn.prepare(&self.config.rowid_sql())?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    fn fetch(&self, rowid: i64) -> Result<Template, SourceError> {
        let row = self
            .conn
            .query_row(&self.config.row_sql(), params![rowid], |row| {
                let name: Option<String> = row.get(0)?;
                let content = match row.get_ref(1)? {
                    ValueRef::Blob(bytes) => Some(bytes.to_vec()),
                    ValueRef::Text(text) => Some(text.to_vec()),
                    ValueRef::Integer(value) => Some(value.to_string().into_bytes()),
                    ValueRef::Real(value) => Some(value.to_string().into_bytes()),
                    ValueRef::Null => None,
                };
                Ok((name, content))
            })
            .optional()?;

        let (name, content) = row.ok_or(SourceError::MissingRow { rowid })?;

        let name = name.unwrap_or_else(|| {
            warn!("Template row {} has no name", rowid);
            format!("#{}", rowid)
        });
        let content = content.unwrap_or_else(|| {
            warn!("Template '{}' has no content", name);
            Vec::new()
        });

        Ok(Template::new(name, content))
    }
}

impl TemplateSource for DatabaseSource {
    fn total_count(&mut self) -> Result<usize, SourceError> {
        let count: i64 = self
            .conn
            .query_row(&self.config.count_sql(), [], |r| r.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn templates(&mut self) -> Result<TemplateIter<'_>, SourceError> {
        let ids = self.row_ids()?;
        let source: &Self = self;
        Ok(Box::new(ids.into_iter().map(move |id| source.fetch(id))))
    }

    fn describe(&self) -> String {
        match &self.path {
            Some(path) => format!("database {} (table {})", path.display(), self.config.table),
            None => format!("database connection (table {})", self.config.table),
        }
    }
}
