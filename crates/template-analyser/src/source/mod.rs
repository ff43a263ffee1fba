//! Where templates come from. The scheduler only sees the [`TemplateSource`]
//! contract: a count known up front, then a stream of exactly that many
//! templates.

pub mod database;
pub mod directory;

use std::fmt;

use crate::error::SourceError;

pub use database::{DatabaseSource, DatabaseSourceConfig};
pub use directory::DirectorySource;

/// One template record: its display name and raw stored bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    pub content: Vec<u8>,
}

impl Template {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("content_len", &self.content.len())
            .finish()
    }
}

pub type TemplateIter<'a> = Box<dyn Iterator<Item = Result<Template, SourceError>> + 'a>;

pub trait TemplateSource {
    /// Number of templates `templates()` will yield. Queried once, before
    /// streaming starts, so progress has a fixed denominator.
    fn total_count(&mut self) -> Result<usize, SourceError>;

    /// Streams the templates. Must yield exactly `total_count()` items.
    fn templates(&mut self) -> Result<TemplateIter<'_>, SourceError>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String {
        "template source".to_string()
    }
}

/// In-memory source, handy for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    templates: Vec<Template>,
}

impl MemorySource {
    pub fn new(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    pub fn push(&mut self, template: Template) {
        self.templates.push(template);
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl FromIterator<Template> for MemorySource {
    fn from_iter<I: IntoIterator<Item = Template>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl TemplateSource for MemorySource {
    fn total_count(&mut self) -> Result<usize, SourceError> {
        Ok(self.templates.len())
    }

    fn templates(&mut self) -> Result<TemplateIter<'_>, SourceError> {
        Ok(Box::new(self.templates.iter().cloned().map(Ok)))
    }

    fn describe(&self) -> String {
        format!("{} in-memory templates", self.templates.len())
    }
}
