//! The field-code catalog: the ordered list of patterns searched for in every
//! template, each paired with the label that becomes its CSV column.

pub mod defaults;

use std::collections::HashSet;
use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

pub use defaults::builtin_field_codes;

/// How a catalog pattern is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// Plain substring.
    Literal,
    /// Regular expression.
    #[default]
    Regex,
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternKind::Literal => write!(f, "literal"),
            PatternKind::Regex => write!(f, "regex"),
        }
    }
}

/// Serializable description of one catalog entry, as written in config files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCodeSpec {
    pub pattern: String,
    pub label: String,
    #[serde(default)]
    pub kind: PatternKind,
}

impl FieldCodeSpec {
    pub fn literal(pattern: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            label: label.into(),
            kind: PatternKind::Literal,
        }
    }

    pub fn regex(pattern: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            label: label.into(),
            kind: PatternKind::Regex,
        }
    }
}

/// A compiled catalog entry. Matching is always case-insensitive; literal
/// patterns are compiled as escaped regexes so both kinds share one matcher.
#[derive(Debug, Clone)]
pub struct FieldCodePattern {
    label: String,
    pattern: String,
    kind: PatternKind,
    compiled: Regex,
}

impl FieldCodePattern {
    pub fn compile(spec: &FieldCodeSpec) -> Result<Self, CatalogError> {
        if spec.label.trim().is_empty() {
            return Err(CatalogError::EmptyLabel {
                pattern: spec.pattern.clone(),
            });
        }
        if spec.pattern.is_empty() {
            return Err(CatalogError::EmptyPattern {
                label: spec.label.clone(),
            });
        }

        let source = match spec.kind {
            PatternKind::Literal => regex::escape(&spec.pattern),
            PatternKind::Regex => spec.pattern.clone(),
        };

        let compiled = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map_err(|e| CatalogError::InvalidPattern {
                label: spec.label.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            label: spec.label.clone(),
            pattern: spec.pattern.clone(),
            kind: spec.kind,
            compiled,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub(crate) fn regex(&self) -> &Regex {
        &self.compiled
    }
}

/// Immutable, ordered set of field-code patterns with unique labels.
///
/// Built once before a run and shared read-only by every worker.
#[derive(Debug, Clone)]
pub struct FieldCodeCatalog {
    entries: Vec<FieldCodePattern>,
}

impl FieldCodeCatalog {
    /// Compiles the given specs, rejecting an empty list, empty labels, bad
    /// regexes and label collisions. Declaration order is preserved.
    pub fn new(specs: &[FieldCodeSpec]) -> Result<Self, CatalogError> {
        if specs.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(specs.len());

        for spec in specs {
            if !seen.insert(spec.label.as_str()) {
                return Err(CatalogError::DuplicateLabel {
                    label: spec.label.clone(),
                });
            }
            entries.push(FieldCodePattern::compile(spec)?);
        }

        Ok(Self { entries })
    }

    /// The catalog shipped with the tool.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(&builtin_field_codes())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldCodePattern> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<&FieldCodePattern> {
        self.entries.iter().find(|e| e.label == label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }
}

impl<'a> IntoIterator for &'a FieldCodeCatalog {
    type Item = &'a FieldCodePattern;
    type IntoIter = std::slice::Iter<'a, FieldCodePattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
