use std::collections::{BTreeSet, HashSet};

use log::warn;
use serde::Serialize;

use crate::error::AnalysisError;
use crate::matcher::FieldCodeCount;

/// Field-code counts for one template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateAnalysis {
    pub name: String,
    pub counts: Vec<FieldCodeCount>,
}

impl TemplateAnalysis {
    pub fn new(name: impl Into<String>, counts: Vec<FieldCodeCount>) -> Self {
        Self {
            name: name.into(),
            counts,
        }
    }

    pub fn count(&self, label: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.count)
    }

    fn duplicate_label(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.counts
            .iter()
            .find(|c| !seen.insert(c.label.as_str()))
            .map(|c| c.label.as_str())
    }
}

/// Everything one run produced, in template source order.
///
/// Template names are the row keys of the exported table but are not
/// required to be unique; a repeated name produces a second row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunResult {
    templates: Vec<TemplateAnalysis>,
    #[serde(skip)]
    names: HashSet<String>,
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one template's counts. A template may carry each label only
    /// once.
    pub fn insert(&mut self, analysis: TemplateAnalysis) -> Result<(), AnalysisError> {
        if let Some(label) = analysis.duplicate_label() {
            return Err(AnalysisError::DuplicateCount {
                template: analysis.name.clone(),
                label: label.to_string(),
            });
        }

        if !self.names.insert(analysis.name.clone()) {
            warn!(
                "Template name '{}' occurs more than once; keeping both rows",
                analysis.name
            );
        }

        self.templates.push(analysis);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TemplateAnalysis> {
        self.templates.iter()
    }

    pub fn get(&self, name: &str) -> Option<&TemplateAnalysis> {
        self.templates.iter().find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Number of different template names; below `len()` when names repeat.
    pub fn distinct_names(&self) -> usize {
        self.names.len()
    }

    /// Order-independent view: every (template, label, count) triple.
    pub fn triples(&self) -> BTreeSet<(String, String, usize)> {
        self.templates
            .iter()
            .flat_map(|t| {
                t.counts
                    .iter()
                    .map(move |c| (t.name.clone(), c.label.clone(), c.count))
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a RunResult {
    type Item = &'a TemplateAnalysis;
    type IntoIter = std::slice::Iter<'a, TemplateAnalysis>;

    fn into_iter(self) -> Self::IntoIter {
        self.templates.iter()
    }
}
