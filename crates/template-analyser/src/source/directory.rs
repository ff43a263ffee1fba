use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;

use crate::error::SourceError;
use crate::source::{Template, TemplateIter, TemplateSource};

/// Treats every regular file directly inside a directory as one template,
/// named after its file stem.
pub struct DirectorySource {
    directory: PathBuf,
    pattern: Option<glob::Pattern>,
    scanned: Option<Vec<PathBuf>>,
}

impl DirectorySource {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            pattern: None,
            scanned: None,
        }
    }

    /// Only files whose name matches `pattern` (e.g. `*.docx`) are included.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, SourceError> {
        let compiled = glob::Pattern::new(pattern).map_err(|e| SourceError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        self.pattern = Some(compiled);
        self.scanned = None;
        Ok(self)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn scan(&self) -> Result<Vec<PathBuf>, SourceError> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.directory)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| SourceError::ScanFailed {
                path: self.directory.clone(),
                source: e,
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            if let Some(pattern) = &self.pattern {
                let name = entry.file_name().to_string_lossy();
                if !pattern.matches(&name) {
                    continue;
                }
            }

            debug!("Found template: {}", entry.path().display());
            files.push(entry.into_path());
        }

        info!(
            "Scanned {} templates in {}",
            files.len(),
            self.directory.display()
        );
        Ok(files)
    }

    fn scanned_files(&mut self) -> Result<&[PathBuf], SourceError> {
        if self.scanned.is_none() {
            self.scanned = Some(self.scan()?);
        }
        Ok(self.scanned.as_deref().unwrap_or_default())
    }
}

fn template_name(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "<unknown>".to_string())
}

fn read_template(path: &Path) -> Result<Template, SourceError> {
    let content = std::fs::read(path).map_err(|e| SourceError::ReadTemplate {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(Template::new(template_name(path), content))
}

impl TemplateSource for DirectorySource {
    fn total_count(&mut self) -> Result<usize, SourceError> {
        Ok(self.scanned_files()?.len())
    }

    fn templates(&mut self) -> Result<TemplateIter<'_>, SourceError> {
        let files = self.scanned_files()?;
        Ok(Box::new(files.iter().map(|path| read_template(path))))
    }

    fn describe(&self) -> String {
        format!("directory {}", self.directory.display())
    }
}
