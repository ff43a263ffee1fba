//! Builders for test templates, catalogs and extractors.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use zip::write::SimpleFileOptions;

use template_analyser::{
    ExtractionError, FieldCodeCatalog, FieldCodeSpec, MemorySource, Template, TemplateSource,
    SourceError,
};
use template_analyser::source::TemplateIter;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Builder for minimal DOCX packages: one `w:p` per paragraph.
pub struct DocxBuilder {
    paragraphs: Vec<String>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self { paragraphs: vec![] }
    }

    pub fn paragraph(mut self, text: &str) -> Self {
        self.paragraphs.push(text.to_string());
        self
    }

    pub fn document_xml(&self) -> String {
        let body: String = self
            .paragraphs
            .iter()
            .map(|p| {
                format!(
                    r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
                    escape_xml(p)
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{}"><w:body>{}</w:body></w:document>"#,
            W_NS, body
        )
    }

    pub fn build(self) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("[Content_Types].xml", SimpleFileOptions::default())
            .expect("Failed to start content types part");
        writer
            .write_all(br#"<?xml version="1.0"?><Types/>"#)
            .expect("Failed to write content types part");
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .expect("Failed to start document part");
        writer
            .write_all(self.document_xml().as_bytes())
            .expect("Failed to write document part");
        writer
            .finish()
            .expect("Failed to finish DOCX package")
            .into_inner()
    }
}

impl Default for DocxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `FieldCodeCatalog` instances.
pub struct CatalogBuilder {
    specs: Vec<FieldCodeSpec>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self { specs: vec![] }
    }

    pub fn literal(mut self, pattern: &str, label: &str) -> Self {
        self.specs.push(FieldCodeSpec::literal(pattern, label));
        self
    }

    pub fn regex(mut self, pattern: &str, label: &str) -> Self {
        self.specs.push(FieldCodeSpec::regex(pattern, label));
        self
    }

    pub fn build(self) -> FieldCodeCatalog {
        FieldCodeCatalog::new(&self.specs).expect("Failed to build catalog")
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Two-entry catalog used by most scheduler tests.
pub fn fc_rq_catalog() -> FieldCodeCatalog {
    CatalogBuilder::new()
        .literal("<FC", "Field Code")
        .literal("<RQ", "Required Question")
        .build()
}

/// `count` plain-text templates named `t00`, `t01`, ... where template `i`
/// holds `i % 5` `<FC>` codes and `i % 3` `<RQ>` codes.
pub fn numbered_templates(count: usize) -> Vec<Template> {
    (0..count)
        .map(|i| {
            let content = format!("{}{}", "<FC>".repeat(i % 5), "<RQ>".repeat(i % 3));
            Template::new(format!("t{:02}", i), content)
        })
        .collect()
}

pub fn numbered_source(count: usize) -> MemorySource {
    MemorySource::new(numbered_templates(count))
}

/// Extractor that reads bytes as UTF-8 and fails for chosen template
/// contents.
pub struct ScriptedExtractor {
    fail_on: HashSet<Vec<u8>>,
    slow_on: HashMap<Vec<u8>, Duration>,
    delay: Duration,
}

impl ScriptedExtractor {
    pub fn new() -> Self {
        Self {
            fail_on: HashSet::new(),
            slow_on: HashMap::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn fail_on(mut self, content: &[u8]) -> Self {
        self.fail_on.insert(content.to_vec());
        self
    }

    /// Sleeps `delay` before handling this content, on top of the base delay.
    pub fn slow_on(mut self, content: &[u8], delay: Duration) -> Self {
        self.slow_on.insert(content.to_vec(), delay);
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl template_analyser::TextExtractor for ScriptedExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        if let Some(extra) = self.slow_on.get(bytes) {
            thread::sleep(*extra);
        }
        if self.fail_on.contains(bytes) {
            return Err(ExtractionError::TextExtraction(
                "renderer rejected template".to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(bytes).to_string())
    }
}

/// Extractor that records the highest number of calls running at once.
pub struct ConcurrencyMeter {
    active: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
    delay: Duration,
    limit: Option<usize>,
}

impl ConcurrencyMeter {
    pub fn new(delay: Duration) -> Self {
        Self {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            delay,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl template_analyser::TextExtractor for ConcurrencyMeter {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.delay);
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(String::from_utf8_lossy(bytes).to_string())
    }

    fn max_concurrency(&self) -> Option<usize> {
        self.limit
    }
}

/// Extractor that writes `start <id>` and `end <id>` to a shared event log,
/// where the id is the template content. Listeners can append to the same
/// log to interleave progress with extraction.
pub struct EventLogExtractor {
    events: Mutex<Vec<String>>,
    delay: Duration,
    slow: HashMap<String, Duration>,
}

impl EventLogExtractor {
    pub fn new(delay: Duration) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            delay,
            slow: HashMap::new(),
        }
    }

    pub fn slow_on(mut self, id: &str, delay: Duration) -> Self {
        self.slow.insert(id.to_string(), delay);
        self
    }

    pub fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Position of the first event equal to `event`.
    pub fn position(&self, event: &str) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }
}

impl template_analyser::TextExtractor for EventLogExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let id = String::from_utf8_lossy(bytes).to_string();
        self.record(format!("start {}", id));
        let delay = self.slow.get(&id).copied().unwrap_or(self.delay);
        thread::sleep(delay);
        self.record(format!("end {}", id));
        Ok(id)
    }
}

/// Templates `e0`, `e1`, ... whose content equals their name.
pub fn event_templates(count: usize) -> Vec<Template> {
    (0..count)
        .map(|i| Template::new(format!("e{}", i), format!("e{}", i)))
        .collect()
}

/// Source whose declared count disagrees with what it streams.
pub struct MiscountedSource {
    declared: usize,
    templates: Vec<Template>,
}

impl MiscountedSource {
    pub fn new(declared: usize, templates: Vec<Template>) -> Self {
        Self {
            declared,
            templates,
        }
    }
}

impl TemplateSource for MiscountedSource {
    fn total_count(&mut self) -> Result<usize, SourceError> {
        Ok(self.declared)
    }

    fn templates(&mut self) -> Result<TemplateIter<'_>, SourceError> {
        Ok(Box::new(self.templates.iter().cloned().map(Ok)))
    }
}

/// Source that yields an error after `good` templates.
pub struct BrokenSource {
    good: Vec<Template>,
    declared: usize,
}

impl BrokenSource {
    pub fn new(good: Vec<Template>, declared: usize) -> Self {
        Self { good, declared }
    }
}

impl TemplateSource for BrokenSource {
    fn total_count(&mut self) -> Result<usize, SourceError> {
        Ok(self.declared)
    }

    fn templates(&mut self) -> Result<TemplateIter<'_>, SourceError> {
        let failure = std::iter::once(Err(SourceError::MissingRow { rowid: 42 }));
        Ok(Box::new(self.good.iter().cloned().map(Ok).chain(failure)))
    }
}
