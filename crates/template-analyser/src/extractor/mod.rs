pub mod docx;
pub mod text;

use std::fmt;

use crate::error::ExtractionError;

pub use docx::DocxExtractor;
pub use text::PlainTextExtractor;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Template container formats recognised from their leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Docx,
    /// OLE compound file, i.e. a legacy binary `.doc`/`.dot`.
    LegacyWord,
    Text,
}

impl DocumentFormat {
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_MAGIC) {
            Self::Docx
        } else if bytes.starts_with(OLE_MAGIC) {
            Self::LegacyWord
        } else {
            Self::Text
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Docx => write!(f, "DOCX"),
            Self::LegacyWord => write!(f, "legacy Word binary"),
            Self::Text => write!(f, "plain text"),
        }
    }
}

/// Turns raw template bytes into searchable plain text.
///
/// Implementations are called from several worker threads at once, never more
/// than the run's worker count.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError>;

    /// Upper bound on simultaneous `extract_text` calls this extractor can
    /// serve. `None` means no limit beyond the run's worker count.
    fn max_concurrency(&self) -> Option<usize> {
        None
    }
}

impl<F> TextExtractor for F
where
    F: Fn(&[u8]) -> Result<String, ExtractionError> + Send + Sync,
{
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        self(bytes)
    }
}

/// Dispatches to a concrete extractor based on the sniffed format.
pub struct ExtractorRegistry {
    docx: DocxExtractor,
    text: PlainTextExtractor,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self {
            docx: DocxExtractor::new(),
            text: PlainTextExtractor::new(),
        }
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for ExtractorRegistry {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        match DocumentFormat::sniff(bytes) {
            DocumentFormat::Docx => self.docx.extract_text(bytes),
            DocumentFormat::Text => self.text.extract_text(bytes),
            DocumentFormat::LegacyWord => Err(ExtractionError::UnsupportedFormat(
                DocumentFormat::LegacyWord.to_string(),
            )),
        }
    }
}
