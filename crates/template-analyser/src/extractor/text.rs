use crate::error::ExtractionError;
use crate::extractor::TextExtractor;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}
