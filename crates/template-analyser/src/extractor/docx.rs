use std::io::{Cursor, Read, Seek};

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, Event};
use quick_xml::Reader;
use tracing::trace;

use crate::error::ExtractionError;
use crate::extractor::TextExtractor;

const DOCUMENT_PART: &str = "word/document.xml";

/// Reads the main document part of an Office Open XML package.
pub struct DocxExtractor;

impl DocxExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for DocxExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| ExtractionError::DocxProcessing(format!("Failed to open DOCX: {}", e)))?;

        let text = extract_docx_text(&mut archive)?;
        trace!(chars = text.len(), "Extracted DOCX text");
        Ok(text)
    }
}

fn extract_docx_text<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> Result<String, ExtractionError> {
    let mut document_xml = archive.by_name(DOCUMENT_PART).map_err(|e| {
        ExtractionError::DocxProcessing(format!("Failed to find {}: {}", DOCUMENT_PART, e))
    })?;

    let mut xml_content = String::new();
    document_xml.read_to_string(&mut xml_content).map_err(|e| {
        ExtractionError::DocxProcessing(format!("Failed to read {}: {}", DOCUMENT_PART, e))
    })?;

    parse_docx_xml(&xml_content)
}

/// Collects the text of every `w:t` run, one line per `w:p` paragraph.
///
/// Whitespace is preserved: a field code may be split across runs
/// (`<w:t>&lt;FC&gt;Name</w:t><w:t xml:space="preserve"> Block</w:t>`).
fn parse_docx_xml(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut text = String::new();
    let mut in_text_element = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_element = true;
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text_element = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                b"p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text_element {
                    let decoded = e.decode().map_err(|err| {
                        ExtractionError::DocxProcessing(format!("Invalid text content: {}", err))
                    })?;
                    text.push_str(&decoded);
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if in_text_element {
                    push_entity(&mut text, &e)?;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractionError::DocxProcessing(format!(
                    "XML parsing error: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(text)
}

fn push_entity(text: &mut String, entity: &BytesRef<'_>) -> Result<(), ExtractionError> {
    let invalid =
        |err: &dyn std::fmt::Display| ExtractionError::DocxProcessing(format!("Invalid entity: {}", err));

    if let Some(ch) = entity.resolve_char_ref().map_err(|e| invalid(&e))? {
        text.push(ch);
        return Ok(());
    }

    let name = entity.decode().map_err(|e| invalid(&e))?;
    match resolve_predefined_entity(&name) {
        Some(resolved) => {
            text.push_str(resolved);
            Ok(())
        }
        None => Err(ExtractionError::DocxProcessing(format!(
            "Unknown entity '&{};'",
            name
        ))),
    }
}
