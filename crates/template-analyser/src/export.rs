//! CSV rendering of an analysis [`Table`].
//!
//! Header is `Template name` followed by the table's columns. Records end
//! with CRLF; fields are quoted only when they contain a comma, a quote or a
//! line break, with embedded quotes doubled.
//!
//! A record made of a single empty field is written as `""` so it stays
//! distinguishable from a blank line. Tables built by [`run_analysis`] always
//! have at least one column because the catalog cannot be empty, so this
//! only affects hand-built tables.
//!
//! [`run_analysis`]: crate::run_analysis

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;

use crate::error::ExportError;
use crate::table::Table;

pub const TEMPLATE_NAME_HEADER: &str = "Template name";

fn writer_builder() -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    builder
        .terminator(csv::Terminator::CRLF)
        .quote_style(csv::QuoteStyle::Necessary);
    builder
}

pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<(), ExportError> {
    let mut csv_writer = writer_builder().from_writer(writer);

    let mut header = Vec::with_capacity(table.columns().len() + 1);
    header.push(TEMPLATE_NAME_HEADER);
    header.extend(table.columns().iter().map(String::as_str));
    csv_writer.write_record(&header)?;

    for row in table.rows() {
        let mut record = Vec::with_capacity(row.cells.len() + 1);
        record.push(row.template.clone());
        record.extend(row.cells.iter().map(usize::to_string));
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Renders the table to an in-memory CSV string.
pub fn export_csv(table: &Table) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_csv(table, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Writes the table to `path`, replacing any existing file.
pub fn export_csv_file(table: &Table, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_csv(table, &mut writer)?;
    writer.flush()?;

    info!(
        "Wrote {} rows x {} columns to {}",
        table.rows().len(),
        table.columns().len(),
        path.display()
    );
    Ok(())
}
