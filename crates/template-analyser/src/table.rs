use std::collections::BTreeSet;

use crate::result::RunResult;

/// One table row: a template and its count per column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub template: String,
    pub cells: Vec<usize>,
}

/// Rectangular view of a [`RunResult`]: one row per template, one column
/// per field-code label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<TableRow>,
}

impl Table {
    /// Field-code labels in column order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn cell(&self, template: &str, label: &str) -> Option<usize> {
        let column = self.columns.iter().position(|c| c == label)?;
        self.rows
            .iter()
            .find(|r| r.template == template)
            .and_then(|r| r.cells.get(column).copied())
    }
}

/// Pivots a run result into a table.
///
/// Columns are the union of every label seen, sorted by byte order. Rows keep
/// the result's order. A label a template never reported reads as 0.
pub fn build_table(result: &RunResult) -> Table {
    let columns: Vec<String> = result
        .iter()
        .flat_map(|t| t.counts.iter().map(|c| c.label.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let rows = result
        .iter()
        .map(|analysis| TableRow {
            template: analysis.name.clone(),
            cells: columns
                .iter()
                .map(|label| analysis.count(label).unwrap_or(0))
                .collect(),
        })
        .collect();

    Table { columns, rows }
}
