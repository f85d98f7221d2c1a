//! Structural cleaning: header promotion and removal of fully-missing rows
//! and columns. The transformer applies these in a fixed order: promote the
//! header first, then drop empty columns, then drop empty rows.

use tracing::debug;

use crate::error::PipelineError;
use crate::table::Table;

/// Find the first row containing a numeric-looking cell (that row starts the
/// data body), then derive each column's label from the first non-missing
/// cell scanning upward from just above the data start. Columns with nothing
/// above the data start keep their positional label. Rows above the data
/// start are discarded.
///
/// A table with no numeric-looking cell anywhere is not a recognizable
/// report and fails the run with a `Structure` error.
pub fn promote_header(table: Table) -> Result<Table, PipelineError> {
    let start = (0..table.n_rows())
        .find(|&r| (0..table.n_cols()).any(|c| table.cell(r, c).is_numeric_like()))
        .ok_or_else(|| {
            PipelineError::Structure("no row with numeric-looking values found".to_string())
        })?;

    let labels: Vec<String> = (0..table.n_cols())
        .map(|c| {
            match (0..start).rev().find(|&r| !table.cell(r, c).is_missing()) {
                Some(r) => table.cell(r, c).to_string(),
                None => table.label(c).to_string(),
            }
        })
        .collect();

    debug!(data_start = start, "promoted header");

    let (_, mut rows) = table.into_parts();
    let body = rows.split_off(start);
    Ok(Table::with_labels(labels, body))
}

/// Remove every column whose every cell is `Missing`, preserving the order of
/// the rest.
pub fn drop_empty_columns(table: Table) -> Table {
    let keep: Vec<usize> = (0..table.n_cols())
        .filter(|&c| table.column(c).any(|cell| !cell.is_missing()))
        .collect();
    if keep.len() == table.n_cols() {
        return table;
    }

    let (labels, rows) = table.into_parts();
    let labels = keep.iter().map(|&c| labels[c].clone()).collect();
    let rows = rows
        .into_iter()
        .map(|row| keep.iter().map(|&c| row[c].clone()).collect())
        .collect();
    Table::with_labels(labels, rows)
}

/// Remove every row whose every cell is `Missing`; the remaining rows stay
/// contiguous in their original order.
pub fn drop_empty_rows(table: Table) -> Table {
    let (labels, rows) = table.into_parts();
    let rows = rows
        .into_iter()
        .filter(|row| row.iter().any(|cell| !cell.is_missing()))
        .collect();
    Table::with_labels(labels, rows)
}
