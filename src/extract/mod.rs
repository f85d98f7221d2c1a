//! Extraction adapters: read a report file into an untyped [`Table`] with
//! positional column labels. Every file row is treated as data; locating the
//! real header is the structural cleaner's job, not the extractor's.
//!
//! The adapter is selected by file extension: `.xlsx`, `.xls` (calamine) or
//! `.csv`. Anything else is rejected before parsing.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::anyhow;
use calamine::{open_workbook, Data, Reader, Xls, Xlsx};
use tracing::info;

use crate::error::PipelineError;
use crate::table::{Cell, Table};

pub fn extract(path: &Path) -> Result<Table, PipelineError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let table = match ext.as_str() {
        "xlsx" => extract_excel::<Xlsx<_>>(path)?,
        "xls" => extract_excel::<Xls<_>>(path)?,
        "csv" => extract_csv(path)?,
        other => return Err(PipelineError::UnsupportedFormat(other.to_string())),
    };

    info!(
        path = %path.display(),
        rows = table.n_rows(),
        cols = table.n_cols(),
        "extracted raw table"
    );
    Ok(table)
}

fn extract_err(path: &Path, source: anyhow::Error) -> PipelineError {
    PipelineError::Extract {
        path: path.to_path_buf(),
        source,
    }
}

/// Read the first worksheet of an Excel workbook. Works for both the current
/// (`Xlsx`) and the legacy (`Xls`) format.
fn extract_excel<R>(path: &Path) -> Result<Table, PipelineError>
where
    R: Reader<BufReader<File>>,
    R::Error: std::error::Error + Send + Sync + 'static,
{
    let mut workbook: R =
        open_workbook(path).map_err(|e| extract_err(path, anyhow::Error::new(e)))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| extract_err(path, anyhow!("workbook has no sheets")))?
        .map_err(|e| extract_err(path, anyhow::Error::new(e)))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();
    Ok(Table::from_rows(rows))
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Missing,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Int(*i),
        // Integral floats are narrowed so ID-like codes stringify without a
        // trailing `.0`.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Cell::Int(*f as i64),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Text(b.to_string()),
        // Dates must not look numeric, or they would falsely mark the start
        // of the data body.
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => Cell::Text(ndt.to_string()),
            None => Cell::Text(dt.as_f64().to_string()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

/// Read a CSV file headerless and flexible: ragged rows are padded with the
/// missing marker. Empty fields become `Missing`, everything else stays
/// text.
fn extract_csv(path: &Path) -> Result<Table, PipelineError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| extract_err(path, anyhow::Error::new(e)))?;

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| {
            extract_err(
                path,
                anyhow::Error::new(e).context(format!("CSV parse error at record {idx}")),
            )
        })?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Missing
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(Table::from_rows(rows))
}
