//! Load boundary: hands the canonical table to a bulk-append sink. The sink
//! behind the trait is external to the core; a failure here fails the whole
//! run and is never retried.

use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
};

use tracing::info;

use crate::error::PipelineError;
use crate::table::Table;

pub trait Loader {
    /// Append every row of `table` to the named target table.
    fn append(&self, table: &Table, target: &str) -> Result<(), PipelineError>;
}

/// File-backed sink: appends to `<out_dir>/<target>.csv`, writing the header
/// only when the file is first created. Stands in for the relational bulk
/// insert in local runs and tests.
pub struct CsvLoader {
    out_dir: PathBuf,
}

impl CsvLoader {
    pub fn new(out_dir: impl Into<PathBuf>) -> CsvLoader {
        CsvLoader {
            out_dir: out_dir.into(),
        }
    }
}

impl Loader for CsvLoader {
    fn append(&self, table: &Table, target: &str) -> Result<(), PipelineError> {
        fs::create_dir_all(&self.out_dir).map_err(|e| PipelineError::Load(e.into()))?;

        let path = self.out_dir.join(format!("{target}.csv"));
        let write_header = !path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| PipelineError::Load(e.into()))?;

        let mut writer = csv::Writer::from_writer(file);
        if write_header {
            writer
                .write_record(table.labels())
                .map_err(|e| PipelineError::Load(e.into()))?;
        }
        for row in table.rows() {
            writer
                .write_record(row.iter().map(|cell| cell.to_string()))
                .map_err(|e| PipelineError::Load(e.into()))?;
        }
        writer.flush().map_err(|e| PipelineError::Load(e.into()))?;

        info!(path = %path.display(), rows = table.n_rows(), "appended canonical table");
        Ok(())
    }
}
