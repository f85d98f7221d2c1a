use std::path::PathBuf;
use thiserror::Error;

/// Terminal failures of a normalization run. The core never retries: every
/// variant aborts the current run and surfaces to the caller as a single
/// status update, so a run is all-or-nothing.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// File extension is not one of `.xlsx`, `.xls`, `.csv`. Detected before
    /// any parsing happens.
    #[error("unsupported file format `{0}`")]
    UnsupportedFormat(String),

    /// The table has no recognizable data body (no row with numeric-looking
    /// content), so there is nothing to promote a header over.
    #[error("{0}")]
    Structure(String),

    /// The extraction adapter could not read the file.
    #[error("failed to extract `{path}`: {source}")]
    Extract {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// The load sink rejected the canonical table.
    #[error("failed to load canonical table: {0}")]
    Load(#[source] anyhow::Error),
}

impl PipelineError {
    /// Stable kind name, used as the prefix of status detail strings.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::UnsupportedFormat(_) => "UnsupportedFormatError",
            PipelineError::Structure(_) => "StructureError",
            PipelineError::Extract { .. } => "ExtractError",
            PipelineError::Load(_) => "LoadError",
        }
    }
}
