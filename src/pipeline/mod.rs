//! The run pipeline: extract → transform → load, strictly sequential, one
//! canonical table per uploaded file. A run either completes or fails
//! atomically; status transitions are reported through [`StatusSink`], the
//! only coupling to the external job-tracking subsystem.

use std::path::Path;

use tracing::{error, info};

use crate::config::Config;
use crate::error::PipelineError;
use crate::extract;
use crate::load::Loader;
use crate::transform::Transformer;

/// Target table of the bulk append.
pub const SALES_TABLE: &str = "sales";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Queued,
    Processing,
    Done,
    Error,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::Processing => "processing",
            RunStatus::Done => "done",
            RunStatus::Error => "error",
        }
    }
}

/// Receives run-status transitions. Details carry the terminal error as
/// `"<ErrorKind>: <message>"` on failed runs.
pub trait StatusSink {
    fn update(&self, run_id: &str, status: RunStatus, details: Option<&str>);
}

/// Status sink that only logs transitions; the stand-in when no job store is
/// wired up.
pub struct LogStatusSink;

impl StatusSink for LogStatusSink {
    fn update(&self, run_id: &str, status: RunStatus, details: Option<&str>) {
        match details {
            Some(details) => info!(run_id, status = status.as_str(), details, "run status"),
            None => info!(run_id, status = status.as_str(), "run status"),
        }
    }
}

/// Process one report file end to end. Every failure is terminal: the error
/// is reported through `status` with a detail string and returned; nothing
/// partial is ever loaded.
#[tracing::instrument(level = "info", skip_all, fields(run_id = %run_id, path = %path.display()))]
pub fn run_pipeline(
    path: &Path,
    run_id: &str,
    distributor: &str,
    month: &str,
    config: &Config,
    loader: &dyn Loader,
    status: &dyn StatusSink,
) -> Result<(), PipelineError> {
    status.update(run_id, RunStatus::Queued, None);
    info!(run_id, distributor, month, "starting report processing");

    let result = execute(path, run_id, month, distributor, config, loader, status);
    match &result {
        Ok(()) => {
            status.update(run_id, RunStatus::Done, None);
            info!(run_id, "report processed");
        }
        Err(e) => {
            let details = format!("{}: {}", e.kind(), e);
            error!(run_id, %details, "report processing aborted");
            status.update(run_id, RunStatus::Error, Some(&details));
        }
    }
    result
}

fn execute(
    path: &Path,
    run_id: &str,
    month: &str,
    distributor: &str,
    config: &Config,
    loader: &dyn Loader,
    status: &dyn StatusSink,
) -> Result<(), PipelineError> {
    info!(run_id, step = "extract", "extracting report file");
    let raw = extract::extract(path)?;

    status.update(run_id, RunStatus::Processing, None);
    info!(
        run_id,
        step = "transform",
        rows = raw.n_rows(),
        cols = raw.n_cols(),
        "transforming raw table"
    );
    let canonical = Transformer::new(config).transform(raw, distributor, month)?;

    info!(
        run_id,
        step = "load",
        rows = canonical.n_rows(),
        "loading canonical table"
    );
    loader.append(&canonical, SALES_TABLE)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::CsvLoader;
    use crate::table::Table;
    use std::fs;
    use std::io::Write;
    use std::sync::Mutex;

    /// Records every transition for assertions.
    struct RecordingSink {
        events: Mutex<Vec<(RunStatus, Option<String>)>>,
    }

    impl RecordingSink {
        fn new() -> RecordingSink {
            RecordingSink {
                events: Mutex::new(Vec::new()),
            }
        }

        fn statuses(&self) -> Vec<RunStatus> {
            self.events.lock().unwrap().iter().map(|(s, _)| *s).collect()
        }

        fn last_details(&self) -> Option<String> {
            self.events
                .lock()
                .unwrap()
                .last()
                .and_then(|(_, d)| d.clone())
        }
    }

    impl StatusSink for RecordingSink {
        fn update(&self, _run_id: &str, status: RunStatus, details: Option<&str>) {
            self.events
                .lock()
                .unwrap()
                .push((status, details.map(str::to_string)));
        }
    }

    fn test_config() -> Config {
        Config::from_json(
            r#"{
            "keyword_sets": {
                "clients": { "items": ["ФИО"] },
                "amounts": { "items": ["сумма"] },
                "inn_lengths": { "items": ["10"] }
            },
            "columns": [
                { "target_field": "Клиент", "strategy": "find_header", "keyword_sets": ["clients"] },
                { "target_field": "Сумма", "strategy": "find_most_matches_header", "keyword_sets": ["amounts"] },
                { "target_field": "ИНН клиента", "strategy": "find_numeric_column_with_length_matches", "keyword_sets": ["inn_lengths"] }
            ]
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn csv_report_flows_end_to_end() {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        writeln!(file, "ФИО,Сумма").unwrap();
        writeln!(file, "Иванов И.И.,100").unwrap();
        writeln!(file, "Петров П.П.,200").unwrap();
        writeln!(file, "Сидоров С.С.,300").unwrap();
        file.flush().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let loader = CsvLoader::new(dir.path());
        let sink = RecordingSink::new();
        let config = test_config();

        run_pipeline(
            file.path(),
            "run-1",
            "ООО Дистр",
            "2026-01",
            &config,
            &loader,
            &sink,
        )
        .unwrap();

        assert_eq!(
            sink.statuses(),
            vec![RunStatus::Queued, RunStatus::Processing, RunStatus::Done]
        );

        let content = fs::read_to_string(dir.path().join("sales.csv")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "Клиент,Сумма,ИНН клиента,Дистрибьютор,Месяц"
        );
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "Иванов И.И.,100,,ООО Дистр,2026-01");
        assert_eq!(lines[3], "Сидоров С.С.,300,,ООО Дистр,2026-01");
    }

    #[test]
    fn unsupported_extension_marks_the_run_failed() {
        let dir = tempfile::tempdir().unwrap();
        let loader = CsvLoader::new(dir.path());
        let sink = RecordingSink::new();
        let config = test_config();

        let err = run_pipeline(
            Path::new("report.pdf"),
            "run-2",
            "d",
            "2026-01",
            &config,
            &loader,
            &sink,
        )
        .unwrap_err();

        assert_eq!(err.kind(), "UnsupportedFormatError");
        assert_eq!(sink.statuses(), vec![RunStatus::Queued, RunStatus::Error]);
        let details = sink.last_details().unwrap();
        assert!(details.starts_with("UnsupportedFormatError: "));
    }

    #[test]
    fn structure_failure_produces_no_output() {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        writeln!(file, "только,текст").unwrap();
        writeln!(file, "без,чисел").unwrap();
        file.flush().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let loader = CsvLoader::new(dir.path());
        let sink = RecordingSink::new();
        let config = test_config();

        let err = run_pipeline(
            file.path(),
            "run-3",
            "d",
            "2026-01",
            &config,
            &loader,
            &sink,
        )
        .unwrap_err();

        assert_eq!(err.kind(), "StructureError");
        assert!(!dir.path().join("sales.csv").exists());
    }

    /// Sink that always rejects; load failures must surface as run failures.
    struct FailingLoader;

    impl Loader for FailingLoader {
        fn append(&self, _table: &Table, _target: &str) -> Result<(), PipelineError> {
            Err(PipelineError::Load(anyhow::anyhow!("sink unavailable")))
        }
    }

    #[test]
    fn load_failure_is_terminal() {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        writeln!(file, "ФИО,Сумма").unwrap();
        writeln!(file, "Иванов И.И.,100").unwrap();
        file.flush().unwrap();

        let sink = RecordingSink::new();
        let config = test_config();

        let err = run_pipeline(
            file.path(),
            "run-4",
            "d",
            "2026-01",
            &config,
            &FailingLoader,
            &sink,
        )
        .unwrap_err();

        assert_eq!(err.kind(), "LoadError");
        assert_eq!(
            sink.last_details().unwrap(),
            "LoadError: failed to load canonical table: sink unavailable"
        );
    }
}
