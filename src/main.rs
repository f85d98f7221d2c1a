use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use salesnorm::{
    config::{Config, DEFAULT_CONFIG},
    load::CsvLoader,
    pipeline::{run_pipeline, LogStatusSink},
};
use std::{env, path::Path};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();

    // ─── 2) args ─────────────────────────────────────────────────────
    let args: Vec<String> = env::args().skip(1).collect();
    let (file, distributor, month) = match args.as_slice() {
        [file, distributor, month] => (file, distributor, month),
        _ => bail!("usage: salesnorm <report-file> <distributor> <month YYYY-MM>"),
    };
    NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .with_context(|| format!("invalid reporting month `{month}`, expected YYYY-MM"))?;

    // ─── 3) config ───────────────────────────────────────────────────
    let config = match env::var("SALESNORM_CONFIG") {
        Ok(path) => Config::from_path(&path)
            .with_context(|| format!("loading column configuration from `{path}`"))?,
        Err(_) => Config::from_json(DEFAULT_CONFIG).context("loading built-in configuration")?,
    };
    info!(fields = config.rules().len(), "configuration loaded");

    // ─── 4) run ──────────────────────────────────────────────────────
    let loader = CsvLoader::new("out");
    let run_id = format!("run-{}", Utc::now().format("%Y%m%dT%H%M%S%f"));
    run_pipeline(
        Path::new(file),
        &run_id,
        distributor,
        month,
        &config,
        &loader,
        &LogStatusSink,
    )?;

    Ok(())
}
