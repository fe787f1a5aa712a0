//! Run extract, transform and load once, in order.

use crate::acquisition::HttpClient;
use crate::config::EtlConfig;
use crate::error::Result;
use crate::extraction::extract;
use crate::progress::ProgressSink;
use crate::storage::load_table;
use crate::transform::transform;

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub rows_extracted: usize,
    pub rows_written: usize,
    pub columns: Vec<String>,
}

/// Fetch, clean and store the GDP table described by `config`.
///
/// The first failing stage aborts the run; nothing is retried.
pub async fn run_pipeline(config: &EtlConfig, sink: &dyn ProgressSink) -> Result<RunSummary> {
    let client = HttpClient::new(config.timeout)?;

    let raw = extract(&client, &config.url, sink).await?;
    let rows_extracted = raw.row_count();

    let cleaned = transform(raw, sink)?;
    let rows_written = load_table(&cleaned, &config.db_path, &config.table, sink)?;

    sink.progress("ETL pipeline finished successfully");
    Ok(RunSummary {
        rows_extracted,
        rows_written,
        columns: cleaned.column_names(),
    })
}
