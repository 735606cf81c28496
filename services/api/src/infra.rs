use chrono::NaiveDate;
use community_tally::error::AppError;
use community_tally::workflows::engagement::export::read_csv;
use community_tally::workflows::engagement::InMemoryActivityLog;
use metrics_exporter_prometheus::PrometheusHandle;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Rebuild an in-memory log from an exported CSV file.
pub(crate) fn load_log_from_path(path: &Path) -> Result<InMemoryActivityLog, AppError> {
    let reader = BufReader::new(File::open(path)?);
    let records = read_csv(reader)?;
    Ok(InMemoryActivityLog::from_records(records)?)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
