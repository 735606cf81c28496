use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use std::io::{Read, Write};

use super::domain::{ActivityRecord, ActivityStatus, TaskCategory, UserId};

/// Flat row of the activity log as handed to spreadsheet exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    pub id: u64,
    pub user_id: i64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub username: Option<String>,
    pub category: TaskCategory,
    pub link: String,
    pub status: ActivityStatus,
    #[serde(default)]
    pub reason: String,
    pub timestamp: DateTime<FixedOffset>,
}

impl From<&ActivityRecord> for ExportRow {
    fn from(record: &ActivityRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id.0,
            username: record.display_name.clone(),
            category: record.category,
            link: record.proof_link.clone(),
            status: record.status,
            reason: record.reason.clone(),
            timestamp: record.created_at,
        }
    }
}

impl TryFrom<ExportRow> for ActivityRecord {
    type Error = ExportError;

    fn try_from(row: ExportRow) -> Result<Self, Self::Error> {
        let has_reason = !row.reason.trim().is_empty();
        if row.status.is_valid() == has_reason {
            return Err(ExportError::InconsistentReason {
                id: row.id,
                status: row.status.label(),
            });
        }

        Ok(ActivityRecord {
            id: row.id,
            user_id: UserId(row.user_id),
            display_name: row.username,
            category: row.category,
            proof_link: row.link,
            status: row.status,
            reason: row.reason,
            created_at: row.timestamp,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to read or write export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid export CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {id} has status {status} but its reason does not match")]
    InconsistentReason { id: u64, status: &'static str },
}

pub fn write_csv<W: Write>(rows: &[ExportRow], writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Parse an export back into log records, validating the reason/status invariant per row.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<ActivityRecord>, ExportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for row in csv_reader.deserialize::<ExportRow>() {
        records.push(ActivityRecord::try_from(row?)?);
    }

    Ok(records)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
