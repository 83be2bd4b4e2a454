//! CSV export of completion history.

use crate::{CompletionRecord, Result};
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    id: String,
    user_id: &'a str,
    exercise_id: &'a str,
    exercise_kind: &'static str,
    date: String,
    completed_at: String,
}

impl<'a> From<&'a CompletionRecord> for CsvRow<'a> {
    fn from(record: &'a CompletionRecord) -> Self {
        CsvRow {
            id: record.id.to_string(),
            user_id: record.user_id.as_str(),
            exercise_id: &record.exercise_id,
            exercise_kind: record.exercise_kind.slug(),
            date: record.date.format("%Y-%m-%d").to_string(),
            completed_at: record.completed_at.to_rfc3339(),
        }
    }
}

/// Write completion records to a CSV file, replacing it
///
/// The file always gets a header row, even with no records. Returns the
/// number of rows written.
pub fn write_completions_csv(records: &[CompletionRecord], csv_path: &Path) -> Result<usize> {
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(csv_path)?;
    writer.write_record([
        "id",
        "user_id",
        "exercise_id",
        "exercise_kind",
        "date",
        "completed_at",
    ])?;

    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} completions to {:?}", records.len(), csv_path);
    Ok(records.len())
}
