//! CSV export of intake records.

use crate::{IntakeRecord, Result};
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    caffeine_mg: f64,
    consumed_at: String,
}

impl From<&IntakeRecord> for CsvRow {
    fn from(record: &IntakeRecord) -> Self {
        CsvRow {
            id: record.id.to_string(),
            caffeine_mg: record.caffeine_mg,
            consumed_at: record.consumed_at.to_rfc3339(),
        }
    }
}

/// Write `records` to a fresh CSV file at `path`, oldest first
///
/// Any existing file is replaced. The header row is always written, even for
/// an empty history. Returns the number of rows written.
pub fn export_records_csv(records: &[IntakeRecord], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut ordered: Vec<&IntakeRecord> = records.iter().collect();
    ordered.sort_by_key(|r| r.consumed_at);

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(["id", "caffeine_mg", "consumed_at"])?;

    for record in &ordered {
        writer.serialize(CsvRow::from(*record))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} records to {:?}", ordered.len(), path);
    Ok(ordered.len())
}
