//! CSV report of available shelters
//!
//! One row per available shelter with the columns
//! `lat,lng,region,name,url,place_id`. Missing coordinates are written as
//! empty cells. The header is written even when nothing is available.

use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::app::models::AvailableShelter;
use crate::constants::report;
use crate::errors::ReportResult;

/// Write the report to `path`, replacing any existing file
///
/// # Errors
///
/// Returns `ReportError` if the file cannot be created or written
pub fn write_csv(path: &Path, shelters: &[AvailableShelter]) -> ReportResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::File::create(path)?;
    write_rows(file, shelters)?;
    debug!("Wrote {} rows to {}", shelters.len(), path.display());
    Ok(())
}

/// Write the header and rows to any writer
pub fn write_rows<W: Write>(writer: W, shelters: &[AvailableShelter]) -> ReportResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(report::CSV_HEADER)?;
    for shelter in shelters {
        csv_writer.serialize(shelter)?;
    }
    csv_writer.flush()?;
    Ok(())
}
