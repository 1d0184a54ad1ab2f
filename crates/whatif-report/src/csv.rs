//! Impact report as CSV.

use std::path::Path;

use anyhow::{Context, Result};

use whatif_core::ImpactRow;

/// Column order of the impact report.
pub const COLUMNS: [&str; 15] = [
    "subject",
    "stage",
    "stage2_tier_current",
    "question_id",
    "unit",
    "topic",
    "difficulty",
    "time_spent",
    "impact_total_scaled",
    "impact_section_scaled",
    "raw_before",
    "raw_after",
    "scaled_before",
    "scaled_after",
    "tier_upgraded",
];

fn write_rows<W: std::io::Write>(rows: &[ImpactRow], out: W) -> Result<W> {
    // Header is written by hand so an empty report still carries it.
    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush CSV writer: {}", e.error()))
}

/// Render the impact report as a CSV string.
pub fn impacts_to_csv_string(rows: &[ImpactRow]) -> Result<String> {
    let bytes = write_rows(rows, Vec::new())?;
    Ok(String::from_utf8(bytes)?)
}

/// Write the impact report to a CSV file, creating parent directories.
pub fn write_impacts_csv(rows: &[ImpactRow], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_rows(rows, file)?;
    Ok(())
}
