//! Persistence of scenario tables.
//!
//! Writes the aggregated rows as CSV and a JSON summary of the run.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use tracing::debug;

use crate::analysis::types::AggregateRow;
use crate::error::PipelineError;
use crate::orchestrator::ScenarioTable;

/// Column order of the scenario table, as written in the CSV header.
pub const COLUMNS: [&str; 12] = [
    "hour",
    "bin_lower",
    "bin_upper",
    "degree_hour_sum",
    "temp_mean",
    "count_hours_in_bin",
    "count_hour_spring",
    "count_hour_summer",
    "count_hour_fall",
    "count_hour_winter",
    "city",
    "state_or_province",
];

/// A failed station as recorded in the run summary.
#[derive(Debug, Clone, Serialize)]
pub struct FailureEntry {
    pub station: String,
    pub cause: String,
}

/// Bookkeeping written next to each scenario's CSV.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub scenario: String,
    pub generated_at: DateTime<Utc>,
    pub stations_attempted: usize,
    pub stations_succeeded: usize,
    pub stations_failed: usize,
    pub rows: usize,
    pub failures: Vec<FailureEntry>,
}

impl RunSummary {
    pub fn from_table(table: &ScenarioTable) -> Self {
        RunSummary {
            scenario: table.scenario.clone(),
            generated_at: Utc::now(),
            stations_attempted: table.attempted(),
            stations_succeeded: table.succeeded.len(),
            stations_failed: table.failures.len(),
            rows: table.rows.len(),
            failures: table
                .failures
                .iter()
                .map(|f| FailureEntry {
                    station: f.station.display().to_string(),
                    cause: f.cause.clone(),
                })
                .collect(),
        }
    }
}

/// Writes `rows` to a CSV file at `path`, replacing any previous file.
///
/// The header is written even when `rows` is empty.
pub fn write_table(path: &Path, rows: &[AggregateRow]) -> Result<(), PipelineError> {
    debug!(path = %path.display(), rows = rows.len(), "Writing CSV table");

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(File::create(path)?);

    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes the run summary as pretty-printed JSON.
pub fn write_summary(path: &Path, summary: &RunSummary) -> Result<(), PipelineError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, summary)?;
    Ok(())
}
