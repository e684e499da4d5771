//! Error taxonomy for scenario configuration, station decoding, and scenario runs.

use std::path::PathBuf;

/// Invalid scenario geometry or an unknown scenario name.
///
/// Always fatal to the request that triggered it; never corrected silently.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid temperature range: ({min}, {max}) (min must be < max)")]
    InvalidRange { min: f64, max: f64 },

    #[error("invalid bin size: {bin_size} (must be > 0)")]
    InvalidBinSize { bin_size: f64 },

    #[error("temperature range ({min}, {max}) must lie within the overflow edges ({low}, {high})")]
    RangeOutsideOverflow {
        min: f64,
        max: f64,
        low: f64,
        high: f64,
    },

    #[error("bin size {bin_size} needs more than {limit} bins for the range")]
    TooManyBins { bin_size: f64, limit: usize },

    #[error("unknown scenario: {name}")]
    UnknownScenario { name: String },
}

/// A station's raw input could not be turned into a valid hourly series.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed location header: {reason}")]
    Header { reason: String },

    #[error("expected {expected} hourly rows, got {got}")]
    RowCount { expected: usize, got: usize },

    #[error("row {row}: {reason}")]
    Row { row: usize, reason: String },

    #[error("row {row}: non-finite temperature {value}")]
    NonFiniteTemperature { row: usize, value: f64 },

    #[error("unsupported station input: {}", path.display())]
    UnsupportedInput { path: PathBuf },
}

/// Failure of a whole scenario run, as opposed to a single station.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no station inputs found in {}", dir.display())]
    NoInputs { dir: PathBuf },

    #[error("scenario {scenario}: none of {attempted} station(s) processed successfully")]
    EmptyResult { scenario: String, attempted: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("station worker pool closed: {0}")]
    WorkerPool(#[from] tokio::sync::AcquireError),
}
