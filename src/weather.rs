//! Hourly weather records and station metadata handed over by the decoder.

use serde::Serialize;

use crate::error::DecodeError;

/// One non-leap year of hourly rows.
pub const HOURS_PER_YEAR: usize = 8760;

/// Location details carried alongside a station's series.
///
/// Attached to output rows for traceability only; never used in numeric work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationMetadata {
    pub city: String,
    pub state_or_province: String,
    pub country: String,
    pub wmo_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone_offset_hours: f64,
    pub altitude: f64,
}

/// A decoded row in the source's own hour convention (1..=24).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub temp_air: f64,
}

/// An hourly row after hour normalization (0..=23).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlyRecord {
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub temp_air: f64,
}

/// A station's validated year of observations.
#[derive(Debug, Clone)]
pub struct StationSeries {
    metadata: StationMetadata,
    observations: Vec<Observation>,
}

impl StationSeries {
    /// Validates the decoder contract: exactly [`HOURS_PER_YEAR`] rows, calendar
    /// fields in range, and finite temperatures.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] naming the first offending row.
    pub fn new(
        metadata: StationMetadata,
        observations: Vec<Observation>,
    ) -> Result<Self, DecodeError> {
        if observations.len() != HOURS_PER_YEAR {
            return Err(DecodeError::RowCount {
                expected: HOURS_PER_YEAR,
                got: observations.len(),
            });
        }

        for (row, obs) in observations.iter().enumerate() {
            if !(1..=12).contains(&obs.month) {
                return Err(DecodeError::Row {
                    row,
                    reason: format!("month {} out of range 1..=12", obs.month),
                });
            }
            if !(1..=31).contains(&obs.day) {
                return Err(DecodeError::Row {
                    row,
                    reason: format!("day {} out of range 1..=31", obs.day),
                });
            }
            if !(1..=24).contains(&obs.hour) {
                return Err(DecodeError::Row {
                    row,
                    reason: format!("hour {} out of range 1..=24", obs.hour),
                });
            }
            if !obs.temp_air.is_finite() {
                return Err(DecodeError::NonFiniteTemperature {
                    row,
                    value: obs.temp_air,
                });
            }
        }

        Ok(Self {
            metadata,
            observations,
        })
    }

    pub fn metadata(&self) -> &StationMetadata {
        &self.metadata
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Shifts every hour from the source's 1..=24 convention to 0..=23.
    pub fn normalized(&self) -> Vec<HourlyRecord> {
        self.observations
            .iter()
            .map(|o| HourlyRecord {
                month: o.month,
                day: o.day,
                hour: o.hour - 1,
                temp_air: o.temp_air,
            })
            .collect()
    }
}
