//! Data types shared by the analysis passes and the output table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::weather::StationMetadata;

/// Fixed seasonal label derived from month and day alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
        };
        f.write_str(label)
    }
}

/// Half-open temperature interval `(lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TempBin {
    pub lower: f64,
    pub upper: f64,
}

impl TempBin {
    pub fn contains(&self, temp: f64) -> bool {
        temp > self.lower && temp <= self.upper
    }
}

impl fmt::Display for TempBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}]", self.lower, self.upper)
    }
}

/// An hour after every per-hour pass has run, ready for grouping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinnedHour {
    pub hour: u8,
    pub temp_air: f64,
    pub degree_hour: f64,
    pub season: Season,
    /// Index into the scenario's [`crate::analysis::bins::TempBins`].
    pub bin: usize,
}

/// Reduction of one (hour, bin) group of a single station.
#[derive(Debug, Clone, PartialEq)]
pub struct BinAggregate {
    pub hour: u8,
    pub bin: TempBin,
    pub degree_hour_sum: f64,
    pub temp_mean: f64,
    pub count_hours_in_bin: u32,
    pub count_hour_spring: u32,
    pub count_hour_summer: u32,
    pub count_hour_fall: u32,
    pub count_hour_winter: u32,
}

impl BinAggregate {
    /// Attaches station identification, producing an output table row.
    pub fn with_station(self, metadata: &StationMetadata) -> AggregateRow {
        AggregateRow {
            hour: self.hour,
            bin_lower: self.bin.lower,
            bin_upper: self.bin.upper,
            degree_hour_sum: self.degree_hour_sum,
            temp_mean: self.temp_mean,
            count_hours_in_bin: self.count_hours_in_bin,
            count_hour_spring: self.count_hour_spring,
            count_hour_summer: self.count_hour_summer,
            count_hour_fall: self.count_hour_fall,
            count_hour_winter: self.count_hour_winter,
            city: metadata.city.clone(),
            state_or_province: metadata.state_or_province.clone(),
        }
    }
}

/// A row of the per-scenario output table. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub hour: u8,
    pub bin_lower: f64,
    pub bin_upper: f64,
    pub degree_hour_sum: f64,
    pub temp_mean: f64,
    pub count_hours_in_bin: u32,
    pub count_hour_spring: u32,
    pub count_hour_summer: u32,
    pub count_hour_fall: u32,
    pub count_hour_winter: u32,
    pub city: String,
    pub state_or_province: String,
}
