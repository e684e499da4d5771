use crate::scenario::{DegreeHourType, ScenarioConfig};

/// Converts a degree-day difference into an hourly rate.
pub const HOURS_PER_DAY: f64 = 24.0;

/// Load of a single hour relative to `threshold`, never negative.
pub fn degree_hour(temp_air: f64, threshold: f64, degree_type: DegreeHourType) -> f64 {
    let excursion = match degree_type {
        DegreeHourType::Heating => threshold - temp_air,
        DegreeHourType::Cooling => temp_air - threshold,
    };
    (excursion / HOURS_PER_DAY).max(0.0)
}

/// Per-hour load for a whole series under the scenario's daily threshold.
pub fn degree_hours(temps: &[f64], scenario: &ScenarioConfig) -> Vec<f64> {
    temps
        .iter()
        .map(|&t| degree_hour(t, scenario.daily_threshold(), scenario.degree_type()))
        .collect()
}
