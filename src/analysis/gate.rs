//! Suppression of degree hours by daily and weekly block means.

use crate::scenario::{DegreeHourType, ScenarioConfig};

fn favors_load(mean: f64, threshold: f64, degree_type: DegreeHourType) -> bool {
    match degree_type {
        DegreeHourType::Heating => mean < threshold,
        DegreeHourType::Cooling => mean > threshold,
    }
}

/// Whether an hour with these block means keeps its load under `scenario`.
///
/// - daily flag only: the daily mean alone decides.
/// - weekly flag set (with or without daily): the daily mean OR the weekly
///   mean keeps the hour, each against its own threshold.
/// - no flags: heating is always active, cooling never is.
pub fn is_active(daily_mean: f64, weekly_mean: f64, scenario: &ScenarioConfig) -> bool {
    let degree_type = scenario.degree_type();
    let daily = || favors_load(daily_mean, scenario.daily_threshold(), degree_type);
    let weekly = || favors_load(weekly_mean, scenario.weekly_threshold(), degree_type);

    match (scenario.daily_condition(), scenario.weekly_condition()) {
        (true, false) => daily(),
        (_, true) => daily() || weekly(),
        // TODO: asymmetric fallback kept as-is until product review decides on a policy.
        (false, false) => degree_type == DegreeHourType::Heating,
    }
}

/// Zeroes the degree hours of every inactive hour.
///
/// All three slices are indexed by the same hour position.
pub fn apply(
    degree_hours: &[f64],
    daily_means: &[f64],
    weekly_means: &[f64],
    scenario: &ScenarioConfig,
) -> Vec<f64> {
    degree_hours
        .iter()
        .zip(daily_means.iter().zip(weekly_means))
        .map(|(&dh, (&daily, &weekly))| {
            if is_active(daily, weekly, scenario) {
                dh
            } else {
                0.0
            }
        })
        .collect()
}
