//! Per-station composition of the analysis passes.
//!
//! A run is a pure function of the station's series and the scenario: it
//! reads and writes no state belonging to other stations or scenarios.

use crate::analysis::aggregate::aggregate;
use crate::analysis::bins::TempBins;
use crate::analysis::block_mean::{DAILY, WEEKLY, block_means};
use crate::analysis::degree_hour::degree_hours;
use crate::analysis::gate;
use crate::analysis::season::classify;
use crate::analysis::types::{AggregateRow, BinnedHour};
use crate::scenario::ScenarioConfig;
use crate::weather::StationSeries;

/// Runs every pass over one station and returns its aggregated rows.
///
/// Order is fixed: hour normalization, degree hours, daily then weekly block
/// means, the conditional gate, seasons, bins, aggregation, and finally the
/// station's location on every row.
pub fn run_station(series: &StationSeries, scenario: &ScenarioConfig) -> Vec<AggregateRow> {
    let records = series.normalized();
    let temps: Vec<f64> = records.iter().map(|r| r.temp_air).collect();

    let raw_load = degree_hours(&temps, scenario);
    let daily = block_means(&temps, DAILY);
    let weekly = block_means(&temps, WEEKLY);
    let load = gate::apply(&raw_load, &daily, &weekly, scenario);

    let bins = TempBins::for_scenario(scenario);
    let hours: Vec<BinnedHour> = records
        .iter()
        .zip(&load)
        .map(|(r, &degree_hour)| BinnedHour {
            hour: r.hour,
            temp_air: r.temp_air,
            degree_hour,
            season: classify(r.month, r.day),
            bin: bins.assign(r.temp_air),
        })
        .collect();

    aggregate(&hours, &bins)
        .into_iter()
        .map(|group| group.with_station(series.metadata()))
        .collect()
}
