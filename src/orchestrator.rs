//! Fan-out of the station pipeline across every station of a scenario.
//!
//! Each station runs on its own blocking task with no shared mutable state;
//! the per-station row sets are concatenated once every task has finished.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::analysis::types::AggregateRow;
use crate::epw::{StationDecoder, is_station_input};
use crate::error::{DecodeError, PipelineError};
use crate::output::{RunSummary, write_summary, write_table};
use crate::pipeline::run_station;
use crate::scenario::{ScenarioConfig, catalog};

/// A station that was excluded from a scenario's table, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct StationFailure {
    pub station: PathBuf,
    pub cause: String,
}

/// Concatenated rows of every successful station for one scenario.
#[derive(Debug, Clone)]
pub struct ScenarioTable {
    pub scenario: String,
    pub rows: Vec<AggregateRow>,
    pub succeeded: Vec<PathBuf>,
    pub failures: Vec<StationFailure>,
}

impl ScenarioTable {
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failures.len()
    }
}

/// Lists every station input in `dir`, sorted by path.
///
/// # Errors
///
/// Returns [`PipelineError::NoInputs`] if the directory holds no station
/// inputs, or an I/O error if it cannot be read.
pub fn discover_stations(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let mut stations = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_station_input(&path) {
            stations.push(path);
        }
    }

    if stations.is_empty() {
        return Err(PipelineError::NoInputs {
            dir: dir.to_path_buf(),
        });
    }

    stations.sort();
    Ok(stations)
}

/// Degree of parallelism: the request (or the machine's available
/// parallelism), capped by both the available parallelism and the station
/// count, and never below one.
pub fn worker_count(requested: Option<usize>, stations: usize) -> usize {
    let available = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    requested
        .unwrap_or(available)
        .min(available)
        .min(stations)
        .max(1)
}

struct StationRun {
    rows: Vec<AggregateRow>,
    elapsed: Duration,
}

fn process_station<D: StationDecoder + ?Sized>(
    decoder: &D,
    path: &Path,
    scenario: &ScenarioConfig,
) -> Result<StationRun, DecodeError> {
    let start = Instant::now();
    let series = decoder.decode(path)?;
    let rows = run_station(&series, scenario);
    Ok(StationRun {
        rows,
        elapsed: start.elapsed(),
    })
}

/// Runs the station pipeline for every input under `scenario`.
///
/// Failed stations are logged and listed in [`ScenarioTable::failures`]; they
/// never affect other stations. The result does not depend on `workers`
/// beyond row order.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyResult`] if no station succeeded.
#[tracing::instrument(skip_all, fields(scenario = %scenario.name(), stations = stations.len()))]
pub async fn run_scenario<D>(
    stations: &[PathBuf],
    decoder: Arc<D>,
    scenario: &ScenarioConfig,
    workers: Option<usize>,
) -> Result<ScenarioTable, PipelineError>
where
    D: StationDecoder + 'static,
{
    let workers = worker_count(workers, stations.len());
    info!(workers, "Processing stations");
    let start = Instant::now();

    let semaphore = Arc::new(Semaphore::new(workers));
    let scenario_arc = Arc::new(scenario.clone());
    let mut tasks = Vec::with_capacity(stations.len());

    for path in stations {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await?;
        let decoder = decoder.clone();
        let scenario = scenario_arc.clone();
        let path = path.clone();
        let span = tracing::info_span!("station", station = %path.display());

        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let _enter = span.enter();
            process_station(decoder.as_ref(), &path, &scenario)
        });
        tasks.push(task);
    }

    let mut table = ScenarioTable {
        scenario: scenario.name().to_string(),
        rows: Vec::new(),
        succeeded: Vec::new(),
        failures: Vec::new(),
    };

    for (path, task) in stations.iter().zip(tasks) {
        let cause = match task.await {
            Ok(Ok(run)) => {
                info!(
                    station = %path.display(),
                    rows = run.rows.len(),
                    elapsed_ms = run.elapsed.as_millis() as u64,
                    "Station processed"
                );
                table.rows.extend(run.rows);
                table.succeeded.push(path.clone());
                continue;
            }
            Ok(Err(e)) => e.to_string(),
            Err(e) => format!("station task failed: {e}"),
        };

        error!(station = %path.display(), error = %cause, "Station excluded");
        table.failures.push(StationFailure {
            station: path.clone(),
            cause,
        });
    }

    if table.succeeded.is_empty() {
        return Err(PipelineError::EmptyResult {
            scenario: table.scenario,
            attempted: stations.len(),
        });
    }

    info!(
        succeeded = table.succeeded.len(),
        failed = table.failures.len(),
        rows = table.rows.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Scenario processed"
    );
    Ok(table)
}

/// Discovers stations in `weather_dir`, runs `scenario`, and writes
/// `<scenario>.csv` and `<scenario>.summary.json` into `results_dir`.
///
/// Nothing is written when the run produces no successful station.
#[tracing::instrument(skip(decoder, scenario), fields(scenario = %scenario.name()))]
pub async fn run_and_save<D>(
    weather_dir: &Path,
    results_dir: &Path,
    decoder: Arc<D>,
    scenario: &ScenarioConfig,
    workers: Option<usize>,
) -> Result<RunSummary, PipelineError>
where
    D: StationDecoder + 'static,
{
    let stations = discover_stations(weather_dir)?;
    let table = run_scenario(&stations, decoder, scenario, workers).await?;

    std::fs::create_dir_all(results_dir)?;
    let csv_path = results_dir.join(format!("{}.csv", table.scenario));
    write_table(&csv_path, &table.rows)?;

    let summary = RunSummary::from_table(&table);
    write_summary(
        &results_dir.join(format!("{}.summary.json", table.scenario)),
        &summary,
    )?;

    info!(path = %csv_path.display(), "Results saved");
    Ok(summary)
}

/// Runs the whole catalog in order. A failing scenario is logged and does
/// not stop the ones after it.
pub async fn run_all<D>(
    weather_dir: &Path,
    results_dir: &Path,
    decoder: Arc<D>,
    workers: Option<usize>,
) -> Vec<(String, Result<RunSummary, PipelineError>)>
where
    D: StationDecoder + 'static,
{
    let mut outcomes = Vec::with_capacity(catalog().len());

    for scenario in catalog() {
        let outcome =
            run_and_save(weather_dir, results_dir, decoder.clone(), scenario, workers).await;
        if let Err(e) = &outcome {
            warn!(scenario = %scenario.name(), error = %e, "Scenario failed");
        }
        outcomes.push((scenario.name().to_string(), outcome));
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::lookup;
    use crate::weather::tests::{metadata, year_of};
    use crate::weather::StationSeries;

    /// Decodes by file name: `bad*` fails, `panic*` panics, anything else is
    /// a synthetic station named after the file stem.
    struct FakeDecoder;

    impl StationDecoder for FakeDecoder {
        fn decode(&self, path: &Path) -> Result<StationSeries, DecodeError> {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
            if stem.starts_with("bad") {
                return Err(DecodeError::RowCount {
                    expected: 8760,
                    got: 12,
                });
            }
            if stem.starts_with("panic") {
                panic!("decoder blew up");
            }
            let offset = stem.len() as f64;
            StationSeries::new(metadata(stem), year_of(|i| ((i % 240) as f64) / 8.0 - offset))
        }
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| PathBuf::from(format!("{n}.epw"))).collect()
    }

    fn sorted(mut rows: Vec<AggregateRow>) -> Vec<String> {
        rows.sort_by(|a, b| {
            (&a.city, a.hour, a.bin_lower.to_bits()).cmp(&(&b.city, b.hour, b.bin_lower.to_bits()))
        });
        rows.iter().map(|r| format!("{r:?}")).collect()
    }

    fn available() -> usize {
        std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    }

    #[test]
    fn test_worker_count_bounds() {
        assert_eq!(worker_count(Some(8), 1), 1);
        assert_eq!(worker_count(Some(1), 10), 1);
        assert_eq!(worker_count(Some(0), 10), 1);
        assert_eq!(worker_count(Some(4), 0), 1);
        assert_eq!(worker_count(None, 10_000), available());
    }

    #[test]
    fn test_worker_count_never_exceeds_available_parallelism() {
        let available = available();
        assert!(worker_count(Some(available * 16), 10_000) <= available);
        assert_eq!(worker_count(Some(available * 16), 10_000), available);
    }

    #[tokio::test]
    async fn test_failed_stations_are_excluded_others_kept() {
        let stations = paths(&["ottawa", "bad_regina", "iqaluit", "panic_yellowknife"]);
        let scenario = lookup("hdh_sc1").unwrap();
        let table = run_scenario(&stations, Arc::new(FakeDecoder), scenario, Some(3))
            .await
            .unwrap();

        assert_eq!(table.succeeded.len(), 2);
        assert_eq!(table.failures.len(), 2);
        assert_eq!(table.attempted(), 4);

        let mut cities: Vec<_> = table.rows.iter().map(|r| r.city.as_str()).collect();
        cities.sort();
        cities.dedup();
        assert_eq!(cities, vec!["iqaluit", "ottawa"]);

        let failed: Vec<_> = table.failures.iter().map(|f| f.station.clone()).collect();
        assert!(failed.contains(&PathBuf::from("bad_regina.epw")));
        assert!(failed.contains(&PathBuf::from("panic_yellowknife.epw")));
    }

    #[tokio::test]
    async fn test_all_failures_is_an_empty_result() {
        let stations = paths(&["bad_a", "bad_b"]);
        let err = run_scenario(&stations, Arc::new(FakeDecoder), lookup("cdh_sc1").unwrap(), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::EmptyResult { attempted: 2, .. }
        ));
    }

    #[tokio::test]
    async fn test_parallel_matches_sequential() {
        let stations = paths(&["a", "bb", "ccc", "dddd", "eeeee", "ffffff"]);
        let scenario = lookup("hdh_sc3").unwrap();

        let sequential = run_scenario(&stations, Arc::new(FakeDecoder), scenario, Some(1))
            .await
            .unwrap();
        let parallel = run_scenario(&stations, Arc::new(FakeDecoder), scenario, Some(4))
            .await
            .unwrap();

        assert_eq!(sequential.rows.len(), parallel.rows.len());
        assert_eq!(sorted(sequential.rows), sorted(parallel.rows));
    }

    #[tokio::test]
    async fn test_table_is_a_plain_concatenation() {
        let scenario = lookup("hdh_sc2").unwrap();
        let one = run_scenario(&paths(&["a"]), Arc::new(FakeDecoder), scenario, None)
            .await
            .unwrap();
        let two = run_scenario(&paths(&["bb"]), Arc::new(FakeDecoder), scenario, None)
            .await
            .unwrap();
        let both = run_scenario(&paths(&["a", "bb"]), Arc::new(FakeDecoder), scenario, None)
            .await
            .unwrap();

        assert_eq!(both.rows.len(), one.rows.len() + two.rows.len());
    }

    #[test]
    fn test_discover_only_lists_station_inputs() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.zip", "a.epw", "notes.txt", "c.ZIP"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let found = discover_stations(dir.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.epw", "b.zip", "c.ZIP"]);
    }

    #[test]
    fn test_discover_empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_stations(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::NoInputs { .. }));
    }
}
