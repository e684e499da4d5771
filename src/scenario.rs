//! Scenario configuration and the fixed catalog of six analysis variants.

use std::fmt;
use std::sync::LazyLock;

use serde::Serialize;

use crate::analysis::bins::validate_geometry;
use crate::error::ConfigError;

/// Load direction of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DegreeHourType {
    Heating,
    Cooling,
}

impl fmt::Display for DegreeHourType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegreeHourType::Heating => f.write_str("heating"),
            DegreeHourType::Cooling => f.write_str("cooling"),
        }
    }
}

/// One immutable analysis variant.
///
/// Construction through [`ScenarioConfig::new`] rejects a degenerate
/// temperature range or a non-positive bin size, so every value of this type
/// is usable by the binner and the gate without further checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioConfig {
    name: String,
    degree_type: DegreeHourType,
    daily_threshold: f64,
    weekly_threshold: f64,
    temp_range: (f64, f64),
    bin_size: f64,
    daily_condition: bool,
    weekly_condition: bool,
}

impl ScenarioConfig {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        degree_type: DegreeHourType,
        daily_threshold: f64,
        weekly_threshold: f64,
        temp_range: (f64, f64),
        bin_size: f64,
        daily_condition: bool,
        weekly_condition: bool,
    ) -> Result<Self, ConfigError> {
        validate_geometry(temp_range.0, temp_range.1, bin_size)?;

        Ok(Self {
            name: name.into(),
            degree_type,
            daily_threshold,
            weekly_threshold,
            temp_range,
            bin_size,
            daily_condition,
            weekly_condition,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn degree_type(&self) -> DegreeHourType {
        self.degree_type
    }

    pub fn daily_threshold(&self) -> f64 {
        self.daily_threshold
    }

    pub fn weekly_threshold(&self) -> f64 {
        self.weekly_threshold
    }

    pub fn temp_range(&self) -> (f64, f64) {
        self.temp_range
    }

    pub fn bin_size(&self) -> f64 {
        self.bin_size
    }

    pub fn daily_condition(&self) -> bool {
        self.daily_condition
    }

    pub fn weekly_condition(&self) -> bool {
        self.weekly_condition
    }
}

/// Heating bins and cooling bins share this geometry except `cdh_sc3`.
const COLD_RANGE: (f64, f64) = (-29.2, 12.8);
const HOT_RANGE: (f64, f64) = (23.6, 43.2);
const BIN_SIZE: f64 = 2.8;

static CATALOG: LazyLock<Vec<ScenarioConfig>> = LazyLock::new(|| {
    use DegreeHourType::{Cooling, Heating};

    let presets = [
        ("hdh_sc1", Heating, 18.3, 18.3, COLD_RANGE, false),
        ("hdh_sc2", Heating, 14.9, 18.3, COLD_RANGE, false),
        ("hdh_sc3", Heating, 14.9, 17.1, COLD_RANGE, true),
        ("cdh_sc1", Cooling, 18.3, 18.3, COLD_RANGE, false),
        ("cdh_sc2", Cooling, 22.8, 18.3, COLD_RANGE, false),
        ("cdh_sc3", Cooling, 22.8, 19.5, HOT_RANGE, true),
    ];

    presets
        .into_iter()
        .map(|(name, degree_type, daily, weekly, range, weekly_condition)| {
            ScenarioConfig {
                name: name.to_string(),
                degree_type,
                daily_threshold: daily,
                weekly_threshold: weekly,
                temp_range: range,
                bin_size: BIN_SIZE,
                daily_condition: true,
                weekly_condition,
            }
        })
        .collect()
});

/// All six catalog scenarios, heating first, in their canonical run order.
pub fn catalog() -> &'static [ScenarioConfig] {
    &CATALOG
}

/// Looks up a catalog scenario by its name (e.g. `"hdh_sc1"`).
///
/// # Errors
///
/// Returns [`ConfigError::UnknownScenario`] if no catalog entry has this name.
pub fn lookup(name: &str) -> Result<&'static ScenarioConfig, ConfigError> {
    catalog()
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| ConfigError::UnknownScenario {
            name: name.to_string(),
        })
}
