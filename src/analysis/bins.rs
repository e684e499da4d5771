//! Temperature bin geometry with catch-all overflow intervals.

use crate::analysis::types::TempBin;
use crate::error::ConfigError;
use crate::scenario::ScenarioConfig;

/// Lower edge of the cold overflow bin.
pub const OVERFLOW_LOW: f64 = -100.0;
/// Upper edge of the hot overflow bin.
pub const OVERFLOW_HIGH: f64 = 100.0;
/// Upper bound on real bins per geometry.
pub const MAX_BINS: usize = 1000;

/// Checks a `(min, max, bin_size)` geometry before any edge is built.
///
/// # Errors
///
/// Returns a [`ConfigError`] for a degenerate or NaN range, a non-positive or
/// non-finite bin size, a range touching the overflow edges, or a bin size so
/// small that the range would need more than [`MAX_BINS`] bins.
pub fn validate_geometry(min: f64, max: f64, bin_size: f64) -> Result<(), ConfigError> {
    // NaN fails both comparisons, so it is rejected here too.
    if !(min < max) {
        return Err(ConfigError::InvalidRange { min, max });
    }
    if !(bin_size > 0.0) || !bin_size.is_finite() {
        return Err(ConfigError::InvalidBinSize { bin_size });
    }
    if min <= OVERFLOW_LOW || max >= OVERFLOW_HIGH {
        return Err(ConfigError::RangeOutsideOverflow {
            min,
            max,
            low: OVERFLOW_LOW,
            high: OVERFLOW_HIGH,
        });
    }
    if (max - min) / bin_size >= MAX_BINS as f64 {
        return Err(ConfigError::TooManyBins {
            bin_size,
            limit: MAX_BINS,
        });
    }
    Ok(())
}

/// Sorted bin edges `[OVERFLOW_LOW, real edges.., OVERFLOW_HIGH]`.
///
/// Bin `k` is `(edges[k], edges[k + 1]]`. The first and last bins also absorb
/// values beyond the overflow edges, so every finite temperature maps to
/// exactly one bin.
#[derive(Debug, Clone, PartialEq)]
pub struct TempBins {
    edges: Vec<f64>,
}

impl TempBins {
    /// Real edges are `min + k * bin_size` for every `k` whose edge does not
    /// exceed `max` (within a float tolerance), so the geometry need not land
    /// exactly on `max`.
    ///
    /// # Errors
    ///
    /// See [`validate_geometry`].
    pub fn new(min: f64, max: f64, bin_size: f64) -> Result<Self, ConfigError> {
        validate_geometry(min, max, bin_size)?;
        Ok(Self::from_valid(min, max, bin_size))
    }

    pub fn for_scenario(scenario: &ScenarioConfig) -> Self {
        let (min, max) = scenario.temp_range();
        Self::from_valid(min, max, scenario.bin_size())
    }

    /// Caller guarantees the geometry passed [`validate_geometry`].
    fn from_valid(min: f64, max: f64, bin_size: f64) -> Self {
        let tolerance = bin_size * 1e-9;
        let mut edges = vec![OVERFLOW_LOW];

        let mut k = 0usize;
        loop {
            let edge = min + k as f64 * bin_size;
            if edge > max + tolerance {
                break;
            }
            edges.push(edge);
            k += 1;
        }

        edges.push(OVERFLOW_HIGH);
        Self { edges }
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the bin holding `temp`.
    pub fn assign(&self, temp: f64) -> usize {
        let real = &self.edges[1..self.edges.len() - 1];
        real.partition_point(|&edge| edge < temp)
    }

    /// Edge pair of bin `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn bin(&self, index: usize) -> TempBin {
        TempBin {
            lower: self.edges[index],
            upper: self.edges[index + 1],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::utility::approx_eq;
    use crate::scenario::lookup;

    #[test]
    fn test_edges_for_simple_geometry() {
        let bins = TempBins::new(0.0, 10.0, 5.0).unwrap();
        assert_eq!(bins.edges(), &[-100.0, 0.0, 5.0, 10.0, 100.0]);
        assert_eq!(bins.len(), 4);
    }

    #[test]
    fn test_assigns_concrete_values() {
        let bins = TempBins::new(0.0, 10.0, 5.0).unwrap();
        let bin = |t| bins.bin(bins.assign(t));

        assert_eq!(bin(7.5), TempBin { lower: 5.0, upper: 10.0 });
        assert_eq!(bin(-50.0), TempBin { lower: -100.0, upper: 0.0 });
        assert_eq!(bin(200.0), TempBin { lower: 10.0, upper: 100.0 });
        assert_eq!(bin(-250.0), TempBin { lower: -100.0, upper: 0.0 });
    }

    #[test]
    fn test_upper_edge_is_inclusive() {
        let bins = TempBins::new(0.0, 10.0, 5.0).unwrap();
        assert_eq!(bins.bin(bins.assign(5.0)), TempBin { lower: 0.0, upper: 5.0 });
        assert_eq!(bins.bin(bins.assign(0.0)), TempBin { lower: -100.0, upper: 0.0 });
    }

    #[test]
    fn test_geometry_need_not_reach_max() {
        let bins = TempBins::new(0.0, 10.0, 3.0).unwrap();
        assert_eq!(bins.edges(), &[-100.0, 0.0, 3.0, 6.0, 9.0, 100.0]);
    }

    #[test]
    fn test_catalog_geometry_includes_max() {
        let bins = TempBins::for_scenario(lookup("hdh_sc1").unwrap());
        let edges = bins.edges();
        // 16 real edges from -29.2 to 12.8 plus two overflow edges
        assert_eq!(edges.len(), 18);
        assert!(approx_eq(edges[1], -29.2));
        assert!((edges[16] - 12.8).abs() < 1e-6);

        let bins = TempBins::for_scenario(lookup("cdh_sc3").unwrap());
        assert_eq!(bins.edges().len(), 10);
    }

    #[test]
    fn test_exhaustive_and_non_overlapping() {
        let bins = TempBins::for_scenario(lookup("hdh_sc3").unwrap());
        for step in -3000..=3000 {
            let t = step as f64 / 10.0;
            let index = bins.assign(t);
            assert!(index < bins.len());
            let inner = bins.bin(index);
            let matching = (0..bins.len()).filter(|&k| bins.bin(k).contains(t)).count();
            if t > OVERFLOW_LOW && t <= OVERFLOW_HIGH {
                assert!(inner.contains(t), "{t} not in {inner}");
                assert_eq!(matching, 1);
            } else {
                assert!(index == 0 || index == bins.len() - 1);
            }
        }
    }

    #[test]
    fn test_rejects_invalid_geometry() {
        assert!(matches!(
            TempBins::new(0.0, 10.0, f64::NAN),
            Err(ConfigError::InvalidBinSize { .. })
        ));
        assert!(matches!(
            TempBins::new(0.0, 10.0, 0.0),
            Err(ConfigError::InvalidBinSize { .. })
        ));
        assert!(matches!(
            TempBins::new(0.0, 10.0, -2.8),
            Err(ConfigError::InvalidBinSize { .. })
        ));
        assert!(matches!(
            TempBins::new(10.0, 0.0, 1.0),
            Err(ConfigError::InvalidRange { .. })
        ));
        assert!(matches!(
            TempBins::new(-150.0, 0.0, 1.0),
            Err(ConfigError::RangeOutsideOverflow { .. })
        ));
        assert!(matches!(
            TempBins::new(0.0, 10.0, 1e-12),
            Err(ConfigError::TooManyBins { .. })
        ));
    }
}
