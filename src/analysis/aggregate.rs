use std::collections::BTreeMap;

use crate::analysis::bins::TempBins;
use crate::analysis::types::{BinAggregate, BinnedHour, Season};

#[derive(Default)]
struct Accumulator {
    degree_hour_sum: f64,
    temp_sum: f64,
    members: u32,
    active: u32,
    spring: u32,
    summer: u32,
    fall: u32,
    winter: u32,
}

impl Accumulator {
    fn push(&mut self, h: &BinnedHour) {
        self.degree_hour_sum += h.degree_hour;
        self.temp_sum += h.temp_air;
        self.members += 1;

        if h.degree_hour > 0.0 {
            self.active += 1;
            match h.season {
                Season::Spring => self.spring += 1,
                Season::Summer => self.summer += 1,
                Season::Fall => self.fall += 1,
                Season::Winter => self.winter += 1,
            }
        }
    }
}

/// Groups one station's hours by (hour of day, temperature bin).
///
/// `temp_mean` averages every member of a group, while the hour counts only
/// include members whose degree hour is positive. Groups are returned sorted
/// by hour, then by bin.
pub fn aggregate(hours: &[BinnedHour], bins: &TempBins) -> Vec<BinAggregate> {
    let mut groups: BTreeMap<(u8, usize), Accumulator> = BTreeMap::new();

    for h in hours {
        groups.entry((h.hour, h.bin)).or_default().push(h);
    }

    groups
        .into_iter()
        .map(|((hour, bin), acc)| BinAggregate {
            hour,
            bin: bins.bin(bin),
            degree_hour_sum: acc.degree_hour_sum,
            temp_mean: acc.temp_sum / f64::from(acc.members),
            count_hours_in_bin: acc.active,
            count_hour_spring: acc.spring,
            count_hour_summer: acc.summer,
            count_hour_fall: acc.fall,
            count_hour_winter: acc.winter,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::TempBin;
    use crate::analysis::utility::approx_eq;

    fn hour(hour: u8, temp_air: f64, degree_hour: f64, season: Season, bins: &TempBins) -> BinnedHour {
        BinnedHour {
            hour,
            temp_air,
            degree_hour,
            season,
            bin: bins.assign(temp_air),
        }
    }

    #[test]
    fn test_groups_by_hour_and_bin() {
        let bins = TempBins::new(0.0, 10.0, 5.0).unwrap();
        let hours = vec![
            hour(0, 6.0, 0.5, Season::Winter, &bins),
            hour(0, 8.0, 0.25, Season::Spring, &bins),
            hour(0, 2.0, 0.0, Season::Winter, &bins),
            hour(1, 6.0, 0.1, Season::Fall, &bins),
        ];

        let out = aggregate(&hours, &bins);
        assert_eq!(out.len(), 3);

        let first = &out[0];
        assert_eq!(first.hour, 0);
        assert_eq!(first.bin, TempBin { lower: 0.0, upper: 5.0 });
        assert_eq!(first.count_hours_in_bin, 0);
        assert!(approx_eq(first.temp_mean, 2.0));

        let second = &out[1];
        assert_eq!(second.bin, TempBin { lower: 5.0, upper: 10.0 });
        assert!(approx_eq(second.degree_hour_sum, 0.75));
        assert!(approx_eq(second.temp_mean, 7.0));
        assert_eq!(second.count_hours_in_bin, 2);
        assert_eq!(second.count_hour_winter, 1);
        assert_eq!(second.count_hour_spring, 1);
        assert_eq!(second.count_hour_summer, 0);

        assert_eq!(out[2].hour, 1);
        assert_eq!(out[2].count_hour_fall, 1);
    }

    #[test]
    fn test_temp_mean_includes_inactive_members() {
        let bins = TempBins::new(0.0, 10.0, 5.0).unwrap();
        let hours = vec![
            hour(3, 6.0, 0.0, Season::Summer, &bins),
            hour(3, 10.0, 0.2, Season::Summer, &bins),
        ];
        let out = aggregate(&hours, &bins);
        assert_eq!(out.len(), 1);
        assert!(approx_eq(out[0].temp_mean, 8.0));
        assert_eq!(out[0].count_hours_in_bin, 1);
        assert_eq!(out[0].count_hour_summer, 1);
    }

    #[test]
    fn test_seasonal_counts_sum_to_bin_count() {
        let bins = TempBins::new(-20.0, 20.0, 4.0).unwrap();
        let seasons = [Season::Winter, Season::Spring, Season::Summer, Season::Fall];
        let hours: Vec<_> = (0..500)
            .map(|i| {
                let t = ((i * 13) % 50) as f64 - 25.0;
                let dh = if i % 3 == 0 { 0.0 } else { 0.1 };
                hour((i % 24) as u8, t, dh, seasons[i % 4], &bins)
            })
            .collect();

        let out = aggregate(&hours, &bins);
        let active = hours.iter().filter(|h| h.degree_hour > 0.0).count() as u32;
        assert_eq!(out.iter().map(|r| r.count_hours_in_bin).sum::<u32>(), active);

        for r in &out {
            let seasonal = r.count_hour_spring + r.count_hour_summer + r.count_hour_fall + r.count_hour_winter;
            assert_eq!(seasonal, r.count_hours_in_bin);
        }
    }

    #[test]
    fn test_empty_input_yields_no_groups() {
        let bins = TempBins::new(0.0, 10.0, 5.0).unwrap();
        assert!(aggregate(&[], &bins).is_empty());
    }
}
