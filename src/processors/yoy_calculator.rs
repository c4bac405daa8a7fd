use crate::models::{MonthlyAggregate, YoyAugmentedRecord};
use std::collections::HashMap;
use tracing::debug;

/// Year-over-year change of the monthly mean temperature
pub struct YoyCalculator;

impl YoyCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Attach to each aggregate the difference from the previous year present
    /// in its (station, month) series. The first year of a series has no
    /// delta. Output keeps the input order.
    pub fn calculate(&self, aggregates: Vec<MonthlyAggregate>) -> Vec<YoyAugmentedRecord> {
        let mut series: HashMap<(&str, u32), Vec<usize>> = HashMap::new();
        for (idx, agg) in aggregates.iter().enumerate() {
            series
                .entry((agg.station_id.as_str(), agg.month))
                .or_default()
                .push(idx);
        }

        let mut deltas: Vec<Option<f64>> = vec![None; aggregates.len()];
        for indices in series.values_mut() {
            // stable, so duplicate years keep input order
            indices.sort_by_key(|&i| aggregates[i].year);
            for pair in indices.windows(2) {
                let (prev, curr) = (&aggregates[pair[0]], &aggregates[pair[1]]);
                deltas[pair[1]] = Some(curr.avg_temp - prev.avg_temp);
            }
        }

        debug!(
            "Computed {} year-over-year deltas across {} series",
            deltas.iter().filter(|d| d.is_some()).count(),
            series.len()
        );

        aggregates
            .into_iter()
            .zip(deltas)
            .map(|(agg, delta)| YoyAugmentedRecord::new(agg, delta))
            .collect()
    }
}

impl Default for YoyCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agg(station: &str, year: i32, month: u32, avg: f64) -> MonthlyAggregate {
        MonthlyAggregate::from_temperatures(
            station,
            year,
            month,
            format!("{}-{:02}", year, month),
            &[avg],
        )
        .unwrap()
    }

    #[test]
    fn test_delta_against_prior_year() {
        let out = YoyCalculator::new().calculate(vec![agg("1", 2022, 1, 4.0), agg("1", 2023, 1, 5.0)]);
        assert_eq!(out[0].yoy_delta, None);
        assert_eq!(out[1].yoy_delta, Some(1.0));
    }

    #[test]
    fn test_stable_under_input_reordering() {
        let ordered = vec![
            agg("1", 2021, 6, 15.0),
            agg("1", 2022, 6, 17.5),
            agg("1", 2023, 6, 16.0),
            agg("2", 2022, 6, 10.0),
            agg("1", 2022, 7, 20.0),
        ];
        let mut shuffled = ordered.clone();
        shuffled.reverse();

        let lookup = |records: &[YoyAugmentedRecord]| {
            let mut pairs: Vec<(String, Option<f64>)> = records
                .iter()
                .map(|r| (format!("{}/{}", r.aggregate.station_id, r.aggregate.date_month), r.yoy_delta))
                .collect();
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
            pairs
        };

        let a = YoyCalculator::new().calculate(ordered);
        let b = YoyCalculator::new().calculate(shuffled);
        assert_eq!(lookup(&a), lookup(&b));

        // output order follows the input
        assert_eq!(b[0].aggregate.date_month, "2022-07");
        assert_eq!(a[1].yoy_delta, Some(2.5));
        assert_eq!(a[2].yoy_delta, Some(-1.5));
        assert_eq!(a[3].yoy_delta, None);
        assert_eq!(a[4].yoy_delta, None);
    }

    #[test]
    fn test_gap_year_uses_previous_entry() {
        let out = YoyCalculator::new().calculate(vec![agg("1", 2020, 3, 2.0), agg("1", 2023, 3, 3.0)]);
        assert_eq!(out[1].yoy_delta, Some(1.0));
    }
}
