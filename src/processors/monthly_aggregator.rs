use crate::error::{PipelineError, Result};
use crate::models::{MonthlyAggregate, ObservationRecord};
use std::collections::BTreeMap;
use tracing::{debug, info};

type GroupKey = (String, i32, u32);

/// Groups observations by station and calendar month
pub struct MonthlyAggregator;

impl MonthlyAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Monthly mean/min/max over non-null temperatures, ordered by station,
    /// year and month. Months whose readings are all null are omitted.
    pub fn aggregate(&self, records: &[ObservationRecord]) -> Result<Vec<MonthlyAggregate>> {
        if records.is_empty() {
            return Err(PipelineError::EmptyDataset(
                "no observations to aggregate".to_string(),
            ));
        }

        let mut groups: BTreeMap<GroupKey, (String, Vec<f64>)> = BTreeMap::new();
        for record in records {
            let key = (record.station_id.clone(), record.year(), record.month());
            let (_, temps) = groups
                .entry(key)
                .or_insert_with(|| (record.month_label(), Vec::new()));
            if let Some(t) = record.temperature {
                temps.push(t);
            }
        }

        let mut aggregates = Vec::with_capacity(groups.len());
        let mut omitted = 0usize;

        for ((station_id, year, month), (label, temps)) in groups {
            match MonthlyAggregate::from_temperatures(&station_id, year, month, label, &temps) {
                Some(agg) => aggregates.push(agg),
                None => {
                    debug!("{} {}-{:02}: no temperature readings", station_id, year, month);
                    omitted += 1;
                }
            }
        }

        info!(
            "Aggregated {} observations into {} monthly rows ({} empty months omitted)",
            records.len(),
            aggregates.len(),
            omitted
        );
        Ok(aggregates)
    }
}

impl Default for MonthlyAggregator {
    fn default() -> Self {
        Self::new()
    }
}
