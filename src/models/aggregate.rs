use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Monthly temperature statistics for one station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub station_id: String,
    pub year: i32,
    pub month: u32,
    /// Canonical "YYYY-MM" label
    pub date_month: String,
    pub avg_temp: f64,
    pub min_temp: f64,
    pub max_temp: f64,
    pub observation_count: usize,
}

impl MonthlyAggregate {
    /// Build from the non-null temperatures of one group. Returns `None` for an
    /// empty group.
    pub fn from_temperatures(
        station_id: &str,
        year: i32,
        month: u32,
        date_month: String,
        temperatures: &[f64],
    ) -> Option<Self> {
        if temperatures.is_empty() {
            return None;
        }

        let min_temp = temperatures.iter().copied().fold(f64::INFINITY, f64::min);
        let max_temp = temperatures.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let sum: f64 = temperatures.iter().sum();
        // float rounding can push the mean a hair past an extreme
        let avg_temp = (sum / temperatures.len() as f64).clamp(min_temp, max_temp);

        Some(Self {
            station_id: station_id.to_string(),
            year,
            month,
            date_month,
            avg_temp,
            min_temp,
            max_temp,
            observation_count: temperatures.len(),
        })
    }

    pub fn validate_relationships(&self) -> Result<()> {
        if self.min_temp > self.avg_temp || self.avg_temp > self.max_temp {
            return Err(PipelineError::InvalidFormat(format!(
                "Aggregate {} {} violates min <= mean <= max ({} / {} / {})",
                self.station_id, self.date_month, self.min_temp, self.avg_temp, self.max_temp
            )));
        }
        Ok(())
    }
}

/// A monthly aggregate with its change against the previous year of the series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YoyAugmentedRecord {
    pub aggregate: MonthlyAggregate,
    pub yoy_delta: Option<f64>,
}

impl YoyAugmentedRecord {
    pub fn new(aggregate: MonthlyAggregate, yoy_delta: Option<f64>) -> Self {
        Self {
            aggregate,
            yoy_delta,
        }
    }
}
