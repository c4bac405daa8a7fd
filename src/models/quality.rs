use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::BatchKey;

/// Temperature band outside which a reading counts as an outlier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierBounds {
    pub mean: f64,
    pub std_dev: f64,
    pub lower: f64,
    pub upper: f64,
}

impl OutlierBounds {
    pub fn from_stats(mean: f64, std_dev: f64, sigma: f64) -> Self {
        Self {
            mean,
            std_dev,
            lower: mean - sigma * std_dev,
            upper: mean + sigma * std_dev,
        }
    }

    /// Strictly outside the band
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// Audit summary of one (station, year) batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityRecord {
    pub station_id: String,
    pub year: i32,
    pub record_count: usize,
    /// Only fields with at least one null
    pub null_counts: BTreeMap<String, usize>,
    /// Calendar days inside the observed range with no observation, ascending
    pub missing_dates: Vec<NaiveDate>,
    pub temperature_outliers: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlier_bounds: Option<OutlierBounds>,
}

impl QualityRecord {
    pub fn empty(key: &BatchKey, record_count: usize) -> Self {
        Self {
            station_id: key.station_id.clone(),
            year: key.year,
            record_count,
            null_counts: BTreeMap::new(),
            missing_dates: Vec::new(),
            temperature_outliers: 0,
            outlier_bounds: None,
        }
    }

    pub fn key(&self) -> BatchKey {
        BatchKey::new(self.station_id.clone(), self.year)
    }

    pub fn total_nulls(&self) -> usize {
        self.null_counts.values().sum()
    }

    pub fn has_issues(&self) -> bool {
        !self.null_counts.is_empty()
            || !self.missing_dates.is_empty()
            || self.temperature_outliers > 0
    }
}

/// All quality records of a run, keyed by `station_{id}_{year}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualityReport {
    records: BTreeMap<String, QualityRecord>,
}

impl QualityReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: QualityRecord) {
        self.records.insert(record.key().report_key(), record);
    }

    pub fn get(&self, key: &BatchKey) -> Option<&QualityRecord> {
        self.records.get(&key.report_key())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &QualityRecord> {
        self.records.values()
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Data Quality Report ===\n");
        summary.push_str(&format!("Batches audited: {}\n", self.len()));
        summary.push_str(&format!(
            "Total records: {}\n",
            self.records().map(|r| r.record_count).sum::<usize>()
        ));

        for (key, record) in &self.records {
            summary.push_str(&format!(
                "  {}: {} records, {} nulls across {} fields, {} missing dates, {} outliers\n",
                key,
                record.record_count,
                record.total_nulls(),
                record.null_counts.len(),
                record.missing_dates.len(),
                record.temperature_outliers
            ));
        }

        summary
    }
}
