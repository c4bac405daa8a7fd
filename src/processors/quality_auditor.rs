use crate::config::AuditConfig;
use crate::error::{PipelineError, Result};
use crate::models::{is_null_marker, parse_temperature, parse_timestamp, OutlierBounds, QualityRecord, QualityReport, RawBatch};
use crate::utils::constants::*;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// Per-batch quality audit: null counts, calendar gaps, temperature outliers
pub struct QualityAuditor {
    outlier_sigma: f64,
}

impl QualityAuditor {
    pub fn new() -> Self {
        Self {
            outlier_sigma: DEFAULT_OUTLIER_SIGMA,
        }
    }

    pub fn with_sigma(outlier_sigma: f64) -> Self {
        Self { outlier_sigma }
    }

    pub fn from_config(config: &AuditConfig) -> Self {
        Self::with_sigma(config.outlier_sigma)
    }

    /// Audit a single batch. The batch is not modified.
    pub fn audit_batch(&self, batch: &RawBatch) -> Result<QualityRecord> {
        let mut record = QualityRecord::empty(&batch.key, batch.record_count());

        record.null_counts = null_counts(batch);

        if let Some(ts_col) = batch.resolve_field(TIMESTAMP_CANDIDATES) {
            record.missing_dates = missing_dates(batch, ts_col)?;
        }

        if let Some(temp_col) = batch.resolve_field(TEMPERATURE_CANDIDATES) {
            let temps: Vec<f64> = batch
                .column_values(temp_col)
                .filter_map(|v| parse_temperature(v).ok().flatten())
                .collect();

            if let Some(bounds) = self.outlier_bounds(&temps) {
                record.temperature_outliers =
                    temps.iter().filter(|t| bounds.is_outlier(**t)).count();
                record.outlier_bounds = Some(bounds);
            }
        }

        Ok(record)
    }

    /// Audit every batch into one report. A batch that cannot be audited is
    /// logged and left out of the report.
    pub fn audit_all(&self, batches: &[RawBatch]) -> QualityReport {
        let mut report = QualityReport::new();

        for batch in batches {
            match self.audit_batch(batch) {
                Ok(record) => {
                    log_findings(&record);
                    report.insert(record);
                }
                Err(e) => warn!("Could not audit {}: {}", batch.key, e),
            }
        }

        info!("Audited {} of {} batches", report.len(), batches.len());
        report
    }

    /// Mean ± sigma·stddev over the non-null readings, using the sample
    /// standard deviation. Needs at least two readings.
    pub fn outlier_bounds(&self, temps: &[f64]) -> Option<OutlierBounds> {
        if temps.len() < 2 {
            return None;
        }

        let n = temps.len() as f64;
        let mean = temps.iter().sum::<f64>() / n;
        let variance = temps.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / (n - 1.0);

        Some(OutlierBounds::from_stats(mean, variance.sqrt(), self.outlier_sigma))
    }
}

impl Default for QualityAuditor {
    fn default() -> Self {
        Self::new()
    }
}

/// Null count per header, keeping only fields with at least one null
fn null_counts(batch: &RawBatch) -> BTreeMap<String, usize> {
    batch
        .headers
        .iter()
        .enumerate()
        .filter_map(|(idx, name)| {
            let nulls = batch
                .column_values(idx)
                .filter(|value| value.map_or(true, is_null_marker))
                .count();
            (nulls > 0).then(|| (name.clone(), nulls))
        })
        .collect()
}

/// Calendar days between the earliest and latest observed date (inclusive)
/// that have no observation at all
fn missing_dates(batch: &RawBatch, ts_col: usize) -> Result<Vec<NaiveDate>> {
    let mut observed = BTreeSet::new();
    for value in batch.column_values(ts_col).flatten() {
        let date = parse_timestamp(value)
            .map_err(|e| PipelineError::InvalidFormat(format!("{}: {}", batch.key, e)))?
            .date();
        observed.insert(date);
    }

    let (Some(&first), Some(&last)) = (observed.first(), observed.last()) else {
        return Ok(Vec::new());
    };

    Ok(first
        .iter_days()
        .take_while(|d| *d <= last)
        .filter(|d| !observed.contains(d))
        .collect())
}

fn log_findings(record: &QualityRecord) {
    let key = record.key();

    if !record.null_counts.is_empty() {
        warn!(
            "Found {} null values across {} fields in {}",
            record.total_nulls(),
            record.null_counts.len(),
            key
        );
    }
    if !record.missing_dates.is_empty() {
        warn!("Found {} missing dates in {}", record.missing_dates.len(), key);
    }
    if record.temperature_outliers > 0 {
        warn!(
            "Found {} temperature outliers in {}",
            record.temperature_outliers, key
        );
    }
}
