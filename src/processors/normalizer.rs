use crate::error::{PipelineError, Result};
use crate::models::{parse_temperature, parse_timestamp, ObservationRecord, RawBatch};
use crate::utils::constants::*;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Turns raw batches into observation records with canonical timestamp and
/// temperature fields.
pub struct Normalizer {
    timestamp_candidates: &'static [&'static str],
    temperature_candidates: &'static [&'static str],
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            timestamp_candidates: TIMESTAMP_CANDIDATES,
            temperature_candidates: TEMPERATURE_CANDIDATES,
        }
    }

    /// Normalize one batch. Rows without a timestamp carry no usable reading
    /// and are dropped.
    pub fn normalize_batch(&self, batch: &RawBatch) -> Result<Vec<ObservationRecord>> {
        let ts_col = batch.require_field(TIMESTAMP_FIELD, self.timestamp_candidates)?;
        let temp_col = batch.require_field(TEMPERATURE_FIELD, self.temperature_candidates)?;

        let mut records = Vec::with_capacity(batch.record_count());
        let mut skipped = 0usize;

        for (row_idx, row) in batch.rows.iter().enumerate() {
            let Some(raw_ts) = batch.value(row_idx, ts_col) else {
                skipped += 1;
                continue;
            };

            let timestamp = parse_timestamp(raw_ts)?;
            let temperature =
                parse_temperature(batch.value(row_idx, temp_col)).map_err(|e| match e {
                    PipelineError::InvalidFormat(msg) => PipelineError::InvalidFormat(format!(
                        "{} row {}: {}",
                        batch.key,
                        row_idx + 1,
                        msg
                    )),
                    other => other,
                })?;

            let mut record = ObservationRecord::new(
                batch.key.station_id.clone(),
                batch.key.year,
                timestamp,
                temperature,
            );
            record.extra = extra_fields(&batch.headers, row, &[ts_col, temp_col]);
            records.push(record);
        }

        if skipped > 0 {
            debug!("{}: dropped {} rows without a timestamp", batch.key, skipped);
        }

        Ok(records)
    }

    /// Normalize and concatenate every batch. A failing batch is logged and
    /// skipped unless the failure is fatal to the run.
    pub fn normalize_all(&self, batches: &[RawBatch]) -> Result<Vec<ObservationRecord>> {
        let mut combined = Vec::new();
        let mut succeeded = 0usize;

        for batch in batches {
            match self.normalize_batch(batch) {
                Ok(records) => {
                    debug!("{}: {} observations", batch.key, records.len());
                    succeeded += 1;
                    combined.extend(records);
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!("Skipping batch {}: {}", batch.key, e),
            }
        }

        if succeeded == 0 || combined.is_empty() {
            return Err(PipelineError::EmptyDataset(format!(
                "no observations after normalizing {} batches ({} usable)",
                batches.len(),
                succeeded
            )));
        }

        info!(
            "Normalized {} observations from {} of {} batches",
            combined.len(),
            succeeded,
            batches.len()
        );
        Ok(combined)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn extra_fields(
    headers: &[String],
    row: &[Option<String>],
    resolved: &[usize],
) -> BTreeMap<String, String> {
    headers
        .iter()
        .zip(row)
        .enumerate()
        .filter(|(idx, _)| !resolved.contains(idx))
        .filter_map(|(_, (name, value))| value.as_ref().map(|v| (name.clone(), v.clone())))
        .collect()
}
