use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{PipelineError, Result};
use crate::utils::constants::NULL_MARKERS;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Identity of a raw batch, recovered from its storage key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BatchKey {
    pub station_id: String,
    pub year: i32,
}

impl BatchKey {
    pub fn new(station_id: impl Into<String>, year: i32) -> Self {
        Self {
            station_id: station_id.into(),
            year,
        }
    }

    /// Key used in the quality report, e.g. `station_26953_2023`
    pub fn report_key(&self) -> String {
        format!("station_{}_{}", self.station_id, self.year)
    }
}

impl fmt::Display for BatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "station {} / {}", self.station_id, self.year)
    }
}

/// One raw tabular batch exactly as stored: header names plus cells, with
/// empty cells already mapped to `None`.
#[derive(Debug, Clone)]
pub struct RawBatch {
    pub key: BatchKey,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawBatch {
    pub fn new(key: BatchKey, headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { key, headers, rows }
    }

    pub fn record_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// First candidate (in candidate order) present among the headers
    pub fn resolve_field(&self, candidates: &[&str]) -> Option<usize> {
        candidates.iter().find_map(|c| self.column_index(c))
    }

    /// Like `resolve_field`, but absence of every candidate is a schema failure
    pub fn require_field(&self, logical: &str, candidates: &[&str]) -> Result<usize> {
        self.resolve_field(candidates)
            .ok_or_else(|| PipelineError::schema(logical, candidates))
    }

    pub fn value(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(|v| v.as_deref())
    }

    pub fn column_values(&self, column: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows
            .iter()
            .map(move |r| r.get(column).and_then(|v| v.as_deref()))
    }
}

/// One normalized reading tagged with its originating batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub station_id: String,
    pub data_year: i32,
    pub timestamp: NaiveDateTime,
    pub temperature: Option<f64>,
    /// Every other non-null column of the source row
    pub extra: BTreeMap<String, String>,
}

impl ObservationRecord {
    pub fn new(
        station_id: impl Into<String>,
        data_year: i32,
        timestamp: NaiveDateTime,
        temperature: Option<f64>,
    ) -> Self {
        Self {
            station_id: station_id.into(),
            data_year,
            timestamp,
            temperature,
            extra: BTreeMap::new(),
        }
    }

    pub fn year(&self) -> i32 {
        self.timestamp.year()
    }

    pub fn month(&self) -> u32 {
        self.timestamp.month()
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Canonical "YYYY-MM" label
    pub fn month_label(&self) -> String {
        self.timestamp.format("%Y-%m").to_string()
    }
}

/// Parse an observation timestamp; date-only values are taken at midnight
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let trimmed = value.trim();

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| PipelineError::InvalidFormat(format!("Invalid timestamp: '{}'", value)))
}

/// Whether a trimmed cell holds one of the null markers
pub fn is_null_marker(cell: &str) -> bool {
    NULL_MARKERS.contains(&cell)
}

/// Parse an optional temperature cell; null markers and NaN are absent
pub fn parse_temperature(value: Option<&str>) -> Result<Option<f64>> {
    match value.map(str::trim) {
        None => Ok(None),
        Some(v) if is_null_marker(v) => Ok(None),
        Some(v) => match v.parse::<f64>() {
            Ok(t) if t.is_nan() => Ok(None),
            Ok(t) if t.is_finite() => Ok(Some(t)),
            _ => Err(PipelineError::InvalidFormat(format!(
                "Invalid temperature: '{}'",
                v
            ))),
        },
    }
}
