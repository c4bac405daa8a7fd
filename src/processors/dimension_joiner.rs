use crate::error::{PipelineError, Result};
use crate::models::{FinalRecord, StationDimension, StationMapping, YoyAugmentedRecord};
use std::collections::HashMap;
use tracing::info;
use validator::Validate;

/// Keyed join of monthly records against the station dimension table
pub struct DimensionJoiner<'a> {
    by_climate_id: HashMap<&'a str, Vec<&'a StationDimension>>,
    mapping: &'a StationMapping,
}

impl<'a> DimensionJoiner<'a> {
    pub fn new(dimensions: &'a [StationDimension], mapping: &'a StationMapping) -> Self {
        let mut by_climate_id: HashMap<&str, Vec<&StationDimension>> = HashMap::new();
        for dim in dimensions {
            by_climate_id
                .entry(dim.climate_id.as_str())
                .or_default()
                .push(dim);
        }

        Self {
            by_climate_id,
            mapping,
        }
    }

    /// The single dimension row for a raw station id
    pub fn resolve(&self, station_id: &str) -> Result<&'a StationDimension> {
        let climate_id = self.mapping.climate_id(station_id).ok_or_else(|| {
            PipelineError::JoinIntegrity(format!(
                "station {} has no climate id in the station mapping",
                station_id
            ))
        })?;

        match self.by_climate_id.get(climate_id).map(Vec::as_slice) {
            Some([single]) => Ok(*single),
            Some(matches) if matches.len() > 1 => Err(PipelineError::JoinIntegrity(format!(
                "station {} (climate id {}) matches {} dimension rows",
                station_id,
                climate_id,
                matches.len()
            ))),
            _ => Err(PipelineError::JoinIntegrity(format!(
                "station {} (climate id {}) has no dimension row",
                station_id, climate_id
            ))),
        }
    }

    /// Exactly one output row per input row, in input order
    pub fn join(&self, records: &[YoyAugmentedRecord]) -> Result<Vec<FinalRecord>> {
        let mut resolved: HashMap<&str, &StationDimension> = HashMap::new();
        let mut output = Vec::with_capacity(records.len());

        for record in records {
            let station_id = record.aggregate.station_id.as_str();
            let station = match resolved.get(station_id).copied() {
                Some(s) => s,
                None => {
                    let s = self.resolve(station_id)?;
                    resolved.insert(station_id, s);
                    s
                }
            };

            let row = FinalRecord::from_parts(record, station);
            row.validate()?;
            output.push(row);
        }

        info!(
            "Joined {} monthly rows against {} stations",
            output.len(),
            resolved.len()
        );
        Ok(output)
    }
}
