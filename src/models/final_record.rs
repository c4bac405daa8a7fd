use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{StationDimension, YoyAugmentedRecord};

/// One row of the final dataset. Field order is the output column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FinalRecord {
    pub station_name: String,
    pub climate_id: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    pub date_month: String,
    pub feature_id: String,
    pub map: String,
    pub temperature_celsius_avg: f64,
    pub temperature_celsius_min: f64,
    pub temperature_celsius_max: f64,
    pub temperature_celsius_yoy_avg: Option<f64>,
}

impl FinalRecord {
    pub fn from_parts(record: &YoyAugmentedRecord, station: &StationDimension) -> Self {
        let agg = &record.aggregate;
        Self {
            station_name: station.station_name.clone(),
            climate_id: station.climate_id.clone(),
            latitude: station.latitude,
            longitude: station.longitude,
            date_month: agg.date_month.clone(),
            feature_id: station.feature_id.clone(),
            map: station.map.clone(),
            temperature_celsius_avg: agg.avg_temp,
            temperature_celsius_min: agg.min_temp,
            temperature_celsius_max: agg.max_temp,
            temperature_celsius_yoy_avg: record.yoy_delta,
        }
    }

    /// Year part of the month label
    pub fn year(&self) -> &str {
        self.date_month.get(0..4).unwrap_or("")
    }

    /// Month part of the month label
    pub fn month(&self) -> &str {
        self.date_month.get(5..7).unwrap_or("")
    }
}
