use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// Static station metadata from the dimension table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StationDimension {
    #[validate(length(min = 1))]
    pub climate_id: String,

    #[validate(length(min = 1))]
    pub station_name: String,

    pub feature_id: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    pub map: String,
}

impl StationDimension {
    pub fn new(
        climate_id: impl Into<String>,
        station_name: impl Into<String>,
        feature_id: impl Into<String>,
        latitude: f64,
        longitude: f64,
        map: impl Into<String>,
    ) -> Self {
        Self {
            climate_id: climate_id.into(),
            station_name: station_name.into(),
            feature_id: feature_id.into(),
            latitude,
            longitude,
            map: map.into(),
        }
    }
}

/// How raw station ids relate to dimension climate ids
#[derive(Debug, Clone, Default, PartialEq)]
pub enum StationMapping {
    /// The raw station id is the climate id
    #[default]
    Identity,
    Explicit(HashMap<String, String>),
}

impl StationMapping {
    pub fn explicit(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        StationMapping::Explicit(pairs.into_iter().collect())
    }

    pub fn climate_id<'a>(&'a self, station_id: &'a str) -> Option<&'a str> {
        match self {
            StationMapping::Identity => Some(station_id),
            StationMapping::Explicit(map) => map.get(station_id).map(String::as_str),
        }
    }
}
