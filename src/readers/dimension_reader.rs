use crate::error::{PipelineError, Result};
use crate::models::{StationDimension, StationMapping};
use crate::utils::constants::*;
use crate::utils::coordinates::parse_coordinate;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};
use validator::Validate;

const MAPPING_STATION_COLUMN: &str = "station_id";
const MAPPING_CLIMATE_COLUMN: &str = "climate_id";

/// Reads the static station dimension table and the optional station mapping
pub struct DimensionReader;

impl DimensionReader {
    pub fn new() -> Self {
        Self
    }

    /// Read station metadata from the geonames export
    pub fn read_dimensions(&self, path: &Path) -> Result<Vec<StationDimension>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        let index = |name: &str| -> Result<usize> {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                PipelineError::JoinIntegrity(format!(
                    "Dimension table {} is missing required column '{}'",
                    path.display(),
                    name
                ))
            })
        };

        let id_col = index(DIM_COL_ID)?;
        let name_col = index(DIM_COL_NAME)?;
        let feature_col = index(DIM_COL_FEATURE_ID)?;
        let lat_col = index(DIM_COL_LATITUDE)?;
        let lon_col = index(DIM_COL_LONGITUDE)?;
        let map_col = index(DIM_COL_MAP)?;

        let mut stations = Vec::new();
        for (line, result) in reader.records().enumerate() {
            let record = result?;
            let field = |col: usize| record.get(col).unwrap_or("");

            if record.iter().all(|v| v.is_empty()) {
                continue;
            }

            let climate_id = field(id_col);
            if climate_id.is_empty() {
                return Err(PipelineError::MissingData(format!(
                    "Dimension row {} has no {}",
                    line + 2,
                    DIM_COL_ID
                )));
            }

            let station = StationDimension::new(
                climate_id,
                field(name_col),
                field(feature_col),
                parse_coordinate(field(lat_col))?,
                parse_coordinate(field(lon_col))?,
                field(map_col),
            );
            station.validate()?;

            debug!(climate_id = %station.climate_id, name = %station.station_name, "loaded station");
            stations.push(station);
        }

        info!("Loaded {} station dimension rows from {}", stations.len(), path.display());
        Ok(stations)
    }

    /// Read a `station_id,climate_id` mapping file
    pub fn read_mapping(&self, path: &Path) -> Result<StationMapping> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        let position = |name: &str| -> Result<usize> {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                PipelineError::Config(format!(
                    "Station mapping {} is missing column '{}'",
                    path.display(),
                    name
                ))
            })
        };
        let station_col = position(MAPPING_STATION_COLUMN)?;
        let climate_col = position(MAPPING_CLIMATE_COLUMN)?;

        let mut pairs: HashMap<String, String> = HashMap::new();
        for result in reader.records() {
            let record = result?;
            let station = record.get(station_col).unwrap_or("");
            let climate = record.get(climate_col).unwrap_or("");
            if station.is_empty() || climate.is_empty() {
                continue;
            }

            if let Some(previous) = pairs.insert(station.to_string(), climate.to_string()) {
                if previous != climate {
                    return Err(PipelineError::JoinIntegrity(format!(
                        "Station {} is mapped to both {} and {}",
                        station, previous, climate
                    )));
                }
            }
        }

        info!("Loaded {} station mappings from {}", pairs.len(), path.display());
        Ok(StationMapping::Explicit(pairs))
    }

    /// The configured mapping, or the identity mapping when none is configured
    pub fn load_mapping(&self, path: Option<&Path>) -> Result<StationMapping> {
        match path {
            Some(p) => self.read_mapping(p),
            None => Ok(StationMapping::Identity),
        }
    }
}

impl Default for DimensionReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_read_dimensions() {
        let file = write_csv(
            " id , name , feature.id ,latitude,longitude,map\n\
             1108447,VANCOUVER INTL A,CLIM,49.195,-123.182,https://maps.example/1\n\
             6158355,TORONTO,CLIM,43:40:36,-79:24:00,https://maps.example/2\n",
        );

        let stations = DimensionReader::new().read_dimensions(file.path()).unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].climate_id, "1108447");
        assert_eq!(stations[0].station_name, "VANCOUVER INTL A");
        assert_eq!(stations[0].feature_id, "CLIM");
        assert!((stations[1].latitude - 43.676_666).abs() < 1e-4);
        assert!((stations[1].longitude + 79.4).abs() < 1e-9);
    }

    #[test]
    fn test_missing_column_is_join_integrity_failure() {
        let file = write_csv("id,name,latitude,longitude,map\n1,A,1.0,2.0,m\n");
        let result = DimensionReader::new().read_dimensions(file.path());
        assert!(matches!(result, Err(PipelineError::JoinIntegrity(_))));
    }

    #[test]
    fn test_out_of_range_coordinates_fail_validation() {
        let file = write_csv("id,name,feature.id,latitude,longitude,map\n1,A,CLIM,95.0,2.0,m\n");
        let result = DimensionReader::new().read_dimensions(file.path());
        assert!(matches!(result, Err(PipelineError::Validation(_))));
    }

    #[test]
    fn test_read_mapping() {
        let file = write_csv("station_id,climate_id\n26953,1108447\n31688,6158355\n");
        let mapping = DimensionReader::new().read_mapping(file.path()).unwrap();
        assert_eq!(mapping.climate_id("26953"), Some("1108447"));
        assert_eq!(mapping.climate_id("31688"), Some("6158355"));
        assert_eq!(mapping.climate_id("1"), None);
    }

    #[test]
    fn test_conflicting_mapping_is_rejected() {
        let file = write_csv("station_id,climate_id\n26953,1\n26953,2\n");
        let result = DimensionReader::new().read_mapping(file.path());
        assert!(matches!(result, Err(PipelineError::JoinIntegrity(_))));
    }

    #[test]
    fn test_no_mapping_file_means_identity() {
        let mapping = DimensionReader::new().load_mapping(None).unwrap();
        assert_eq!(mapping, StationMapping::Identity);
    }
}
