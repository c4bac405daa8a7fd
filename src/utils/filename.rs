use crate::error::{PipelineError, Result};
use crate::models::BatchKey;
use crate::utils::constants::{BATCH_FILE_EXTENSION, BATCH_FILE_PREFIX};
use std::path::Path;

/// Build the storage file name for a raw batch: station_{station_id}_{year}.csv
pub fn batch_file_name(station_id: &str, year: i32) -> String {
    format!(
        "{}{}_{}.{}",
        BATCH_FILE_PREFIX, station_id, year, BATCH_FILE_EXTENSION
    )
}

/// Whether a path looks like a raw batch file
pub fn is_batch_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|f| f.to_str()) else {
        return false;
    };
    name.starts_with(BATCH_FILE_PREFIX)
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(BATCH_FILE_EXTENSION))
}

/// Recover station id and year from a raw batch path (e.g. station_26953_2023.csv).
/// Accepts exactly the paths `is_batch_file` accepts.
pub fn parse_batch_key(path: &Path) -> Result<BatchKey> {
    let filename = path
        .file_name()
        .and_then(|f| f.to_str())
        .ok_or_else(|| PipelineError::InvalidFormat("Invalid file path".to_string()))?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|_| is_batch_file(path))
        .and_then(|s| s.strip_prefix(BATCH_FILE_PREFIX))
        .ok_or_else(|| {
            PipelineError::InvalidFormat(format!(
                "Filename does not match expected pattern: {}",
                filename
            ))
        })?;

    // Station ids may themselves contain underscores; the year is always last.
    let (station_id, year_str) = stem.rsplit_once('_').ok_or_else(|| {
        PipelineError::InvalidFormat(format!("Missing year in batch filename: {}", filename))
    })?;

    if station_id.is_empty() {
        return Err(PipelineError::InvalidFormat(format!(
            "Missing station id in batch filename: {}",
            filename
        )));
    }

    let year = year_str.parse::<i32>().map_err(|_| {
        PipelineError::InvalidFormat(format!(
            "Could not extract year from filename: {}",
            filename
        ))
    })?;

    Ok(BatchKey::new(station_id, year))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_batch_file_name() {
        assert_eq!(batch_file_name("26953", 2023), "station_26953_2023.csv");
    }

    #[test]
    fn test_parse_batch_key() {
        let key = parse_batch_key(&PathBuf::from("raw_data/station_26953_2023.csv")).unwrap();
        assert_eq!(key.station_id, "26953");
        assert_eq!(key.year, 2023);

        let key = parse_batch_key(&PathBuf::from("station_AB_12_2024.csv")).unwrap();
        assert_eq!(key.station_id, "AB_12");
        assert_eq!(key.year, 2024);
    }

    #[test]
    fn test_parse_batch_key_rejects_bad_names() {
        assert!(parse_batch_key(&PathBuf::from("stations.csv")).is_err());
        assert!(parse_batch_key(&PathBuf::from("station_26953.csv")).is_err());
        assert!(parse_batch_key(&PathBuf::from("station__2023.csv")).is_err());
        assert!(parse_batch_key(&PathBuf::from("station_26953_20x3.csv")).is_err());
    }

    #[test]
    fn test_is_batch_file() {
        assert!(is_batch_file(&PathBuf::from("raw_data/station_1_2023.csv")));
        assert!(!is_batch_file(&PathBuf::from("raw_data/data_quality_report.json")));
        assert!(!is_batch_file(&PathBuf::from("raw_data/geonames.csv")));
    }

    #[test]
    fn test_extension_case_agrees_with_discovery() {
        let path = PathBuf::from("raw_data/station_1_2023.CSV");
        assert!(is_batch_file(&path));
        assert_eq!(parse_batch_key(&path).unwrap(), BatchKey::new("1", 2023));

        let path = PathBuf::from("raw_data/station_1_2023.json");
        assert!(!is_batch_file(&path));
        assert!(parse_batch_key(&path).is_err());
    }
}
