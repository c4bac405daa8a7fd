use crate::error::Result;
use crate::models::FinalRecord;
use crate::utils::constants::FINAL_COLUMNS;
use std::path::Path;

/// Final dataset as delimited text. An undefined YoY delta is an empty cell.
pub struct CsvWriter;

impl CsvWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write the dataset, replacing any existing file. The header row is
    /// always present, even for an empty dataset.
    pub fn write_records(&self, records: &[FinalRecord], path: &Path) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)?;

        writer.write_record(FINAL_COLUMNS)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        Ok(())
    }

    pub fn read_records(&self, path: &Path) -> Result<Vec<FinalRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_path(path)?;

        let mut records = Vec::new();
        for result in reader.deserialize() {
            records.push(result?);
        }
        Ok(records)
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    fn record(yoy: Option<f64>) -> FinalRecord {
        FinalRecord {
            station_name: "TORONTO".to_string(),
            climate_id: "6158355".to_string(),
            latitude: 43.67,
            longitude: -79.4,
            date_month: "2023-01".to_string(),
            feature_id: "CLIM".to_string(),
            map: "https://maps.example/6158355".to_string(),
            temperature_celsius_avg: -3.5,
            temperature_celsius_min: -12.0,
            temperature_celsius_max: 4.0,
            temperature_celsius_yoy_avg: yoy,
        }
    }

    #[test]
    fn test_header_and_empty_delta_cell() -> Result<()> {
        let file = NamedTempFile::new()?;
        CsvWriter::new().write_records(&[record(None), record(Some(0.25))], file.path())?;

        let text = std::fs::read_to_string(file.path())?;
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(FINAL_COLUMNS.join(",").as_str()));
        assert!(lines.next().unwrap_or_default().ends_with(",4.0,"));
        assert!(lines.next().unwrap_or_default().ends_with(",0.25"));
        Ok(())
    }

    #[test]
    fn test_read_back() -> Result<()> {
        let file = NamedTempFile::new()?;
        let records = vec![record(None), record(Some(-1.5))];
        CsvWriter::new().write_records(&records, file.path())?;

        assert_eq!(CsvWriter::new().read_records(file.path())?, records);
        Ok(())
    }

    #[test]
    fn test_empty_dataset_still_has_header() -> Result<()> {
        let file = NamedTempFile::new()?;
        CsvWriter::new().write_records(&[], file.path())?;
        let text = std::fs::read_to_string(file.path())?;
        assert_eq!(text.trim_end(), FINAL_COLUMNS.join(","));
        Ok(())
    }
}
