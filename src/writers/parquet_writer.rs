use crate::error::{PipelineError, Result};
use crate::models::FinalRecord;
use crate::utils::constants::*;
use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(PipelineError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Write the final dataset, replacing any existing file. An empty
    /// dataset still produces a file carrying the schema.
    pub fn write_records(&self, records: &[FinalRecord], path: &Path) -> Result<()> {
        let schema = Self::create_schema();

        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
        for chunk in records.chunks(self.row_group_size.max(1)) {
            let batch = Self::records_to_batch(chunk, schema.clone())?;
            writer.write(&batch)?;
        }
        writer.close()?;

        Ok(())
    }

    /// Arrow schema of the final dataset; only the YoY delta is nullable
    fn create_schema() -> Arc<Schema> {
        let fields: Vec<Field> = FINAL_COLUMNS
            .iter()
            .map(|name| match *name {
                "latitude"
                | "longitude"
                | "temperature_celsius_avg"
                | "temperature_celsius_min"
                | "temperature_celsius_max" => Field::new(*name, DataType::Float64, false),
                "temperature_celsius_yoy_avg" => Field::new(*name, DataType::Float64, true),
                _ => Field::new(*name, DataType::Utf8, false),
            })
            .collect();

        Arc::new(Schema::new(fields))
    }

    fn records_to_batch(records: &[FinalRecord], schema: Arc<Schema>) -> Result<RecordBatch> {
        let yoy: ArrayRef = Arc::new(Float64Array::from(
            records
                .iter()
                .map(|r| r.temperature_celsius_yoy_avg)
                .collect::<Vec<Option<f64>>>(),
        ));

        let batch = RecordBatch::try_new(
            schema,
            vec![
                string_array(records, |r| r.station_name.as_str()),
                string_array(records, |r| r.climate_id.as_str()),
                float_array(records, |r| r.latitude),
                float_array(records, |r| r.longitude),
                string_array(records, |r| r.date_month.as_str()),
                string_array(records, |r| r.feature_id.as_str()),
                string_array(records, |r| r.map.as_str()),
                float_array(records, |r| r.temperature_celsius_avg),
                float_array(records, |r| r.temperature_celsius_min),
                float_array(records, |r| r.temperature_celsius_max),
                yoy,
            ],
        )?;

        Ok(batch)
    }

    /// Read a final dataset back, looking columns up by name
    pub fn read_records(&self, path: &Path) -> Result<Vec<FinalRecord>> {
        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut records = Vec::new();
        for batch_result in reader {
            let batch = batch_result?;

            let station_names = column::<StringArray>(&batch, "station_name")?;
            let climate_ids = column::<StringArray>(&batch, "climate_id")?;
            let latitudes = column::<Float64Array>(&batch, "latitude")?;
            let longitudes = column::<Float64Array>(&batch, "longitude")?;
            let months = column::<StringArray>(&batch, "date_month")?;
            let feature_ids = column::<StringArray>(&batch, "feature_id")?;
            let maps = column::<StringArray>(&batch, "map")?;
            let avgs = column::<Float64Array>(&batch, "temperature_celsius_avg")?;
            let mins = column::<Float64Array>(&batch, "temperature_celsius_min")?;
            let maxs = column::<Float64Array>(&batch, "temperature_celsius_max")?;
            let yoys = column::<Float64Array>(&batch, "temperature_celsius_yoy_avg")?;

            for i in 0..batch.num_rows() {
                records.push(FinalRecord {
                    station_name: station_names.value(i).to_string(),
                    climate_id: climate_ids.value(i).to_string(),
                    latitude: latitudes.value(i),
                    longitude: longitudes.value(i),
                    date_month: months.value(i).to_string(),
                    feature_id: feature_ids.value(i).to_string(),
                    map: maps.value(i).to_string(),
                    temperature_celsius_avg: avgs.value(i),
                    temperature_celsius_min: mins.value(i),
                    temperature_celsius_max: maxs.value(i),
                    temperature_celsius_yoy_avg: (!yoys.is_null(i)).then(|| yoys.value(i)),
                });
            }
        }

        Ok(records)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();

        Ok(ParquetFileInfo {
            total_rows: metadata.file_metadata().num_rows(),
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size: std::fs::metadata(path)?.len(),
            compression: self.compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn string_array<'r>(records: &'r [FinalRecord], f: impl Fn(&'r FinalRecord) -> &'r str) -> ArrayRef {
    Arc::new(StringArray::from_iter_values(records.iter().map(f)))
}

fn float_array(records: &[FinalRecord], f: impl Fn(&FinalRecord) -> f64) -> ArrayRef {
    Arc::new(Float64Array::from_iter_values(records.iter().map(f)))
}

fn column<'b, T: 'static>(batch: &'b RecordBatch, name: &str) -> Result<&'b T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| {
            PipelineError::InvalidFormat(format!("Missing or mistyped column '{}'", name))
        })
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {:?}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1_048_576.0,
            self.compression,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    fn record(month: &str, yoy: Option<f64>) -> FinalRecord {
        FinalRecord {
            station_name: "VANCOUVER INTL A".to_string(),
            climate_id: "1108447".to_string(),
            latitude: 49.195,
            longitude: -123.182,
            date_month: month.to_string(),
            feature_id: "CLIM".to_string(),
            map: "https://maps.example/1108447".to_string(),
            temperature_celsius_avg: 5.0,
            temperature_celsius_min: 4.8,
            temperature_celsius_max: 5.2,
            temperature_celsius_yoy_avg: yoy,
        }
    }

    #[test]
    fn test_write_and_read_back_with_null_delta() -> Result<()> {
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new()?;
        let records = vec![record("2022-01", None), record("2023-01", Some(1.0))];

        writer.write_records(&records, temp_file.path())?;
        let read = writer.read_records(temp_file.path())?;
        assert_eq!(read, records);

        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, 2);
        Ok(())
    }

    #[test]
    fn test_row_group_size_splits_output() -> Result<()> {
        let writer = ParquetWriter::new().with_row_group_size(2);
        let temp_file = NamedTempFile::new()?;
        let records = vec![
            record("2023-01", None),
            record("2023-02", None),
            record("2023-03", Some(0.5)),
        ];

        writer.write_records(&records, temp_file.path())?;
        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.row_group_sizes, vec![2, 1]);
        assert_eq!(writer.read_records(temp_file.path())?, records);
        Ok(())
    }

    #[test]
    fn test_empty_dataset_keeps_schema() -> Result<()> {
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new()?;

        writer.write_records(&[], temp_file.path())?;
        assert!(writer.read_records(temp_file.path())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_different_compressions() -> Result<()> {
        for compression in ["snappy", "gzip", "lz4", "zstd", "none"] {
            let writer = ParquetWriter::new().with_compression(compression)?;
            let temp_file = NamedTempFile::new()?;

            let result = writer.write_records(&[record("2023-07", Some(-0.5))], temp_file.path());
            assert!(result.is_ok(), "Failed with compression: {}", compression);
        }

        assert!(ParquetWriter::new().with_compression("brotli-ish").is_err());
        Ok(())
    }
}
