pub mod csv_writer;
pub mod parquet_writer;
pub mod report_writer;

pub use csv_writer::CsvWriter;
pub use parquet_writer::{ParquetFileInfo, ParquetWriter};
pub use report_writer::{
    load_analysis_payload, load_quality_report, save_analysis_results, save_quality_report,
};

use crate::error::Result;
use crate::models::FinalRecord;
use std::path::Path;
use tracing::info;

/// On-disk format of the final dataset, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Parquet,
}

impl DatasetFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("parquet") => DatasetFormat::Parquet,
            _ => DatasetFormat::Csv,
        }
    }
}

/// Write the final dataset, creating the output directory if needed
pub fn write_dataset(records: &[FinalRecord], path: &Path, compression: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    match DatasetFormat::from_path(path) {
        DatasetFormat::Csv => CsvWriter::new().write_records(records, path)?,
        DatasetFormat::Parquet => ParquetWriter::new()
            .with_compression(compression)?
            .write_records(records, path)?,
    }

    info!("Wrote {} final rows to {}", records.len(), path.display());
    Ok(())
}

pub fn read_dataset(path: &Path) -> Result<Vec<FinalRecord>> {
    match DatasetFormat::from_path(path) {
        DatasetFormat::Csv => CsvWriter::new().read_records(path),
        DatasetFormat::Parquet => ParquetWriter::new().read_records(path),
    }
}
