//! Run configuration, layered from defaults, an optional TOML file and
//! `WEATHER_ETL__*` environment variables. The loaded value is handed to each
//! stage explicitly.

use crate::error::{PipelineError, Result};
use crate::utils::constants::*;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub raw_data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub dimension_file: PathBuf,
    /// CSV of `station_id,climate_id`; when absent the station id is the climate id
    pub station_mapping_file: Option<PathBuf>,
    pub output_file: String,
    pub db_path: PathBuf,
    pub compression: String,
    pub fetch: FetchConfig,
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    pub base_url: String,
    pub stations: Vec<u32>,
    pub years: Vec<i32>,
    pub month: u32,
    pub day: u32,
    pub max_retries: u32,
    pub retry_delay_secs: u64,
    pub request_pacing_ms: u64,
    pub max_workers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuditConfig {
    pub outlier_sigma: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_data_dir: PathBuf::from(RAW_DATA_DIR),
            output_dir: PathBuf::from(OUTPUT_DIR),
            dimension_file: PathBuf::from(DIMENSION_FILE),
            station_mapping_file: None,
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            compression: COMPRESSION_SNAPPY.to_string(),
            fetch: FetchConfig::default(),
            audit: AuditConfig::default(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: CLIMATE_BULK_DATA_URL.to_string(),
            stations: DEFAULT_STATIONS.to_vec(),
            years: DEFAULT_YEARS.to_vec(),
            month: 1,
            day: 1,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_secs: DEFAULT_RETRY_DELAY_SECS,
            request_pacing_ms: DEFAULT_REQUEST_PACING_MS,
            max_workers: num_cpus::get(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            outlier_sigma: DEFAULT_OUTLIER_SIGMA,
        }
    }
}

impl FetchConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn request_pacing(&self) -> Duration {
        Duration::from_millis(self.request_pacing_ms)
    }
}

impl PipelineConfig {
    /// Load configuration. An explicitly named file must exist; the default
    /// `weather-etl.toml` is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file_source = match path {
            Some(p) => File::from(p).format(FileFormat::Toml).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE)
                .format(FileFormat::Toml)
                .required(false),
        };

        let settings = Config::builder()
            .add_source(Config::try_from(&PipelineConfig::default())?)
            .add_source(file_source)
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("fetch.stations")
                    .with_list_parse_key("fetch.years"),
            )
            .build()?;

        let config: PipelineConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.audit.outlier_sigma.is_finite() && self.audit.outlier_sigma > 0.0) {
            return Err(PipelineError::Config(format!(
                "audit.outlier_sigma must be a positive number, got {}",
                self.audit.outlier_sigma
            )));
        }
        if self.fetch.max_retries == 0 {
            return Err(PipelineError::Config(
                "fetch.max_retries must be at least 1".to_string(),
            ));
        }
        if self.fetch.max_workers == 0 {
            return Err(PipelineError::Config(
                "fetch.max_workers must be at least 1".to_string(),
            ));
        }
        if !(1..=12).contains(&self.fetch.month) || !(1..=31).contains(&self.fetch.day) {
            return Err(PipelineError::Config(format!(
                "fetch anchor month/day out of range: {}/{}",
                self.fetch.month, self.fetch.day
            )));
        }
        if self.output_file.trim().is_empty() {
            return Err(PipelineError::Config("output_file must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file)
    }

    pub fn quality_report_path(&self) -> PathBuf {
        self.raw_data_dir.join(QUALITY_REPORT_FILE)
    }

    pub fn analysis_results_path(&self) -> PathBuf {
        self.output_dir.join(ANALYSIS_RESULTS_FILE)
    }
}
