use crate::config::PipelineConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "weather-etl")]
#[command(about = "Station weather ETL: quality audit, monthly aggregation, YoY deltas and SQL summaries")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Configuration file [default: weather-etl.toml if present]")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Hide progress output")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download raw station batches, then audit them
    Extract {
        #[command(flatten)]
        fetch: FetchArgs,

        #[command(flatten)]
        paths: PathArgs,
    },

    /// Audit the raw batches and write the quality report
    Audit {
        #[command(flatten)]
        paths: PathArgs,
    },

    /// Build the monthly station dataset from the raw batches
    Transform {
        #[command(flatten)]
        paths: PathArgs,
    },

    /// Load the monthly dataset into SQLite and run the summary queries
    Analyze {
        #[command(flatten)]
        paths: PathArgs,
    },

    /// Audit, transform and analyze in one go
    Run {
        #[arg(long, help = "Download raw batches before auditing")]
        fetch: bool,

        #[command(flatten)]
        fetch_args: FetchArgs,

        #[command(flatten)]
        paths: PathArgs,
    },
}

/// Locations that override the loaded configuration
#[derive(Args, Debug, Default)]
pub struct PathArgs {
    #[arg(long, help = "Directory holding station_{id}_{year}.csv batches")]
    pub raw_data_dir: Option<PathBuf>,

    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    #[arg(long, help = "Station dimension table (geonames CSV)")]
    pub dimension_file: Option<PathBuf>,

    #[arg(long, help = "CSV mapping station_id to climate_id")]
    pub station_mapping: Option<PathBuf>,

    #[arg(short, long, help = "Dataset file name; a .parquet extension writes Parquet")]
    pub output_file: Option<String>,

    #[arg(long, help = "SQLite database path")]
    pub db_path: Option<PathBuf>,

    #[arg(long, help = "Parquet compression (snappy, gzip, lz4, zstd, none)")]
    pub compression: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct FetchArgs {
    #[arg(long, value_delimiter = ',', help = "Station ids, comma separated")]
    pub stations: Vec<u32>,

    #[arg(long, value_delimiter = ',', help = "Years, comma separated")]
    pub years: Vec<i32>,

    #[arg(long)]
    pub max_workers: Option<usize>,

    #[arg(long)]
    pub max_retries: Option<u32>,
}

impl PathArgs {
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(dir) = &self.raw_data_dir {
            config.raw_data_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(file) = &self.dimension_file {
            config.dimension_file = file.clone();
        }
        if let Some(file) = &self.station_mapping {
            config.station_mapping_file = Some(file.clone());
        }
        if let Some(name) = &self.output_file {
            config.output_file = name.clone();
        }
        if let Some(path) = &self.db_path {
            config.db_path = path.clone();
        }
        if let Some(compression) = &self.compression {
            config.compression = compression.clone();
        }
    }
}

impl FetchArgs {
    pub fn apply(&self, config: &mut PipelineConfig) {
        if !self.stations.is_empty() {
            config.fetch.stations = self.stations.clone();
        }
        if !self.years.is_empty() {
            config.fetch.years = self.years.clone();
        }
        if let Some(workers) = self.max_workers {
            config.fetch.max_workers = workers;
        }
        if let Some(retries) = self.max_retries {
            config.fetch.max_retries = retries;
        }
    }
}
