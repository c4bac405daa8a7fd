/// Accepted names for the observation timestamp, in resolution order
pub const TIMESTAMP_CANDIDATES: &[&str] = &["Date/Time (LST)", "Date/Time"];

/// Accepted names for the observed temperature, in resolution order
pub const TEMPERATURE_CANDIDATES: &[&str] = &["Temp (°C)", "Mean Temp (°C)"];

/// Logical field names used in schema errors
pub const TIMESTAMP_FIELD: &str = "timestamp";
pub const TEMPERATURE_FIELD: &str = "temperature";

/// Cell values read as null, matching the usual CSV NA conventions
pub const NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Directory and file names
pub const RAW_DATA_DIR: &str = "raw_data";
pub const OUTPUT_DIR: &str = "output";
pub const DIMENSION_FILE: &str = "geonames.csv";
pub const DEFAULT_OUTPUT_FILE: &str = "weather_station_monthly.csv";
pub const QUALITY_REPORT_FILE: &str = "data_quality_report.json";
pub const ANALYSIS_RESULTS_FILE: &str = "analysis_results.json";
pub const ANALYSIS_FALLBACK_FILE: &str = "analysis_results_fallback.json";
pub const DEFAULT_DB_PATH: &str = "weather_data.db";
pub const DEFAULT_CONFIG_FILE: &str = "weather-etl.toml";
pub const CONFIG_ENV_PREFIX: &str = "WEATHER_ETL";

/// Raw batch storage keys look like `station_26953_2023.csv`
pub const BATCH_FILE_PREFIX: &str = "station_";
pub const BATCH_FILE_EXTENSION: &str = "csv";

/// Dimension table columns as they appear in the geonames export
pub const DIM_COL_ID: &str = "id";
pub const DIM_COL_NAME: &str = "name";
pub const DIM_COL_FEATURE_ID: &str = "feature.id";
pub const DIM_COL_LATITUDE: &str = "latitude";
pub const DIM_COL_LONGITUDE: &str = "longitude";
pub const DIM_COL_MAP: &str = "map";
pub const DIMENSION_COLUMNS: &[&str] = &[
    DIM_COL_ID,
    DIM_COL_NAME,
    DIM_COL_FEATURE_ID,
    DIM_COL_LATITUDE,
    DIM_COL_LONGITUDE,
    DIM_COL_MAP,
];

/// Final dataset columns, in output order
pub const FINAL_COLUMNS: &[&str] = &[
    "station_name",
    "climate_id",
    "latitude",
    "longitude",
    "date_month",
    "feature_id",
    "map",
    "temperature_celsius_avg",
    "temperature_celsius_min",
    "temperature_celsius_max",
    "temperature_celsius_yoy_avg",
];

/// Relational store table holding the final dataset
pub const WEATHER_TABLE: &str = "weather_data";

/// Analytical query names, in execution order
pub const QUERY_AVG_TEMP_BY_STATION_YEAR: &str = "avg_temp_by_station_year";
pub const QUERY_MONTHLY_TEMP_VARIATIONS: &str = "monthly_temp_variations";
pub const QUERY_YOY_TEMP_CHANGE: &str = "yoy_temp_change";
pub const QUERY_EXTREME_HIGH_TEMPS: &str = "extreme_high_temps";
pub const QUERY_EXTREME_LOW_TEMPS: &str = "extreme_low_temps";
pub const EXTREME_ROW_LIMIT: usize = 10;

/// Quality audit defaults
pub const DEFAULT_OUTLIER_SIGMA: f64 = 3.0;

/// Extraction defaults
pub const CLIMATE_BULK_DATA_URL: &str = "https://climate.weather.gc.ca/climate_data/bulk_data_e.html";
pub const DEFAULT_STATIONS: &[u32] = &[26953, 31688];
pub const DEFAULT_YEARS: &[i32] = &[2023, 2024];
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 2;
pub const DEFAULT_REQUEST_PACING_MS: u64 = 1000;

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
