use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Fetch failed for station {station_id}, year {year} after {attempts} attempts: {message}")]
    Fetch {
        station_id: String,
        year: i32,
        attempts: u32,
        message: String,
    },

    #[error("Required field '{field}' not found under any accepted name: {}", candidates.join(", "))]
    Schema {
        field: String,
        candidates: Vec<String>,
    },

    #[error("No usable data: {0}")]
    EmptyDataset(String),

    #[error("Join integrity violation: {0}")]
    JoinIntegrity(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid coordinate format: {0}")]
    InvalidCoordinate(String),

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl PipelineError {
    pub fn schema(field: &str, candidates: &[&str]) -> Self {
        PipelineError::Schema {
            field: field.to_string(),
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Errors that abort the whole run rather than a single batch.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PipelineError::Schema { .. }
                | PipelineError::EmptyDataset(_)
                | PipelineError::JoinIntegrity(_)
                | PipelineError::Config(_)
        )
    }
}

impl From<config::ConfigError> for PipelineError {
    fn from(err: config::ConfigError) -> Self {
        PipelineError::Config(err.to_string())
    }
}
