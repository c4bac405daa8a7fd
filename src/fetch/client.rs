use crate::config::FetchConfig;
use crate::error::{PipelineError, Result};
use crate::models::BatchKey;
use crate::utils::filename::batch_file_name;
use crate::utils::ProgressReporter;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Downloads raw station/year batches from the bulk climate data endpoint
#[derive(Clone)]
pub struct FetchClient {
    client: Client,
    config: FetchConfig,
}

/// Outcome of a multi-batch extraction
#[derive(Debug, Default)]
pub struct ExtractSummary {
    pub saved: Vec<PathBuf>,
    pub failed: Vec<(BatchKey, String)>,
}

impl FetchClient {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    /// Query parameters for one station/year download
    pub fn query_params(&self, station_id: u32, year: i32) -> Vec<(&'static str, String)> {
        vec![
            ("format", "csv".to_string()),
            ("stationID", station_id.to_string()),
            ("Year", year.to_string()),
            ("Month", self.config.month.to_string()),
            ("Day", self.config.day.to_string()),
            ("time", "LST".to_string()),
            ("timeframe", "1".to_string()),
            ("submit", "Download Data".to_string()),
        ]
    }

    async fn fetch_once(&self, station_id: u32, year: i32) -> Result<String> {
        let body = self
            .client
            .get(&self.config.base_url)
            .query(&self.query_params(station_id, year))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        if body.trim().is_empty() {
            return Err(PipelineError::MissingData(format!(
                "empty response for station {} year {}",
                station_id, year
            )));
        }
        Ok(body)
    }

    /// Fetch one batch, retrying with exponential backoff
    pub async fn fetch_batch(&self, station_id: u32, year: i32) -> Result<String> {
        let mut delay = self.config.retry_delay();
        let mut attempts = 0;

        loop {
            attempts += 1;
            match self.fetch_once(station_id, year).await {
                Ok(body) => {
                    debug!(station_id, year, attempts, bytes = body.len(), "fetched batch");
                    return Ok(body);
                }
                Err(e) if attempts < self.config.max_retries => {
                    warn!(
                        station_id,
                        year,
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying"
                    );
                    sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => {
                    error!(station_id, year, error = %e, "Exhausted retries");
                    return Err(PipelineError::Fetch {
                        station_id: station_id.to_string(),
                        year,
                        attempts,
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    /// Fetch one batch and persist it under its storage key
    pub async fn fetch_to_file(&self, station_id: u32, year: i32, raw_dir: &Path) -> Result<PathBuf> {
        let body = self.fetch_batch(station_id, year).await?;

        tokio::fs::create_dir_all(raw_dir).await?;
        let path = raw_dir.join(batch_file_name(&station_id.to_string(), year));
        tokio::fs::write(&path, body).await?;

        info!("Saved station {} year {} to {}", station_id, year, path.display());
        sleep(self.config.request_pacing()).await;
        Ok(path)
    }

    /// Fetch every configured station × year, at most `max_workers` at a
    /// time. A failed batch is recorded, not raised.
    pub async fn fetch_all(&self, raw_dir: &Path, progress: &ProgressReporter) -> Result<ExtractSummary> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_workers.max(1)));
        let mut tasks = JoinSet::new();

        for &station_id in &self.config.stations {
            for &year in &self.config.years {
                let client = self.clone();
                let semaphore = Arc::clone(&semaphore);
                let raw_dir = raw_dir.to_path_buf();

                tasks.spawn(async move {
                    let key = BatchKey::new(station_id.to_string(), year);
                    let result = match semaphore.acquire_owned().await {
                        Ok(_permit) => client.fetch_to_file(station_id, year, &raw_dir).await,
                        Err(e) => Err(PipelineError::Config(format!("worker pool closed: {}", e))),
                    };
                    (key, result)
                });
            }
        }

        let mut summary = ExtractSummary::default();
        while let Some(joined) = tasks.join_next().await {
            let (key, result) = joined?;
            match result {
                Ok(path) => summary.saved.push(path),
                Err(e) => {
                    error!("Extraction failed for {}: {}", key, e);
                    summary.failed.push((key, e.to_string()));
                }
            }
            progress.increment(1);
        }

        summary.saved.sort();
        summary.failed.sort_by(|a, b| a.0.cmp(&b.0));

        info!(
            "Extraction finished: {} saved, {} failed",
            summary.saved.len(),
            summary.failed.len()
        );
        Ok(summary)
    }

    pub fn task_count(&self) -> usize {
        self.config.stations.len() * self.config.years.len()
    }
}
