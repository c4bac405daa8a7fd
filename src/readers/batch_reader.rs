use crate::error::{PipelineError, Result};
use crate::models::{is_null_marker, BatchKey, RawBatch};
use crate::utils::filename::{is_batch_file, parse_batch_key};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Reads raw observation batches persisted by the extraction step.
pub struct BatchReader;

impl BatchReader {
    pub fn new() -> Self {
        Self
    }

    /// Find raw batch files in a directory, sorted by file name
    pub fn find_batch_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && is_batch_file(&path) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Read every batch in `dir`. Unreadable batches are logged and skipped;
    /// finding nothing usable is an error.
    pub fn read_all(&self, dir: &Path) -> Result<Vec<RawBatch>> {
        let files = self.find_batch_files(dir)?;

        if files.is_empty() {
            return Err(PipelineError::EmptyDataset(format!(
                "No raw data files found in {}",
                dir.display()
            )));
        }

        let mut batches = Vec::with_capacity(files.len());
        for path in &files {
            match self.read_batch(path) {
                Ok(batch) => {
                    debug!(
                        file = %path.display(),
                        records = batch.record_count(),
                        "read raw batch"
                    );
                    batches.push(batch);
                }
                Err(e) => warn!(file = %path.display(), error = %e, "skipping unreadable batch"),
            }
        }

        if batches.is_empty() {
            return Err(PipelineError::EmptyDataset(format!(
                "None of the {} raw data files in {} could be read",
                files.len(),
                dir.display()
            )));
        }

        info!(
            "Loaded {} of {} raw batches from {}",
            batches.len(),
            files.len(),
            dir.display()
        );
        Ok(batches)
    }

    /// Read a single batch; station id and year come from the file name
    pub fn read_batch(&self, path: &Path) -> Result<RawBatch> {
        let key = parse_batch_key(path)?;
        let bytes = std::fs::read(path)?;
        self.parse_batch(key, &bytes)
    }

    /// Parse raw CSV bytes into a batch. Headers and cells are trimmed and
    /// null markers (`NA`, `NaN`, empty, ...) become `None`.
    pub fn parse_batch(&self, key: BatchKey, bytes: &[u8]) -> Result<RawBatch> {
        let text = decode_text(bytes);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(PipelineError::InvalidFormat(format!(
                "Batch {} has no header row",
                key
            )));
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row = record
                .iter()
                .map(|cell| {
                    let cell = cell.trim();
                    if is_null_marker(cell) {
                        None
                    } else {
                        Some(cell.to_string())
                    }
                })
                .collect();
            rows.push(row);
        }

        Ok(RawBatch::new(key, headers, rows))
    }
}

impl Default for BatchReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode as UTF-8 (dropping a BOM), falling back to Windows-1252
pub fn decode_text(bytes: &[u8]) -> String {
    let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(bytes);
    if !had_errors {
        return text.into_owned();
    }

    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    text.into_owned()
}
