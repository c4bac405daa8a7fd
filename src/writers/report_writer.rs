use crate::error::Result;
use crate::models::{AnalysisPayload, QualityReport};
use crate::utils::constants::ANALYSIS_FALLBACK_FILE;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Overwrite the quality report artifact
pub fn save_quality_report(report: &QualityReport, path: &Path) -> Result<()> {
    write_json(&serde_json::to_value(report)?, path)?;
    info!("Saved quality report for {} batches to {}", report.len(), path.display());
    Ok(())
}

pub fn load_quality_report(path: &Path) -> Result<QualityReport> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Save whatever the analysis produced. Never fails on payload shape; if the
/// primary file cannot be written, an error artifact goes to the fallback
/// file next to it. Returns the path actually written.
pub fn save_analysis_results(payload: &AnalysisPayload, path: &Path) -> Result<PathBuf> {
    let artifact = payload.to_artifact();

    match write_json(&artifact, path) {
        Ok(()) => {
            info!("Saved analysis results to {}", path.display());
            Ok(path.to_path_buf())
        }
        Err(e) => {
            error!("Failed to save analysis results to {}: {}", path.display(), e);
            let fallback = path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(ANALYSIS_FALLBACK_FILE);
            write_json(&json!({ "error": e.to_string() }), &fallback)?;
            info!("Saved fallback analysis artifact to {}", fallback.display());
            Ok(fallback)
        }
    }
}

/// Hand-off read of a previously saved results file
pub fn load_analysis_payload(path: &Path) -> AnalysisPayload {
    AnalysisPayload::from_handoff(std::fs::read_to_string(path).ok())
}

fn write_json(value: &Value, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    std::fs::write(path, text)?;
    Ok(())
}
