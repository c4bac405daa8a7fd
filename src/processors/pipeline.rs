use crate::analyzers::QueryEngine;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::{AnalysisPayload, FinalRecord, QualityReport, QueryResultSet, RawBatch};
use crate::processors::{DimensionJoiner, MonthlyAggregator, Normalizer, QualityAuditor, YoyCalculator};
use crate::readers::{BatchReader, DimensionReader};
use crate::utils::progress::ProgressReporter;
use crate::writers::{read_dataset, save_analysis_results, save_quality_report, write_dataset};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Counts and locations produced by a transform run
#[derive(Debug, Clone, PartialEq)]
pub struct TransformSummary {
    pub batches: usize,
    pub observations: usize,
    pub monthly_rows: usize,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub results: QueryResultSet,
    pub artifact_path: PathBuf,
}

/// What a full run did. `None` stages were skipped by the quality gate.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub quality: QualityReport,
    pub transform: Option<TransformSummary>,
    pub analysis: Option<AnalysisOutcome>,
}

/// Runs the batch stages end to end from the persisted raw batches
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn read_batches(&self) -> Result<Vec<RawBatch>> {
        BatchReader::new().read_all(&self.config.raw_data_dir)
    }

    /// Audit every raw batch and overwrite the quality report
    pub fn audit(&self, progress: Option<&ProgressReporter>) -> Result<QualityReport> {
        if let Some(p) = progress {
            p.set_message("Auditing raw batches...");
        }

        let batches = self.read_batches()?;
        let report = QualityAuditor::from_config(&self.config.audit).audit_all(&batches);
        save_quality_report(&report, &self.config.quality_report_path())?;

        Ok(report)
    }

    /// Normalize, aggregate, compute deltas and join. Nothing is written.
    pub fn build_final_records(&self, batches: &[RawBatch]) -> Result<(Vec<FinalRecord>, usize, usize)> {
        let observations = Normalizer::new().normalize_all(batches)?;
        let aggregates = MonthlyAggregator::new().aggregate(&observations)?;
        let monthly_rows = aggregates.len();
        let augmented = YoyCalculator::new().calculate(aggregates);

        let reader = DimensionReader::new();
        let dimensions = reader.read_dimensions(&self.config.dimension_file)?;
        let mapping = reader.load_mapping(self.config.station_mapping_file.as_deref())?;
        let records = DimensionJoiner::new(&dimensions, &mapping).join(&augmented)?;

        Ok((records, observations.len(), monthly_rows))
    }

    /// Transform the raw batches into the final dataset file
    pub fn transform(&self, progress: Option<&ProgressReporter>) -> Result<TransformSummary> {
        if let Some(p) = progress {
            p.set_message("Transforming raw batches...");
        }

        let batches = self.read_batches()?;
        let (records, observations, monthly_rows) = self.build_final_records(&batches)?;

        let output_path = self.config.output_path();
        write_dataset(&records, &output_path, &self.config.compression)?;

        info!(
            "Transformation complete: {} batches, {} observations, {} monthly rows",
            batches.len(),
            observations,
            monthly_rows
        );

        Ok(TransformSummary {
            batches: batches.len(),
            observations,
            monthly_rows,
            output_path,
        })
    }

    /// Load the final dataset into the relational store, run the summary
    /// queries and save the results artifact. A failed analysis still saves
    /// an error artifact before the failure is returned.
    pub fn analyze(&self, progress: Option<&ProgressReporter>) -> Result<AnalysisOutcome> {
        if let Some(p) = progress {
            p.set_message("Running analytical queries...");
        }

        let analysis = read_dataset(&self.config.output_path()).and_then(|records| {
            let mut engine = QueryEngine::open(&self.config.db_path)?;
            engine.analyze(&records)
        });

        let artifact = self.config.analysis_results_path();
        match analysis {
            Ok(results) => {
                let artifact_path =
                    save_analysis_results(&AnalysisPayload::Success(results.clone()), &artifact)?;
                Ok(AnalysisOutcome {
                    results,
                    artifact_path,
                })
            }
            Err(e) => {
                error!("Analysis failed: {}", e);
                save_analysis_results(&AnalysisPayload::Absent, &artifact)?;
                Err(e)
            }
        }
    }

    /// Audit, then transform and analyze unless the quality report is empty
    pub fn run(&self, progress: Option<&ProgressReporter>) -> Result<RunSummary> {
        let quality = self.audit(progress)?;

        if quality.is_empty() {
            warn!("Quality report is empty; skipping transformation");
            return Ok(RunSummary {
                quality,
                transform: None,
                analysis: None,
            });
        }

        let transform = self.transform(progress)?;
        let analysis = self.analyze(progress)?;

        Ok(RunSummary {
            quality,
            transform: Some(transform),
            analysis: Some(analysis),
        })
    }
}
