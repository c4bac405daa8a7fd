pub mod dimension_joiner;
pub mod monthly_aggregator;
pub mod normalizer;
pub mod pipeline;
pub mod quality_auditor;
pub mod yoy_calculator;

pub use dimension_joiner::DimensionJoiner;
pub use monthly_aggregator::MonthlyAggregator;
pub use normalizer::Normalizer;
pub use pipeline::{AnalysisOutcome, Pipeline, RunSummary, TransformSummary};
pub use quality_auditor::QualityAuditor;
pub use yoy_calculator::YoyCalculator;
