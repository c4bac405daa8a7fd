pub mod aggregate;
pub mod analysis;
pub mod final_record;
pub mod observation;
pub mod quality;
pub mod station;

pub use aggregate::{MonthlyAggregate, YoyAugmentedRecord};
pub use analysis::{AnalysisPayload, QueryResultSet, QueryTable, Row};
pub use final_record::FinalRecord;
pub use observation::{is_null_marker, parse_temperature, parse_timestamp, BatchKey, ObservationRecord, RawBatch};
pub use quality::{OutlierBounds, QualityRecord, QualityReport};
pub use station::{StationDimension, StationMapping};
