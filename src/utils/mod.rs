pub mod constants;
pub mod coordinates;
pub mod filename;
pub mod logging;
pub mod progress;

pub use constants::*;
pub use coordinates::{dms_to_decimal, parse_coordinate};
pub use filename::{batch_file_name, is_batch_file, parse_batch_key};
pub use logging::init_logging;
pub use progress::ProgressReporter;
