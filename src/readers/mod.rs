pub mod batch_reader;
pub mod dimension_reader;

pub use batch_reader::{decode_text, BatchReader};
pub use dimension_reader::DimensionReader;
