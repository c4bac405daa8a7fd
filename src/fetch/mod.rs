pub mod client;

pub use client::{ExtractSummary, FetchClient};
