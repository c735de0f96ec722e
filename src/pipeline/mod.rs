// Data processing pipeline: ingestion, processing, and the file-level runner

pub mod ingestion;
pub mod processing;
pub mod runner;

pub use runner::{EnrichResult, Pipeline, SimplifyResult, SizeReport};
