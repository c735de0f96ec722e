// Pipeline ingestion: reading the tabular school data

pub mod school_csv;

pub use school_csv::{read_school_rows, SchoolRow};
