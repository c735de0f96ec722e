pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod geo;
pub mod observability;
pub mod pipeline;

// Use cases and the file adapters behind their ports
pub mod app;
pub mod infra;
