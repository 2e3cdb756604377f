pub mod browser;
pub mod config;
pub mod ingest;
pub mod listing;
pub mod notify;
pub mod output;
pub mod scoring;
pub mod telemetry;
