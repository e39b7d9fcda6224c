pub mod constants;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod parser;
pub mod pipeline;
pub mod storage;
pub mod types;

// Capability boundaries and their implementations
pub mod app;
pub mod infra;
