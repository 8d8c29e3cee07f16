pub mod config;
pub mod error;
pub mod evaluations;
pub mod telemetry;
