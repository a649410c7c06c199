//! Concrete adapter implementations for ports.

pub mod binance_adapter;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod paper_execution;
pub mod recording_sink;
pub mod tracing_sink;
