//! Core domain types and logic.

pub mod candle;
pub mod series;
pub mod indicator;
pub mod account;
pub mod signal;
pub mod events;
pub mod strategy;
pub mod engine;
pub mod session;
pub mod config_validation;
pub mod error;
