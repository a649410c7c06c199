//! Port traits for the collaborators around the decision engine.

pub mod config_port;
pub mod data_port;
pub mod event_port;
pub mod execution_port;
