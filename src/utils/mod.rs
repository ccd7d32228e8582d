//! Utility functions and helpers.

mod config;

pub use config::{AppConfig, GridConfig, TrainingConfig};
