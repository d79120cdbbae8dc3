//! Configuration module
//!
//! Handles the calibrated detection settings and their JSON overrides.

pub mod settings;

pub use settings::{ConfigError, Settings};
