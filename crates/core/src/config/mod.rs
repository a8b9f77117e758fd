//! Configuration loading and management.
//!
//! This module provides functionality to load and parse all configuration files
//! from the `.appforge/` directory structure.

pub mod error;
pub mod loader;
pub mod models;

pub use error::{ConfigError, ConfigResult};
pub use loader::load_config;
pub use models::AppConfig;
