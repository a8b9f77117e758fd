//! Initialization module for creating `.appforge` directory structures.
//!
//! This module provides functionality to initialize a new appforge project
//! by generating a `.appforge/` directory with pre-configured templates for:
//! - Global configuration (`config.toml`)
//! - Stage instructions (`stages/*.md`)
//!
//! # Example
//!
//! ```no_run
//! use af_core::init::{InitOptions, generate_appforge_structure};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = InitOptions {
//!     target_dir: PathBuf::from("."),
//!     force: false,
//! };
//!
//! let written = generate_appforge_structure(options).await?;
//! println!("Wrote {} files", written.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod generator;
pub mod templates;

pub use error::{InitError, InitResult};
pub use generator::{generate_appforge_structure, InitOptions};
pub use templates::{get_template, list_templates};
