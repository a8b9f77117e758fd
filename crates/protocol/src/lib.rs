//! # af-protocol
//!
//! Data model and observer events for appforge.
//!
//! This crate defines all shared data structures used for:
//! - Stage definitions, per-stage execution records and context snapshots
//! - The aggregate generation state observed by UIs and loggers
//! - Configuration file parsing (`.appforge/config.toml`, stage front matter)
//! - Events delivered to observers of a generation run
//!
//! ## Modules
//!
//! - [`stage_models`]: Stages, execution records, context accumulator
//! - [`generation_models`]: Pipeline mode/phase and the generation state
//! - [`config_models`]: Global configuration from config.toml
//! - [`ipc`]: Events sent from the core to observers
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde, ts-rs, chrono and uuid
//! - TypeScript generation: All types derive `TS` for client compatibility
//! - Independent compilation: No dependencies on other appforge crates

pub mod config_models;
pub mod generation_models;
pub mod ipc;
pub mod stage_models;

// Re-export all public types for convenience
pub use config_models::*;
pub use generation_models::*;
pub use ipc::*;
pub use stage_models::*;

// Session ids in events are plain UUIDs
pub use uuid::Uuid;
