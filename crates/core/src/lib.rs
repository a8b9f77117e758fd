//! # af-core
//!
//! Staged generation pipeline for appforge.
//!
//! This crate provides:
//! - Configuration loading from the `.appforge/` directory
//! - Stage clients (HTTP and offline mock) behind a common trait
//! - The state store that owns the current generation state
//! - The pipeline orchestrator with single-stage fallback
//! - Lifecycle logging collaborators
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and management
//! - [`engine`]: Pipeline orchestrator and cancellation
//! - [`init`]: `.appforge/` scaffolding from embedded templates
//! - [`logging`]: Lifecycle logging trait and implementations
//! - [`stages`]: Stage client trait, adapters and registry
//! - [`state`]: State store and throttled observer publishing

pub mod config;
pub mod engine;
pub mod init;
pub mod logging;
pub mod stages;
pub mod state;
