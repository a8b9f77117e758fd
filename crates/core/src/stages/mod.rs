//! Stage clients and request shaping.
//!
//! This module provides the `StageClient` trait, the pure per-stage request
//! builder, the concrete clients, and the `StageRegistry` that maps each
//! `StageKind` to the client that serves it.

pub mod adapters;
pub mod base;
pub mod factory;
pub mod registry;
pub mod request;

pub use adapters::{HttpStageClient, MockStage};
pub use base::{StageClient, StageError, StageRequest};
pub use factory::{ClientKind, StageClientFactory};
pub use registry::StageRegistry;
pub use request::build_request;
