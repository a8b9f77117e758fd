//! Common test utilities shared by the integration tests.
//!
//! This module provides:
//! - Test fixtures (sample `.appforge` projects, orchestrator builders)
//! - Recording and failing loggers
//! - Custom assertions

pub mod assertions;
pub mod fixtures;
pub mod mock_loggers;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use mock_loggers::*;
