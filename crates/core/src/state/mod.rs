//! Generation state management.
//!
//! This module provides:
//! - [`StateStore`], the sole owner and mutator of the current `GenerationState`
//! - [`ThrottledPublisher`], which forwards store changes to observers at a
//!   bounded rate

pub mod publisher;
pub mod store;

pub use publisher::ThrottledPublisher;
pub use store::StateStore;
