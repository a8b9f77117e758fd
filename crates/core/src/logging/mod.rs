//! Lifecycle logging for generation runs.
//!
//! The orchestrator reports every session, stage and fallback to a
//! [`GenerationLogger`]. Logging is fire-and-forget: implementations return
//! errors, but the orchestrator only warns about them and carries on.

pub mod base;
pub mod channel_logger;
pub mod tracing_logger;

pub use base::{GenerationLogger, LogError, SessionId};
pub use channel_logger::ChannelLogger;
pub use tracing_logger::TracingLogger;
