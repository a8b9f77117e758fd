//! Cooperative cancellation for generation runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Error recorded on a run that was cancelled.
pub const CANCELLED_MESSAGE: &str = "Generation cancelled";

/// Shared abort signal, checked by the orchestrator between stages.
///
/// A stage call that is already in flight is not interrupted; the run stops
/// before the next one starts. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
