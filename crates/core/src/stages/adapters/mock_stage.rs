//! Mock stage client for offline runs and testing.

use crate::stages::base::{StageClient, StageError, StageRequest};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
enum MockBehavior {
    Succeed(String),
    Fail(StageError),
}

/// A deterministic [`StageClient`].
///
/// Clones share the same request log, so a test can keep one handle and hand
/// the other to a registry.
#[derive(Clone)]
pub struct MockStage {
    available: bool,
    behavior: MockBehavior,
    delay: Option<Duration>,
    requests: Arc<Mutex<Vec<StageRequest>>>,
}

impl MockStage {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            available: true,
            behavior: MockBehavior::Succeed(content.into()),
            delay: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::failing_with(StageError::ExecutionError(message.into()))
    }

    pub fn failing_with(error: StageError) -> Self {
        Self {
            available: true,
            behavior: MockBehavior::Fail(error),
            delay: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::success(String::new())
        }
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of times `execute` has been called.
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<StageRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl StageClient for MockStage {
    async fn check_availability(&self) -> bool {
        self.available
    }

    async fn execute(&self, request: &StageRequest) -> Result<String, StageError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if !self.available {
            return Err(StageError::NotAvailable("Mock stage not available".to_string()));
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            MockBehavior::Succeed(content) => Ok(content.clone()),
            MockBehavior::Fail(error) => Err(error.clone()),
        }
    }
}
