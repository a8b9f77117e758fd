//! Base StageClient trait and supporting types.

use af_protocol::stage_models::StageKind;
use async_trait::async_trait;
use thiserror::Error;

/// A fully-shaped request for one stage call.
///
/// Produced by [`crate::stages::request::build_request`] and handed to the
/// stage client untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct StageRequest {
    /// The stage this request belongs to.
    pub stage: StageKind,

    /// Model identifier sent to the inference service.
    pub model: String,

    /// Static stage instructions (opaque to the pipeline).
    pub system_prompt: String,

    /// The user turn composed from the context accumulator.
    pub user_message: String,

    pub temperature: Option<f32>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error("Stage client not available: {0}")]
    NotAvailable(String),
    #[error("API call failed: {0}")]
    ApiError(String),
    #[error("Rate limited: {0}")]
    RateLimited(String),
    #[error("Response parsing error: {0}")]
    ResponseParseError(String),
    #[error("{0} returned empty content")]
    EmptyContent(StageKind),
    #[error("Execution failed: {0}")]
    ExecutionError(String),
}

/// A capability that performs one remote call for a stage.
///
/// Retries and timeouts are the client's own business; the orchestrator calls
/// each stage exactly once per attempt.
#[async_trait]
pub trait StageClient: Send + Sync {
    async fn check_availability(&self) -> bool;
    async fn execute(&self, request: &StageRequest) -> Result<String, StageError>;
}
