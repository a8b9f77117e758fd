//! Custom assertion helpers for generation tests.

use af_protocol::generation_models::GenerationState;
use af_protocol::stage_models::{ExecutionStatus, StageKind};

/// Assert that exactly one of artifact and error is set on a finished run.
#[allow(dead_code)]
pub fn assert_outcome_exclusive(state: &GenerationState) {
    if state.has_success() {
        assert!(
            state.final_artifact.is_some() && state.error.is_none(),
            "Successful run must have an artifact and no error: {state:?}"
        );
    }
    if state.has_error() {
        assert!(
            state.error.is_some() && state.final_artifact.is_none(),
            "Failed run must have an error and no artifact: {state:?}"
        );
    }
}

/// Assert the stages and statuses of the recorded executions, in order.
#[allow(dead_code)]
pub fn assert_executions(state: &GenerationState, expected: &[(StageKind, ExecutionStatus)]) {
    let actual: Vec<(StageKind, ExecutionStatus)> = state
        .executions
        .iter()
        .map(|record| (record.stage, record.status))
        .collect();
    assert_eq!(actual, expected, "Unexpected execution records");
}
