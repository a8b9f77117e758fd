//! Stage client implementations.

mod http_stage;
pub mod mock_stage;

pub use http_stage::{extract_content, HttpStageClient};
pub use mock_stage::MockStage;
