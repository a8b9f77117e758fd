//! Per-stage request shaping.
//!
//! Each stage sees a different slice of the context accumulator. The mapping is
//! a closed `match` over [`StageKind`]; adding a stage means adding an arm here.

use crate::stages::base::StageRequest;
use af_protocol::stage_models::{ContextAccumulator, StageInstructions, StageKind};

/// Build the request for `context.current_stage`.
///
/// Pure: the same context and instructions always produce the same request.
pub fn build_request(context: &ContextAccumulator, instructions: &StageInstructions) -> StageRequest {
    let mut sections = vec![section("User request", &context.original_prompt)];

    match context.current_stage {
        StageKind::Planner => {}
        StageKind::Themer => {
            push_optional(&mut sections, "Application plan", context.planner_output.as_deref());
        }
        StageKind::Coder => {
            // In single mode neither slot is filled and the Coder works from the prompt alone.
            push_optional(&mut sections, "Application plan", context.planner_output.as_deref());
            push_optional(&mut sections, "Visual theme", context.themer_output.as_deref());
        }
        StageKind::Reviewer => {
            push_optional(&mut sections, "Application code", context.coder_output.as_deref());
        }
    }

    push_optional(
        &mut sections,
        "Additional instructions",
        context.extra_instructions.as_deref(),
    );

    StageRequest {
        stage: context.current_stage,
        model: instructions.model.clone(),
        system_prompt: instructions.system_prompt.clone(),
        user_message: sections.join("\n\n"),
        temperature: instructions.temperature,
    }
}

fn section(title: &str, body: &str) -> String {
    format!("## {title}\n{body}")
}

fn push_optional(sections: &mut Vec<String>, title: &str, body: Option<&str>) {
    if let Some(body) = body {
        sections.push(section(title, body));
    }
}
