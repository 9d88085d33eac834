//! Stage 2: action items, decisions, key points, meeting context and deadlines.

use tracing::info;

use super::prompts::{self, excerpt};
use super::{Extractor, StageReport};
use crate::fallback;
use crate::llm::{CompletionRequest, LlmClient};
use crate::model::{ExtractionOutput, SpeakerRoster};
use crate::pipeline::{PipelineState, StageError, StageOutput};
use crate::validate::{
    parse_action_items, parse_deadlines, parse_decisions, parse_key_points, parse_meeting_context,
};

/// Context analysis only needs the opening of the meeting.
const CONTEXT_EXCERPT_CHARS: usize = 2000;

pub async fn run(llm: &LlmClient, state: &PipelineState) -> Result<StageReport, StageError> {
    let text = state.cleaned_transcript().unwrap_or_default();
    let roster = state
        .transcript
        .as_ref()
        .map(|t| t.speakers.clone())
        .unwrap_or_default();
    let mut ex = Extractor::new(llm);

    let action_items = ex
        .extract(
            "action_items",
            CompletionRequest::new(
                prompts::EXTRACT_ACTION_ITEMS,
                format!("Extract all action items from this meeting transcript:\n\n{}", text),
            )
            .temperature(0.1)
            .max_tokens(2000),
            parse_action_items,
            || fallback::action_items(text),
        )
        .await?;

    let decisions = ex
        .extract(
            "decisions",
            CompletionRequest::new(
                prompts::EXTRACT_DECISIONS,
                format!("Extract all decisions from this meeting transcript:\n\n{}", text),
            )
            .temperature(0.1)
            .max_tokens(1500),
            parse_decisions,
            || fallback::decisions(text),
        )
        .await?;

    let key_points = ex
        .extract(
            "key_points",
            CompletionRequest::new(
                prompts::EXTRACT_KEY_POINTS,
                format!("Extract the key discussion points from this meeting transcript:\n\n{}", text),
            )
            .temperature(0.2)
            .max_tokens(1000),
            parse_key_points,
            || fallback::key_points(text),
        )
        .await?;

    let mut context = ex
        .extract(
            "meeting_context",
            CompletionRequest::new(
                prompts::ANALYZE_CONTEXT,
                format!(
                    "Analyse this meeting for context and metadata:\n\n{}",
                    excerpt(text, CONTEXT_EXCERPT_CHARS)
                ),
            )
            .temperature(0.1)
            .max_tokens(800),
            parse_meeting_context,
            || fallback::meeting_context(text, &roster),
        )
        .await?;
    fill_attendees(&mut context.attendees, &roster);

    let deadlines = ex
        .extract(
            "deadlines",
            CompletionRequest::new(
                prompts::EXTRACT_DEADLINES,
                format!("Extract deadlines and time-sensitive items:\n\n{}", text),
            )
            .temperature(0.1)
            .max_tokens(800),
            parse_deadlines,
            || fallback::deadlines(text),
        )
        .await?;

    info!(
        action_items = action_items.len(),
        decisions = decisions.len(),
        key_points = key_points.len(),
        deadlines = deadlines.len(),
        meeting_type = %context.meeting_type,
        "Content analysed"
    );

    let output = ExtractionOutput {
        action_items,
        decisions,
        key_points,
        context,
        deadlines,
    };
    Ok(ex.finish(StageOutput::Extraction(output)))
}

/// The model sometimes omits attendees; the speaker roster is a fair stand-in.
fn fill_attendees(attendees: &mut Vec<String>, roster: &SpeakerRoster) {
    if attendees.is_empty() {
        *attendees = roster.names();
    }
}
