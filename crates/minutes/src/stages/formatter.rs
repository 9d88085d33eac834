//! Stage 4: the final minutes document and its reusable blocks.

use tracing::{debug, info};

use super::prompts::{self, bullet_list, describe_action_items, describe_decisions};
use super::{Extractor, StageReport};
use crate::llm::{CompletionRequest, LlmClient};
use crate::model::{ExtractionOutput, MinutesOutput, SummaryOutput};
use crate::pipeline::{PipelineState, StageError, StageOutput};
use crate::render;
use crate::validate::{parse_sections, parse_text, ParseError};

pub async fn run(llm: &LlmClient, state: &PipelineState) -> Result<StageReport, StageError> {
    let empty_extraction = ExtractionOutput::default();
    let empty_summary = SummaryOutput::default();
    let extracted = state.extraction.as_ref().unwrap_or(&empty_extraction);
    let summary = state.summary.as_ref().unwrap_or(&empty_summary);
    let metadata = &state.metadata;

    let meeting_type = render::meeting_type(metadata, Some(extracted));
    let date = render::meeting_date(metadata);
    let attendees = render::attendees(metadata, Some(extracted));
    let mut ex = Extractor::new(llm);

    let brief = format!(
        "Meeting type: {}\nDate: {}\nDuration: {}\nAttendees: {}\n\n\
         Executive summary:\n{}\n\nOverview:\n{}\n\nKey outcomes:\n{}\n\nNext steps:\n{}\n\n\
         Action items:\n{}\n\nDecisions:\n{}\n\nInsights:\n{}",
        meeting_type,
        date,
        metadata.get("duration").map(String::as_str).unwrap_or("not specified"),
        attendees.join(", "),
        summary.executive_summary,
        summary.meeting_overview,
        summary.key_outcomes,
        summary.next_steps,
        describe_action_items(&extracted.action_items),
        describe_decisions(&extracted.decisions),
        bullet_list(&summary.insights),
    );

    let formatted_minutes = ex
        .extract(
            "formatted_minutes",
            CompletionRequest::new(
                prompts::FORMAT_MINUTES,
                format!(
                    "Create professional meeting minutes for this {}:\n\n{}",
                    meeting_type.to_lowercase(),
                    brief
                ),
            )
            .temperature(0.1)
            .max_tokens(4000),
            parse_text,
            || render::fallback_document(summary, extracted, metadata),
        )
        .await?;

    let sections = ex
        .extract(
            "sections",
            CompletionRequest::new(
                prompts::FORMAT_SECTIONS,
                format!(
                    "Create modular sections for {} minutes:\n\n{}",
                    meeting_type.to_lowercase(),
                    brief
                ),
            )
            .temperature(0.1)
            .max_tokens(2000),
            |reply| {
                let sections = parse_sections(reply)?;
                if sections.is_empty() {
                    Err(ParseError::Empty)
                } else {
                    Ok(sections)
                }
            },
            || render::fallback_sections(summary, extracted, metadata),
        )
        .await?;

    let action_items_table = if extracted.action_items.is_empty() {
        render::NO_ACTION_ITEMS.to_string()
    } else {
        ex.extract(
            "action_items_table",
            CompletionRequest::new(
                prompts::FORMAT_ACTION_TABLE,
                format!(
                    "Create a professional action items table:\n\n{}",
                    describe_action_items(&extracted.action_items)
                ),
            )
            .temperature(0.1)
            .max_tokens(1500),
            parse_text,
            || render::action_items_table(&extracted.action_items),
        )
        .await?
    };

    let decisions_list = if extracted.decisions.is_empty() {
        render::NO_DECISIONS.to_string()
    } else {
        ex.extract(
            "decisions_list",
            CompletionRequest::new(
                prompts::FORMAT_DECISIONS,
                format!(
                    "Format the decisions section:\n\n{}",
                    describe_decisions(&extracted.decisions)
                ),
            )
            .temperature(0.1)
            .max_tokens(1200),
            parse_text,
            || render::decisions_list(&extracted.decisions),
        )
        .await?
    };

    let attendees_list = ex
        .extract(
            "attendees_list",
            CompletionRequest::new(
                prompts::FORMAT_ATTENDEES,
                format!(
                    "Create the meeting header and attendees section:\n\nDate: {}\nTime: {}\nDuration: {}\nAttendees:\n{}",
                    date,
                    metadata.get("start_time").map(String::as_str).unwrap_or("not specified"),
                    metadata.get("duration").map(String::as_str).unwrap_or("not specified"),
                    bullet_list(&attendees)
                ),
            )
            .temperature(0.1)
            .max_tokens(800),
            parse_text,
            || render::attendees_block(&attendees, metadata),
        )
        .await?;

    info!(
        chars = formatted_minutes.chars().count(),
        sections = sections.len(),
        "Minutes formatted"
    );
    debug!(sections = ?sections.keys().collect::<Vec<_>>(), "Minute sections");

    let output = MinutesOutput {
        formatted_minutes,
        sections,
        action_items_table,
        decisions_list,
        attendees_list,
    };
    Ok(ex.finish(StageOutput::Minutes(output)))
}
