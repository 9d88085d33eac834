//! Stage 3: executive summary and the narrative sections around it.

use tracing::info;

use super::prompts::{self, bullet_list, describe_action_items, describe_decisions, describe_deadlines};
use super::{Extractor, StageReport};
use crate::fallback;
use crate::llm::{CompletionRequest, LlmClient};
use crate::model::{ExtractionOutput, SummaryOutput};
use crate::pipeline::{PipelineState, StageError, StageOutput};
use crate::validate::{parse_insights, parse_stakeholder_impact, parse_text, ParseError};

pub async fn run(llm: &LlmClient, state: &PipelineState) -> Result<StageReport, StageError> {
    let empty = ExtractionOutput::default();
    let extracted = state.extraction.as_ref().unwrap_or(&empty);
    let meeting_type = extracted.context.meeting_type.as_str();
    let kind = meeting_type.to_lowercase();
    let mut ex = Extractor::new(llm);

    let digest = format!(
        "Meeting type: {}\nAttendees: {}\n\nDecisions:\n{}\n\nAction items:\n{}\n\nKey points:\n{}",
        meeting_type,
        extracted.context.attendees.join(", "),
        describe_decisions(&extracted.decisions),
        describe_action_items(&extracted.action_items),
        bullet_list(&extracted.key_points),
    );

    let executive_summary = ex
        .extract(
            "executive_summary",
            CompletionRequest::new(
                prompts::EXECUTIVE_SUMMARY,
                format!("Create an executive summary for this {}:\n\n{}", kind, digest),
            )
            .temperature(0.2)
            .max_tokens(800),
            parse_text,
            || fallback::executive_summary(meeting_type, extracted, state.word_count),
        )
        .await?;

    let meeting_overview = ex
        .extract(
            "meeting_overview",
            CompletionRequest::new(
                prompts::MEETING_OVERVIEW,
                format!(
                    "Create a meeting overview for this {}:\n\nAttendees: {}\nTopics:\n{}",
                    kind,
                    extracted.context.attendees.join(", "),
                    bullet_list(&extracted.context.topics)
                ),
            )
            .temperature(0.2)
            .max_tokens(500),
            parse_text,
            || fallback::meeting_overview(meeting_type, &extracted.context.attendees, &extracted.context.topics),
        )
        .await?;

    let key_outcomes = ex
        .extract(
            "key_outcomes",
            CompletionRequest::new(
                prompts::KEY_OUTCOMES,
                format!("Analyse the key outcomes of this {}:\n\n{}", kind, digest),
            )
            .temperature(0.2)
            .max_tokens(800),
            parse_text,
            || fallback::key_outcomes(&extracted.decisions, &extracted.action_items, &extracted.key_points),
        )
        .await?;

    let next_steps = ex
        .extract(
            "next_steps",
            CompletionRequest::new(
                prompts::NEXT_STEPS,
                format!(
                    "Create a next steps summary based on this meeting:\n\nAction items:\n{}\n\nDeadlines:\n{}",
                    describe_action_items(&extracted.action_items),
                    describe_deadlines(&extracted.deadlines)
                ),
            )
            .temperature(0.2)
            .max_tokens(600),
            parse_text,
            || fallback::next_steps(&extracted.action_items, &extracted.deadlines),
        )
        .await?;

    let insights = ex
        .extract(
            "insights",
            CompletionRequest::new(
                prompts::STRATEGIC_INSIGHTS,
                format!("Generate strategic insights from this {}:\n\n{}", kind, digest),
            )
            .temperature(0.3)
            .max_tokens(600),
            |reply| non_empty(parse_insights(reply)?),
            || fallback::insights(&extracted.key_points, &extracted.decisions, meeting_type),
        )
        .await?;

    let stakeholder_impact = ex
        .extract(
            "stakeholder_impact",
            CompletionRequest::new(
                prompts::STAKEHOLDER_IMPACT,
                format!("Assess stakeholder impact from this {}:\n\n{}", kind, digest),
            )
            .temperature(0.2)
            .max_tokens(600),
            |reply| {
                let impact = parse_stakeholder_impact(reply)?;
                if impact.is_empty() {
                    Err(ParseError::Empty)
                } else {
                    Ok(impact)
                }
            },
            || {
                fallback::stakeholder_impact(
                    &extracted.decisions,
                    &extracted.action_items,
                    &extracted.context.attendees,
                )
            },
        )
        .await?;

    info!(
        summary_chars = executive_summary.chars().count(),
        insights = insights.len(),
        stakeholder_groups = stakeholder_impact.len(),
        "Summary written"
    );

    let output = SummaryOutput {
        executive_summary,
        meeting_overview,
        key_outcomes,
        next_steps,
        insights,
        stakeholder_impact,
    };
    Ok(ex.finish(StageOutput::Summary(output)))
}

fn non_empty(items: Vec<String>) -> Result<Vec<String>, ParseError> {
    if items.is_empty() {
        Err(ParseError::Empty)
    } else {
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::llm::{OfflineGateway, ScriptedGateway};
    use crate::model::{Metadata, TranscriptOutput};

    const TEXT: &str = "Ann: Welcome to the sprint planning.\nBo: I will draft the sprint goal document.";

    fn client(gateway: impl crate::llm::LlmGateway + 'static) -> LlmClient {
        LlmClient::new(Arc::new(gateway), Duration::from_secs(5))
    }

    fn state() -> PipelineState {
        let mut state = PipelineState::new(TEXT, Metadata::new(), "test");
        let roster = fallback::identify_speakers(TEXT);
        state.merge(StageOutput::Transcript(TranscriptOutput {
            cleaned_transcript: TEXT.to_string(),
            speakers: roster.clone(),
            quality_score: 0.9,
            processing_notes: String::new(),
        }));
        state.merge(StageOutput::Extraction(ExtractionOutput {
            action_items: fallback::action_items(TEXT),
            decisions: Vec::new(),
            key_points: Vec::new(),
            context: fallback::meeting_context(TEXT, &roster),
            deadlines: Vec::new(),
        }));
        state
    }

    fn summary(report: StageReport) -> SummaryOutput {
        match report.output {
            StageOutput::Summary(out) => out,
            other => panic!("unexpected output {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_offline_summary_is_complete() {
        let report = run(&client(OfflineGateway), &state()).await.unwrap();
        assert_eq!(report.fallbacks.len(), 6);

        let out = summary(report);
        assert!(out.executive_summary.contains("planning meeting"));
        assert!(out.meeting_overview.contains("Ann, Bo"));
        assert!(out.next_steps.contains("(Bo)"));
        assert!(!out.insights.is_empty());
        assert!(out.stakeholder_impact.contains_key("Direct Contributors"));
    }

    #[tokio::test]
    async fn test_empty_insights_fall_back() {
        let gateway = ScriptedGateway::new()
            .reply(prompts::STRATEGIC_INSIGHTS, r#"["short"]"#)
            .otherwise("Model written text for this section.");
        let report = run(&client(gateway), &state()).await.unwrap();
        assert_eq!(report.fallbacks, vec!["insights", "stakeholder_impact"]);

        let out = summary(report);
        assert_eq!(out.executive_summary, "Model written text for this section.");
        assert!(out.insights[0].contains("Scope and resourcing"));
    }
}
