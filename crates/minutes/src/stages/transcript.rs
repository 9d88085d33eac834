//! Stage 1: clean the raw text, identify speakers, rate transcript quality.

use tracing::{debug, info};

use super::prompts::{self, excerpt};
use super::{Extractor, StageReport};
use crate::fallback;
use crate::llm::{CompletionRequest, LlmClient};
use crate::model::{SpeakerRoster, TranscriptOutput};
use crate::pipeline::{PipelineState, StageError, StageOutput};
use crate::validate::{parse_quality_score, parse_speakers, parse_text};

/// A cleaned text shorter than this share of the input is assumed to have lost content.
const MIN_CLEANED_RATIO: f64 = 0.5;

pub async fn run(llm: &LlmClient, state: &PipelineState) -> Result<StageReport, StageError> {
    let raw = state.raw_transcript.trim();
    let mut ex = Extractor::new(llm);
    let mut notes = Vec::new();

    let mut kept_original = false;
    let cleaned = ex
        .extract(
            "cleaned_transcript",
            CompletionRequest::new(
                prompts::CLEAN_TRANSCRIPT,
                format!("Clean this meeting transcript:\n\n{}", raw),
            )
            .temperature(0.1)
            .max_tokens(4000),
            |reply| {
                let text = parse_text(reply)?;
                let ratio = text.chars().count() as f64 / raw.chars().count().max(1) as f64;
                if ratio < MIN_CLEANED_RATIO {
                    kept_original = true;
                    Ok(raw.to_string())
                } else {
                    Ok(text)
                }
            },
            || fallback::clean_transcript(raw),
        )
        .await?;
    if kept_original {
        notes.push("Cleaned text lost too much content, original kept".to_string());
    }

    let (speakers, quality_score) = if cleaned.is_empty() {
        notes.push("No meaningful content left after cleaning".to_string());
        (SpeakerRoster::default(), fallback::quality_score("", 0))
    } else {
        let speakers = ex
            .extract(
                "speakers",
                CompletionRequest::new(
                    prompts::IDENTIFY_SPEAKERS,
                    format!("Identify the speakers in this transcript:\n\n{}", cleaned),
                )
                .max_tokens(1000),
                parse_speakers,
                || fallback::identify_speakers(&cleaned),
            )
            .await?;

        let speaker_count = speakers.speakers.len();
        let quality_score = ex
            .extract(
                "quality_score",
                CompletionRequest::new(
                    prompts::ASSESS_QUALITY,
                    format!(
                        "Original excerpt:\n{}\n\nCleaned excerpt:\n{}\n\nSpeakers found: {}",
                        excerpt(raw, 1500),
                        excerpt(&cleaned, 1500),
                        speaker_count
                    ),
                )
                .max_tokens(20),
                parse_quality_score,
                || fallback::quality_score(&cleaned, speaker_count),
            )
            .await?;

        (speakers, quality_score)
    };

    notes.push(format!(
        "Cleaned from {} to {} characters",
        raw.chars().count(),
        cleaned.chars().count()
    ));
    notes.push(format!("{} speaker(s) identified", speakers.speakers.len()));
    notes.push(format!("Quality score {:.2}", quality_score));
    if !ex.fallbacks().is_empty() {
        notes.push(format!("Heuristics used for: {}", ex.fallbacks().join(", ")));
    }

    info!(
        speakers = speakers.speakers.len(),
        quality = quality_score,
        chars = cleaned.chars().count(),
        "Transcript processed"
    );
    debug!(notes = ?notes, "Transcript processing notes");

    let output = TranscriptOutput {
        cleaned_transcript: cleaned,
        speakers,
        quality_score,
        processing_notes: notes.join(" | "),
    };
    Ok(ex.finish(StageOutput::Transcript(output)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::llm::{GatewayError, OfflineGateway, ScriptedGateway};
    use crate::model::Metadata;

    fn client(gateway: impl crate::llm::LlmGateway + 'static) -> LlmClient {
        LlmClient::new(Arc::new(gateway), Duration::from_secs(5))
    }

    fn state(raw: &str) -> PipelineState {
        PipelineState::new(raw, Metadata::new(), "test")
    }

    fn transcript(report: StageReport) -> TranscriptOutput {
        match report.output {
            StageOutput::Transcript(out) => out,
            other => panic!("unexpected output {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_model_outputs_are_used() {
        let gateway = ScriptedGateway::new()
            .reply(prompts::CLEAN_TRANSCRIPT, "Ann: We ship on Monday.\nBo: Agreed.")
            .reply(
                prompts::IDENTIFY_SPEAKERS,
                r#"{"identified_speakers": ["Ann", "Bo"], "confidence_score": 0.95}"#,
            )
            .reply(prompts::ASSESS_QUALITY, "0.9");
        let report = run(&client(gateway), &state("Ann: um we ship on Monday.\nBo: uh agreed."))
            .await
            .unwrap();
        assert!(report.fallbacks.is_empty());

        let out = transcript(report);
        assert_eq!(out.cleaned_transcript, "Ann: We ship on Monday.\nBo: Agreed.");
        assert_eq!(out.speakers.names(), vec!["Ann", "Bo"]);
        assert_eq!(out.quality_score, 0.9);
        assert!(out.processing_notes.contains(" | "));
    }

    #[tokio::test]
    async fn test_truncated_cleaning_keeps_original() {
        let raw = "Ann: We reviewed the quarterly numbers in detail and agreed on next steps.";
        let gateway = ScriptedGateway::new()
            .reply(prompts::CLEAN_TRANSCRIPT, "Ann: ok")
            .otherwise("not json");
        let out = transcript(run(&client(gateway), &state(raw)).await.unwrap());
        assert_eq!(out.cleaned_transcript, raw);
        assert!(out.processing_notes.contains("original kept"));
    }

    #[tokio::test]
    async fn test_offline_uses_heuristics() {
        let report = run(&client(OfflineGateway), &state("Ann: um I will send the agenda.\nBo: thanks"))
            .await
            .unwrap();
        assert_eq!(
            report.fallbacks,
            vec!["cleaned_transcript", "speakers", "quality_score"]
        );
        let out = transcript(report);
        assert_eq!(out.cleaned_transcript, "Ann: I will send the agenda.\nBo: thanks");
        assert_eq!(out.speakers.names(), vec!["Ann", "Bo"]);
        assert!(out.processing_notes.contains("Heuristics used for"));
    }

    #[tokio::test]
    async fn test_filler_only_input_cleans_to_empty() {
        let report = run(&client(OfflineGateway), &state("um uh um uh like basically"))
            .await
            .unwrap();
        assert_eq!(report.fallbacks, vec!["cleaned_transcript"]);
        let out = transcript(report);
        assert!(out.cleaned_transcript.is_empty());
        assert!(out.speakers.speakers.is_empty());
    }

    #[tokio::test]
    async fn test_authentication_failure_aborts() {
        let gateway = ScriptedGateway::failing(GatewayError::Authentication("invalid key".into()));
        let err = run(&client(gateway), &state("Ann: hello there everyone"))
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::Gateway(GatewayError::Authentication(_))));
    }
}
