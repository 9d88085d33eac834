//! Behaviour of a full run through the generator.

mod common;

use std::sync::{Arc, Mutex};

use common::*;
use minutes::llm::{GatewayError, OfflineGateway, ScriptedGateway};
use minutes::model::Metadata;
use minutes::stages::prompts;
use minutes::pipeline::{
    ErrorKind, Origin, OverallStatus, ProgressEvent, ProgressReporter, Stage, StageStatus,
};
use minutes::{MinutesGenerator, PipelineSettings, INSUFFICIENT_CONTENT_WARNING};

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<ProgressEvent>>,
}

impl ProgressReporter for Recorder {
    fn report(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn offline() -> MinutesGenerator {
    MinutesGenerator::new(Arc::new(OfflineGateway), PipelineSettings::default())
}

// ── Input guard ──

const SHORT_INPUTS: &[&str] = &["", "   ", "\n\t\n", "Hi.", "ok thanks", "   123456789   "];

#[tokio::test]
async fn test_short_inputs_get_canned_state() {
    for input in SHORT_INPUTS {
        let state = offline().run(input, Metadata::new(), "text").await;

        assert_eq!(state.status, OverallStatus::CompletedWithWarnings, "input {:?}", input);
        assert!(state
            .stage_statuses()
            .values()
            .all(|s| matches!(s, StageStatus::Skipped | StageStatus::Complete)));
        assert!(!state.formatted_minutes().unwrap_or_default().is_empty());
        assert_eq!(state.warnings.len(), 1);
        assert_eq!(state.warnings[0].message, INSUFFICIENT_CONTENT_WARNING);
    }
}

#[tokio::test]
async fn test_short_input_never_calls_gateway() {
    let (generator, gateway) = generator_with(ScriptedGateway::new());
    let state = generator.run("Hi.", Metadata::new(), "text").await;

    assert_eq!(gateway.call_count(), 0);
    assert_eq!(state.progress(), 100);
    assert!(state.errors.is_empty());
}

// ── Successful runs ──

#[tokio::test]
async fn test_all_stages_succeed() {
    let (generator, gateway) = generator_with(well_formed_gateway(PLANNING_TRANSCRIPT));
    let metadata = MetadataBuilder::new().date("2024-09-12").build();
    let state = generator.run(PLANNING_TRANSCRIPT, metadata, "text").await;

    assert_eq!(state.status, OverallStatus::Completed, "{:?}", state.warnings);
    assert_eq!(state.progress(), 100);
    assert!(state.warnings.is_empty());
    assert!(state.errors.is_empty());
    assert!(state.is_complete());
    assert!(state.validate().is_empty());
    assert!(state.completed_at.is_some());
    assert_eq!(gateway.call_count(), 19);

    let extraction = state.extraction.as_ref().unwrap();
    assert_eq!(extraction.action_items.len(), 2);
    assert_eq!(extraction.action_items[0].status, "pending");
    assert_eq!(extraction.decisions.len(), 1);
    assert_eq!(extraction.deadlines[0].responsible_party, "Bo");

    let summary = state.processing_summary();
    assert!(summary.completed);
    assert_eq!(summary.stage_times.len(), 4);
    assert_eq!(summary.error_count, 0);
}

#[tokio::test]
async fn test_offline_run_completes_with_warnings() {
    let state = offline().run(PLANNING_TRANSCRIPT, Metadata::new(), "text").await;

    assert_eq!(state.status, OverallStatus::CompletedWithWarnings);
    assert_eq!(state.progress(), 100);
    assert!(state.errors.is_empty());
    assert_eq!(state.warnings.len(), 4);
    assert!(state
        .warnings
        .iter()
        .all(|w| w.message.starts_with("Heuristic fallback used for")));

    let extraction = state.extraction.as_ref().unwrap();
    let bo = extraction
        .action_items
        .iter()
        .find(|a| a.assignee == "Bo")
        .unwrap();
    assert!(bo.task.to_lowercase().contains("finish the migration plan"));
    assert!(extraction.action_items.iter().any(|a| a.assignee == "Cy"));
}

#[tokio::test]
async fn test_first_person_commitment_is_assigned_to_speaker() {
    let state = offline()
        .run("Sarah: I will finish the report by Friday.", Metadata::new(), "text")
        .await;

    let items = &state.extraction.as_ref().unwrap().action_items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].assignee, "Sarah");
    assert!(items[0].task.to_lowercase().contains("finish the report"));
    assert_eq!(items[0].deadline, "not specified");
    assert_eq!(items[0].priority.as_str(), "medium");
}

#[tokio::test]
async fn test_progress_is_monotonic() {
    let recorder = Recorder::default();
    let state = offline()
        .run_with_progress(PLANNING_TRANSCRIPT, Metadata::new(), "text", &recorder)
        .await;

    let audit: Vec<u8> = state.audit_log.iter().map(|e| e.progress).collect();
    assert!(audit.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(audit.last(), Some(&100));

    let reported: Vec<u8> = recorder
        .events
        .lock()
        .unwrap()
        .iter()
        .map(|e| match e {
            ProgressEvent::StageStarted { progress, .. }
            | ProgressEvent::StageCompleted { progress, .. }
            | ProgressEvent::StageFailed { progress, .. }
            | ProgressEvent::Finished { progress, .. } => *progress,
        })
        .collect();
    assert!(reported.windows(2).all(|w| w[0] <= w[1]), "{:?}", reported);
}

// ── Degradation ──

#[tokio::test]
async fn test_malformed_output_falls_back_per_field() {
    let gateway = ScriptedGateway::new()
        .reply(prompts::EXTRACT_DECISIONS, "Sorry, I cannot help with that.")
        .otherwise("plain text reply");
    let (generator, _) = generator_with(gateway);
    let state = generator.run(PLANNING_TRANSCRIPT, Metadata::new(), "text").await;

    assert_eq!(state.status, OverallStatus::CompletedWithWarnings);
    let extraction = state.extraction.as_ref().unwrap();
    assert_eq!(extraction.decisions.len(), 1);
    assert!(extraction.decisions[0]
        .decision
        .starts_with("Delay the mobile release"));
    assert!(state
        .warnings
        .iter()
        .any(|w| w.origin == Origin::Stage(Stage::ContentAnalyzer) && w.message.contains("decisions")));
}

#[tokio::test]
async fn test_filler_only_transcript_stops_at_analysis() {
    let state = offline()
        .run("um uh um uh like basically", Metadata::new(), "text")
        .await;

    assert_eq!(state.status, OverallStatus::Error);
    assert_eq!(state.errors.len(), 1);
    assert_eq!(state.errors[0].origin, Origin::Stage(Stage::ContentAnalyzer));
    assert_eq!(state.errors[0].kind, ErrorKind::DependencyError);
    assert_eq!(state.stage_status(Stage::SummaryWriter), StageStatus::Waiting);
    assert_eq!(state.stage_status(Stage::MinutesFormatter), StageStatus::Waiting);
    assert!(state
        .formatted_minutes()
        .unwrap_or_default()
        .contains("Missing required data"));
}

#[tokio::test]
async fn test_authentication_failure_is_single_stage_error() {
    let (generator, gateway) = generator_with(ScriptedGateway::failing(
        GatewayError::Authentication("invalid API key".into()),
    ));
    let state = generator.run(PLANNING_TRANSCRIPT, Metadata::new(), "text").await;

    assert_eq!(state.status, OverallStatus::Error);
    assert_eq!(state.errors.len(), 1);
    assert_eq!(state.errors[0].origin, Origin::Stage(Stage::TranscriptProcessor));
    assert_eq!(state.errors[0].kind, ErrorKind::ProcessingError);
    assert!(!state.errors[0].recoverable);
    for stage in [Stage::ContentAnalyzer, Stage::SummaryWriter, Stage::MinutesFormatter] {
        assert_eq!(state.stage_status(stage), StageStatus::Waiting);
    }
    assert_eq!(gateway.call_count(), 1);
    assert!(state
        .formatted_minutes()
        .unwrap_or_default()
        .contains("invalid API key"));
}

#[tokio::test]
async fn test_state_serializes_to_json() {
    let state = offline().run(PLANNING_TRANSCRIPT, Metadata::new(), "text").await;
    let json = serde_json::to_value(&state).unwrap();

    assert_eq!(json["status"], "completed_with_warnings");
    assert_eq!(json["warnings"][0]["origin"], "transcript_processor");
    assert!(json["minutes"]["formatted_minutes"].is_string());
}
