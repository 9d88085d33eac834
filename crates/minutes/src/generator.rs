//! Entry point for turning a transcript into minutes.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{MinutesError, Result};
use crate::llm::{client_from_config, LlmClient, LlmGateway};
use crate::model::{Metadata, MinutesOutput};
use crate::pipeline::{
    ErrorKind, NoopProgress, Origin, OverallStatus, PipelineState, ProgressReporter, Sequencer,
    Stage, StageOutput, StageStatus,
};
use crate::render;
use crate::samples;

pub const INSUFFICIENT_CONTENT_WARNING: &str = "Empty or insufficient transcript provided";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Trimmed inputs shorter than this skip the pipeline.
    pub min_transcript_chars: usize,
    pub call_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            min_transcript_chars: 10,
            call_timeout: Duration::from_secs(90),
        }
    }
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            min_transcript_chars: config.pipeline.min_transcript_chars,
            call_timeout: Duration::from_secs(config.llm.call_timeout_secs),
        }
    }
}

/// Always returns a terminal state. Input-quality problems give a canned
/// `completed_with_warnings` state; infrastructure failures give `error`
/// with an error document in place of the minutes.
pub struct MinutesGenerator {
    sequencer: Sequencer,
    settings: PipelineSettings,
}

impl MinutesGenerator {
    pub fn new(gateway: Arc<dyn LlmGateway>, settings: PipelineSettings) -> Self {
        let llm = LlmClient::new(gateway, settings.call_timeout);
        Self {
            sequencer: Sequencer::new(llm),
            settings,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let llm = client_from_config(&config.llm)?;
        Ok(Self {
            sequencer: Sequencer::new(llm),
            settings: PipelineSettings::from(config),
        })
    }

    pub fn gateway_name(&self) -> &str {
        self.sequencer.gateway_name()
    }

    pub async fn run(&self, raw: &str, metadata: Metadata, input_method: &str) -> PipelineState {
        self.run_with_progress(raw, metadata, input_method, &NoopProgress)
            .await
    }

    pub async fn run_with_progress(
        &self,
        raw: &str,
        metadata: Metadata,
        input_method: &str,
        progress: &dyn ProgressReporter,
    ) -> PipelineState {
        let chars = raw.trim().chars().count();
        if chars < self.settings.min_transcript_chars {
            warn!(
                chars,
                min = self.settings.min_transcript_chars,
                "Transcript too short, returning placeholder minutes"
            );
            return insufficient_content_state(raw, metadata, input_method);
        }

        info!(chars, input_method, gateway = self.gateway_name(), "Generating minutes");

        let state = PipelineState::new(raw, metadata.clone(), input_method);
        let run_id = state.run_id;
        let outcome = AssertUnwindSafe(self.sequencer.run(state, progress))
            .catch_unwind()
            .await;

        let mut state = match outcome {
            Ok(state) => state,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(%run_id, panic = %message, "Pipeline panicked");
                let mut state = PipelineState::new(raw, metadata, input_method);
                state.run_id = run_id;
                state.record_error(
                    Origin::Workflow,
                    ErrorKind::ExecutionError,
                    format!("Unexpected failure: {}", message),
                );
                state
            }
        };

        if state.status == OverallStatus::Error && state.minutes.is_none() {
            attach_error_document(&mut state);
        }
        state
    }

    pub async fn run_sample(&self, key: &str) -> Result<PipelineState> {
        let sample = samples::get(key).ok_or_else(|| MinutesError::UnknownSample {
            key: key.to_string(),
            available: samples::keys().join(", "),
        })?;
        info!(sample = key, title = sample.title, "Running sample transcript");
        Ok(self
            .run(sample.transcript, sample.metadata(), "sample")
            .await)
    }
}

fn insufficient_content_state(raw: &str, metadata: Metadata, input_method: &str) -> PipelineState {
    let mut state = PipelineState::new(raw, metadata, input_method);

    for stage in Stage::ALL {
        let status = if stage == Stage::MinutesFormatter {
            StageStatus::Complete
        } else {
            StageStatus::Skipped
        };
        state.set_stage_status(stage, status);
    }
    state.add_warning(Origin::Workflow, INSUFFICIENT_CONTENT_WARNING);

    let people = render::attendees(&state.metadata, None);
    let minutes = MinutesOutput {
        formatted_minutes: render::insufficient_content_document(&state.metadata),
        sections: Default::default(),
        action_items_table: render::NO_ACTION_ITEMS.to_string(),
        decisions_list: render::NO_DECISIONS.to_string(),
        attendees_list: render::attendees_block(&people, &state.metadata),
    };
    state.merge(StageOutput::Minutes(minutes));
    state.finish();
    state
}

fn attach_error_document(state: &mut PipelineState) {
    let message = state
        .errors
        .last()
        .map(|e| e.message.clone())
        .unwrap_or_else(|| "unknown error".to_string());
    let document = render::error_document(&message, &state.metadata);
    state.merge(StageOutput::Minutes(MinutesOutput {
        formatted_minutes: document,
        ..Default::default()
    }));
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
