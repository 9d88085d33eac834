use std::time::Instant;

use tracing::{error, info, info_span, warn, Instrument};

use crate::llm::LlmClient;
use crate::stages;

use super::error::StageError;
use super::progress::{ProgressEvent, ProgressReporter};
use super::state::{OverallStatus, PipelineState, Stage, StageStatus};

/// Runs the four stages in order over one state.
///
/// A stage only runs when its required inputs are present. The first failure
/// ends the run with status `error`; later stages stay `waiting`.
pub struct Sequencer {
    llm: LlmClient,
}

impl Sequencer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    pub fn gateway_name(&self) -> &str {
        self.llm.gateway_name()
    }

    pub async fn run(&self, state: PipelineState, progress: &dyn ProgressReporter) -> PipelineState {
        let span = info_span!("pipeline",
            run_id = %state.run_id,
            words = state.word_count,
            gateway = self.llm.gateway_name(),
        );
        self.run_stages(state, progress).instrument(span).await
    }

    async fn run_stages(
        &self,
        mut state: PipelineState,
        progress: &dyn ProgressReporter,
    ) -> PipelineState {
        state.status = OverallStatus::Processing;

        for stage in Stage::ALL {
            let missing = state.missing_inputs(stage);
            if !missing.is_empty() {
                let err = StageError::MissingDependencies { missing };
                warn!(stage = %stage, error = %err, "Stage dependencies not met");
                return self.fail(state, stage, err, progress);
            }

            state.current_stage = Some(stage);
            state.set_stage_status(stage, StageStatus::Processing);
            progress.report(ProgressEvent::StageStarted {
                stage,
                progress: state.progress(),
            });

            let started = Instant::now();
            let result = stages::run_stage(stage, &self.llm, &state)
                .instrument(info_span!("stage", stage = %stage))
                .await;
            let elapsed_secs = started.elapsed().as_secs_f64();
            state.stage_timings.insert(stage, elapsed_secs);

            let report = match result {
                Ok(report) => report,
                Err(err) => {
                    error!(stage = %stage, error = %err, "Stage failed");
                    return self.fail(state, stage, err, progress);
                }
            };

            let used_fallback = !report.fallbacks.is_empty();
            if used_fallback {
                state.add_warning(
                    stage,
                    format!("Heuristic fallback used for: {}", report.fallbacks.join(", ")),
                );
            }
            state.merge(report.output);
            state.set_stage_status(stage, StageStatus::Complete);
            if let Some(next) = stage.next() {
                state.set_stage_status(next, StageStatus::Pending);
            }

            info!(stage = %stage, elapsed_secs, used_fallback, "Stage complete");
            progress.report(ProgressEvent::StageCompleted {
                stage,
                progress: state.progress(),
                elapsed_secs,
                used_fallback,
            });
        }

        state.finish();
        info!(
            status = %state.status,
            total_secs = state.total_time.unwrap_or_default(),
            warnings = state.warnings.len(),
            "Pipeline finished"
        );
        progress.report(ProgressEvent::Finished {
            status: state.status,
            progress: state.progress(),
        });
        state
    }

    fn fail(
        &self,
        mut state: PipelineState,
        stage: Stage,
        err: StageError,
        progress: &dyn ProgressReporter,
    ) -> PipelineState {
        let message = err.to_string();
        state.record_error(stage, err.kind(), message.clone());
        state.set_stage_status(stage, StageStatus::Error);
        state.total_time = Some(state.stage_timings.values().sum());

        progress.report(ProgressEvent::StageFailed {
            stage,
            progress: state.progress(),
            error: message,
        });
        progress.report(ProgressEvent::Finished {
            status: state.status,
            progress: state.progress(),
        });
        state
    }
}
