//! Stage bodies. Each reads the state, calls the model once per
//! sub-extraction, and returns its output for the sequencer to merge.

pub mod analysis;
pub mod formatter;
pub mod prompts;
pub mod summary;
pub mod transcript;

use tracing::warn;

use crate::llm::{CompletionRequest, LlmClient};
use crate::pipeline::{Stage, StageError, StageOutput, PipelineState};
use crate::validate::ParseError;

/// What a stage body produced, and which of its fields came from heuristics.
#[derive(Debug, Clone)]
pub struct StageReport {
    pub output: StageOutput,
    pub fallbacks: Vec<&'static str>,
}

pub async fn run_stage(
    stage: Stage,
    llm: &LlmClient,
    state: &PipelineState,
) -> Result<StageReport, StageError> {
    match stage {
        Stage::TranscriptProcessor => transcript::run(llm, state).await,
        Stage::ContentAnalyzer => analysis::run(llm, state).await,
        Stage::SummaryWriter => summary::run(llm, state).await,
        Stage::MinutesFormatter => formatter::run(llm, state).await,
    }
}

/// Runs model calls for one stage and tracks which fields fell back.
pub(crate) struct Extractor<'a> {
    llm: &'a LlmClient,
    fallbacks: Vec<&'static str>,
}

impl<'a> Extractor<'a> {
    pub(crate) fn new(llm: &'a LlmClient) -> Self {
        Self {
            llm,
            fallbacks: Vec::new(),
        }
    }

    /// Asks the model and validates the reply with `parse`.
    ///
    /// Unusable replies and recoverable gateway failures yield `fallback()`.
    /// Fatal gateway failures abort the stage.
    pub(crate) async fn extract<T>(
        &mut self,
        field: &'static str,
        request: CompletionRequest,
        parse: impl FnOnce(&str) -> Result<T, ParseError>,
        fallback: impl FnOnce() -> T,
    ) -> Result<T, StageError> {
        match self.llm.complete(request).await {
            Ok(reply) => match parse(&reply) {
                Ok(value) => Ok(value),
                Err(e) => {
                    warn!(field, error = %e, "Model output rejected, using heuristic");
                    Ok(self.fall_back(field, fallback))
                }
            },
            Err(e) if e.is_fatal() => Err(e.into()),
            Err(e) => {
                warn!(field, error = %e, "Model call failed, using heuristic");
                Ok(self.fall_back(field, fallback))
            }
        }
    }

    /// Uses the heuristic without asking the model.
    pub(crate) fn fall_back<T>(&mut self, field: &'static str, fallback: impl FnOnce() -> T) -> T {
        self.fallbacks.push(field);
        fallback()
    }

    pub(crate) fn fallbacks(&self) -> &[&'static str] {
        &self.fallbacks
    }

    pub(crate) fn finish(self, output: StageOutput) -> StageReport {
        StageReport {
            output,
            fallbacks: self.fallbacks,
        }
    }
}
