//! The record threaded through the four stages.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::model::{ExtractionOutput, Metadata, MinutesOutput, SummaryOutput, TranscriptOutput};

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    TranscriptProcessor,
    ContentAnalyzer,
    SummaryWriter,
    MinutesFormatter,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::TranscriptProcessor,
        Stage::ContentAnalyzer,
        Stage::SummaryWriter,
        Stage::MinutesFormatter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::TranscriptProcessor => "transcript_processor",
            Stage::ContentAnalyzer => "content_analyzer",
            Stage::SummaryWriter => "summary_writer",
            Stage::MinutesFormatter => "minutes_formatter",
        }
    }

    /// Human-readable activity shown in progress output.
    pub fn activity(&self) -> &'static str {
        match self {
            Stage::TranscriptProcessor => "Cleaning transcript and identifying speakers",
            Stage::ContentAnalyzer => "Extracting action items, decisions and key points",
            Stage::SummaryWriter => "Writing executive summary",
            Stage::MinutesFormatter => "Formatting meeting minutes",
        }
    }

    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::TranscriptProcessor => Some(Stage::ContentAnalyzer),
            Stage::ContentAnalyzer => Some(Stage::SummaryWriter),
            Stage::SummaryWriter => Some(Stage::MinutesFormatter),
            Stage::MinutesFormatter => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| format!("unknown stage '{}'", s))
    }
}

/// Where a warning or error was raised: a stage, or the facade around the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Origin {
    Stage(Stage),
    Workflow,
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::Stage(stage) => write!(f, "{}", stage),
            Origin::Workflow => write!(f, "workflow"),
        }
    }
}

impl From<Origin> for String {
    fn from(origin: Origin) -> Self {
        origin.to_string()
    }
}

impl TryFrom<String> for Origin {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == "workflow" {
            Ok(Origin::Workflow)
        } else {
            value.parse().map(Origin::Stage)
        }
    }
}

impl From<Stage> for Origin {
    fn from(stage: Stage) -> Self {
        Origin::Stage(stage)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Initialized,
    Processing,
    Completed,
    CompletedWithWarnings,
    Error,
}

impl OverallStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OverallStatus::Completed | OverallStatus::CompletedWithWarnings | OverallStatus::Error
        )
    }
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OverallStatus::Initialized => "initialized",
            OverallStatus::Processing => "processing",
            OverallStatus::Completed => "completed",
            OverallStatus::CompletedWithWarnings => "completed_with_warnings",
            OverallStatus::Error => "error",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Waiting,
    Pending,
    Processing,
    Complete,
    Error,
    Skipped,
}

impl StageStatus {
    /// Progress points a stage in this status contributes. A running stage rounds down to 0.
    fn progress_points(&self) -> u8 {
        match self {
            StageStatus::Complete | StageStatus::Skipped => 25,
            _ => 0,
        }
    }
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StageStatus::Waiting => "waiting",
            StageStatus::Pending => "pending",
            StageStatus::Processing => "processing",
            StageStatus::Complete => "complete",
            StageStatus::Error => "error",
            StageStatus::Skipped => "skipped",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A stage's required input was missing.
    DependencyError,
    /// A stage body failed.
    ProcessingError,
    /// Failure outside any stage body, caught at the facade.
    ExecutionError,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::DependencyError => "dependency_error",
            ErrorKind::ProcessingError => "processing_error",
            ErrorKind::ExecutionError => "execution_error",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub origin: Origin,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub origin: Origin,
    pub kind: ErrorKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub recoverable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub stage: Stage,
    pub status: StageStatus,
    pub progress: u8,
}

/// Result of one stage body, merged into the state by the sequencer.
#[derive(Debug, Clone)]
pub enum StageOutput {
    Transcript(TranscriptOutput),
    Extraction(ExtractionOutput),
    Summary(SummaryOutput),
    Minutes(MinutesOutput),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingSummary {
    pub status: OverallStatus,
    pub progress: u8,
    pub current_stage: Option<Stage>,
    pub total_time: f64,
    pub stage_times: BTreeMap<Stage, f64>,
    pub error_count: usize,
    pub warning_count: usize,
    pub word_count: usize,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    pub run_id: Uuid,

    // Input, fixed at creation
    pub raw_transcript: String,
    pub metadata: Metadata,
    pub input_method: String,
    pub word_count: usize,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,

    // Stage outputs, each written once by its stage
    pub transcript: Option<TranscriptOutput>,
    pub extraction: Option<ExtractionOutput>,
    pub summary: Option<SummaryOutput>,
    pub minutes: Option<MinutesOutput>,

    // Bookkeeping
    pub status: OverallStatus,
    pub current_stage: Option<Stage>,
    stage_statuses: BTreeMap<Stage, StageStatus>,
    progress: u8,
    pub warnings: Vec<Warning>,
    pub errors: Vec<ErrorRecord>,
    pub stage_timings: BTreeMap<Stage, f64>,
    pub total_time: Option<f64>,
    pub audit_log: Vec<AuditEntry>,
}

impl PipelineState {
    pub fn new(raw_transcript: &str, metadata: Metadata, input_method: &str) -> Self {
        let stage_statuses = Stage::ALL
            .into_iter()
            .map(|stage| {
                let status = if stage == Stage::TranscriptProcessor {
                    StageStatus::Pending
                } else {
                    StageStatus::Waiting
                };
                (stage, status)
            })
            .collect();

        Self {
            run_id: Uuid::new_v4(),
            raw_transcript: raw_transcript.to_string(),
            metadata,
            input_method: input_method.to_string(),
            word_count: raw_transcript.split_whitespace().count(),
            created_at: Utc::now(),
            completed_at: None,
            transcript: None,
            extraction: None,
            summary: None,
            minutes: None,
            status: OverallStatus::Initialized,
            current_stage: None,
            stage_statuses,
            progress: 0,
            warnings: Vec::new(),
            errors: Vec::new(),
            stage_timings: BTreeMap::new(),
            total_time: None,
            audit_log: Vec::new(),
        }
    }

    pub fn stage_status(&self, stage: Stage) -> StageStatus {
        self.stage_statuses
            .get(&stage)
            .copied()
            .unwrap_or(StageStatus::Waiting)
    }

    pub fn stage_statuses(&self) -> &BTreeMap<Stage, StageStatus> {
        &self.stage_statuses
    }

    /// Overall progress, derived from the stage statuses.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Sets a stage status, recomputes progress and appends an audit entry.
    pub fn set_stage_status(&mut self, stage: Stage, status: StageStatus) {
        self.stage_statuses.insert(stage, status);
        self.progress = self.progress.max(compute_progress(&self.stage_statuses));
        self.audit_log.push(AuditEntry {
            timestamp: Utc::now(),
            stage,
            status,
            progress: self.progress,
        });
    }

    pub fn add_warning(&mut self, origin: impl Into<Origin>, message: impl Into<String>) {
        self.warnings.push(Warning {
            origin: origin.into(),
            message: message.into(),
            timestamp: Utc::now(),
        });
    }

    /// Records a non-recoverable error. The run is over once this is called.
    pub fn record_error(
        &mut self,
        origin: impl Into<Origin>,
        kind: ErrorKind,
        message: impl Into<String>,
    ) {
        self.errors.push(ErrorRecord {
            origin: origin.into(),
            kind,
            message: message.into(),
            timestamp: Utc::now(),
            recoverable: false,
        });
        self.status = OverallStatus::Error;
    }

    /// Stores a stage's output. Existing outputs are never replaced.
    pub fn merge(&mut self, output: StageOutput) {
        fn fill<T>(slot: &mut Option<T>, value: T, name: &str) {
            if slot.is_some() {
                warn!("Ignoring second {} output, stage outputs are write-once", name);
            } else {
                *slot = Some(value);
            }
        }

        match output {
            StageOutput::Transcript(out) => fill(&mut self.transcript, out, "transcript"),
            StageOutput::Extraction(out) => fill(&mut self.extraction, out, "extraction"),
            StageOutput::Summary(out) => fill(&mut self.summary, out, "summary"),
            StageOutput::Minutes(out) => fill(&mut self.minutes, out, "minutes"),
        }
    }

    /// Names of the required inputs of `stage` that are missing or empty.
    pub fn missing_inputs(&self, stage: Stage) -> Vec<&'static str> {
        let mut missing = Vec::new();

        let has_cleaned = self
            .cleaned_transcript()
            .is_some_and(|t| !t.trim().is_empty());
        let has_summary = self
            .summary
            .as_ref()
            .is_some_and(|s| !s.executive_summary.trim().is_empty());

        match stage {
            Stage::TranscriptProcessor => {
                if self.raw_transcript.trim().is_empty() {
                    missing.push("raw_transcript");
                }
            }
            Stage::ContentAnalyzer => {
                if !has_cleaned {
                    missing.push("cleaned_transcript");
                }
            }
            Stage::SummaryWriter => {
                if !has_cleaned {
                    missing.push("cleaned_transcript");
                }
                if self.extraction.is_none() {
                    missing.push("extracted_info");
                }
            }
            Stage::MinutesFormatter => {
                if !has_cleaned {
                    missing.push("cleaned_transcript");
                }
                if self.extraction.is_none() {
                    missing.push("extracted_info");
                }
                if !has_summary {
                    missing.push("executive_summary");
                }
            }
        }

        missing
    }

    /// Marks a successful end of the pipeline.
    pub fn finish(&mut self) {
        self.status = if self.warnings.is_empty() {
            OverallStatus::Completed
        } else {
            OverallStatus::CompletedWithWarnings
        };
        self.completed_at = Some(Utc::now());
        self.total_time = Some(self.stage_timings.values().sum());
    }

    pub fn cleaned_transcript(&self) -> Option<&str> {
        self.transcript
            .as_ref()
            .map(|t| t.cleaned_transcript.as_str())
    }

    pub fn formatted_minutes(&self) -> Option<&str> {
        self.minutes.as_ref().map(|m| m.formatted_minutes.as_str())
    }

    pub fn has_blocking_errors(&self) -> bool {
        self.errors.iter().any(|e| !e.recoverable)
    }

    /// True when minutes exist, the run did not fail, and progress reached 100.
    pub fn is_complete(&self) -> bool {
        self.formatted_minutes().is_some()
            && self.status != OverallStatus::Error
            && self.progress == 100
    }

    pub fn processing_summary(&self) -> ProcessingSummary {
        ProcessingSummary {
            status: self.status,
            progress: self.progress,
            current_stage: self.current_stage,
            total_time: self
                .total_time
                .unwrap_or_else(|| self.stage_timings.values().sum()),
            stage_times: self.stage_timings.clone(),
            error_count: self.errors.len(),
            warning_count: self.warnings.len(),
            word_count: self.word_count,
            completed: self.is_complete(),
        }
    }

    /// Consistency checks. Returns one message per problem found.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.raw_transcript.is_empty() {
            problems.push("Raw transcript is required".to_string());
        }
        if self.progress > 100 {
            problems.push("Progress percentage cannot exceed 100".to_string());
        }
        if self.progress < compute_progress(&self.stage_statuses) {
            problems.push("Progress lags behind stage statuses".to_string());
        }
        if matches!(
            self.status,
            OverallStatus::Completed | OverallStatus::CompletedWithWarnings
        ) && !self.is_complete()
        {
            problems.push("Status marked complete but processing not finished".to_string());
        }
        if self.status == OverallStatus::Error && self.errors.is_empty() {
            problems.push("Status is error but no error was recorded".to_string());
        }

        problems
    }
}

fn compute_progress(statuses: &BTreeMap<Stage, StageStatus>) -> u8 {
    let points: u32 = statuses
        .values()
        .map(|s| u32::from(s.progress_points()))
        .sum();
    points.min(100) as u8
}
