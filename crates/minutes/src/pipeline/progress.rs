use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::state::{OverallStatus, Stage};

/// Events emitted by the sequencer while a run is in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    StageStarted {
        stage: Stage,
        progress: u8,
    },
    StageCompleted {
        stage: Stage,
        progress: u8,
        elapsed_secs: f64,
        used_fallback: bool,
    },
    StageFailed {
        stage: Stage,
        progress: u8,
        error: String,
    },
    Finished {
        status: OverallStatus,
        progress: u8,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for library callers and unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Serializable form of a [`ProgressEvent`] for channel subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunProgressEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    pub progress: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Forwards pipeline events to a broadcast channel.
///
/// Send errors (no subscribers) are ignored.
pub struct BroadcastProgress {
    sender: Arc<broadcast::Sender<RunProgressEvent>>,
}

impl BroadcastProgress {
    pub fn new(sender: Arc<broadcast::Sender<RunProgressEvent>>) -> Self {
        Self { sender }
    }

    fn send(&self, stage: Option<Stage>, progress: u8, message: String, error: Option<String>) {
        let _ = self.sender.send(RunProgressEvent {
            stage,
            progress,
            message,
            error,
            timestamp: Utc::now(),
        });
    }
}

impl ProgressReporter for BroadcastProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::StageStarted { stage, progress } => {
                self.send(Some(stage), progress, format!("{}...", stage.activity()), None);
            }
            ProgressEvent::StageCompleted {
                stage,
                progress,
                elapsed_secs,
                used_fallback,
            } => {
                let suffix = if used_fallback {
                    " (heuristic fallback)"
                } else {
                    ""
                };
                self.send(
                    Some(stage),
                    progress,
                    format!("{} finished in {:.2}s{}", stage, elapsed_secs, suffix),
                    None,
                );
            }
            ProgressEvent::StageFailed {
                stage,
                progress,
                error,
            } => {
                self.send(Some(stage), progress, format!("{} failed", stage), Some(error));
            }
            ProgressEvent::Finished { status, progress } => {
                self.send(None, progress, format!("Run {}", status), None);
            }
        }
    }
}
