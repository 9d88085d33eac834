pub mod error;
pub mod progress;
pub mod runner;
pub mod state;

pub use error::StageError;
pub use progress::{BroadcastProgress, NoopProgress, ProgressEvent, ProgressReporter, RunProgressEvent};
pub use runner::Sequencer;
pub use state::{
    AuditEntry, ErrorKind, ErrorRecord, Origin, OverallStatus, PipelineState, ProcessingSummary,
    Stage, StageOutput, StageStatus, Warning,
};
