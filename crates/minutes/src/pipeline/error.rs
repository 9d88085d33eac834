use thiserror::Error;

use super::state::ErrorKind;
use crate::llm::GatewayError;

/// Failure of a stage, recorded in the state by the sequencer.
#[derive(Error, Debug)]
pub enum StageError {
    #[error("Missing required data: [{}]", .missing.join(", "))]
    MissingDependencies { missing: Vec<&'static str> },

    #[error("{0}")]
    Gateway(#[from] GatewayError),
}

impl StageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StageError::MissingDependencies { .. } => ErrorKind::DependencyError,
            StageError::Gateway(_) => ErrorKind::ProcessingError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dependencies_message() {
        let err = StageError::MissingDependencies {
            missing: vec!["cleaned_transcript", "extracted_info"],
        };
        assert_eq!(
            err.to_string(),
            "Missing required data: [cleaned_transcript, extracted_info]"
        );
        assert_eq!(err.kind(), ErrorKind::DependencyError);
    }

    #[test]
    fn test_gateway_failure_is_processing_error() {
        let err = StageError::from(GatewayError::Authentication("bad key".into()));
        assert_eq!(err.kind(), ErrorKind::ProcessingError);
        assert_eq!(err.to_string(), "Authentication failed: bad key");
    }
}
