use std::time::Duration;

use thiserror::Error;

/// Failures reported by an [`LlmGateway`](super::LlmGateway).
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("LLM gateway is not configured: {0}")]
    NotConfigured(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("LLM call timed out after {0:?}")]
    Timeout(Duration),

    #[error("LLM returned an empty response")]
    EmptyResponse,

    #[error("Unexpected response from LLM: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// Fatal errors mean no call in this run can succeed; they abort the stage.
    /// Everything else degrades to the stage's heuristic fallback.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            GatewayError::NotConfigured(_) | GatewayError::Authentication(_)
        )
    }
}

/// Maps a non-success HTTP status to a gateway error.
pub fn parse_http_error(status: u16, body: &str, provider: &str) -> GatewayError {
    match status {
        401 => GatewayError::Authentication(format!("{}: Invalid API key", provider)),
        403 => GatewayError::Authentication(format!("{}: Access denied", provider)),
        429 => GatewayError::RateLimited(body.to_string()),
        400 | 404 | 422 => GatewayError::InvalidRequest(body.to_string()),
        500..=599 => GatewayError::Server {
            status,
            message: body.to_string(),
        },
        _ => GatewayError::InvalidResponse(format!("HTTP {}: {}", status, body)),
    }
}
