use async_trait::async_trait;

use super::error::GatewayError;
use super::gateway::{CompletionRequest, LlmGateway};

/// Gateway for runs without network access.
///
/// Every call fails with a recoverable error, so each stage produces its
/// heuristic result.
pub struct OfflineGateway;

#[async_trait]
impl LlmGateway for OfflineGateway {
    fn name(&self) -> &str {
        "offline"
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<String, GatewayError> {
        Err(GatewayError::Network("offline mode, no LLM available".to_string()))
    }
}
