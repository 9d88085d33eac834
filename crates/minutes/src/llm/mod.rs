pub mod error;
pub mod gateway;
pub mod offline;
pub mod openai;
pub mod scripted;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::{LlmConfig, LlmProvider};
use crate::error::Result;

pub use error::{parse_http_error, GatewayError};
pub use gateway::{ChatMessage, CompletionRequest, LlmClient, LlmGateway, Role};
pub use offline::OfflineGateway;
pub use openai::OpenAiGateway;
pub use scripted::ScriptedGateway;

/// Builds the gateway selected by the config.
///
/// A missing or placeholder API key does not fail here: the OpenAI gateway is
/// still constructed and reports `NotConfigured` on first use, which the
/// pipeline records as a stage error. An unreadable key file fails here.
pub fn gateway_from_config(config: &LlmConfig) -> Result<Arc<dyn LlmGateway>> {
    match config.provider {
        LlmProvider::OpenAi => {
            info!(model = %config.model, base_url = %config.base_url, "Using OpenAI-compatible gateway");
            Ok(Arc::new(OpenAiGateway::from_config(config)?))
        }
        LlmProvider::Offline => {
            info!("Using offline gateway, all stages will use heuristic fallbacks");
            Ok(Arc::new(OfflineGateway))
        }
    }
}

/// Wraps a gateway with the per-call deadline from the config.
pub fn client_from_config(config: &LlmConfig) -> Result<LlmClient> {
    let gateway = gateway_from_config(config)?;
    Ok(LlmClient::new(
        gateway,
        Duration::from_secs(config.call_timeout_secs),
    ))
}
