//! The completion capability the pipeline depends on.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::GatewayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// One completion call: ordered messages plus sampling parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_output_tokens: Option<u32>,
}

impl CompletionRequest {
    /// The usual shape: one system prompt, one user prompt.
    pub fn new(system: &str, user: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature: 0.1,
            max_output_tokens: None,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    /// Content of the first system message, if any.
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
    }
}

/// Sends messages to a language model and returns the generated text.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> Result<String, GatewayError>;
}

/// Shared gateway handle with a per-call deadline.
///
/// Each pipeline run owns its client; cloning only bumps the `Arc`.
#[derive(Clone)]
pub struct LlmClient {
    gateway: Arc<dyn LlmGateway>,
    call_timeout: Duration,
}

impl LlmClient {
    pub fn new(gateway: Arc<dyn LlmGateway>, call_timeout: Duration) -> Self {
        Self {
            gateway,
            call_timeout,
        }
    }

    pub fn gateway_name(&self) -> &str {
        self.gateway.name()
    }

    /// Calls the gateway. Expiry of the deadline is reported as `GatewayError::Timeout`.
    pub async fn complete(&self, request: CompletionRequest) -> Result<String, GatewayError> {
        debug!(
            gateway = self.gateway.name(),
            messages = request.messages.len(),
            temperature = request.temperature,
            "LLM call"
        );
        match tokio::time::timeout(self.call_timeout, self.gateway.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout(self.call_timeout)),
        }
    }
}
