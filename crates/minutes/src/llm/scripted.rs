//! Deterministic gateway that answers from a script.
//!
//! Replies are keyed on the request's system prompt, so each sub-extraction
//! of a stage can be given its own canned response. Useful for tests and for
//! demonstrating the pipeline without network access.

use std::sync::Mutex;

use async_trait::async_trait;

use super::error::GatewayError;
use super::gateway::{CompletionRequest, LlmGateway};

type Reply = Result<String, GatewayError>;

pub struct ScriptedGateway {
    rules: Vec<(String, Reply)>,
    default_reply: Reply,
    calls: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    /// Unmatched requests fail with a recoverable `InvalidResponse`.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            default_reply: Err(GatewayError::InvalidResponse("no scripted reply".to_string())),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every request fails with `error`.
    pub fn failing(error: GatewayError) -> Self {
        Self::new().otherwise_fail(error)
    }

    /// Replies `text` to requests whose system prompt equals `system_prompt`.
    pub fn reply(mut self, system_prompt: &str, text: impl Into<String>) -> Self {
        self.rules.push((system_prompt.to_string(), Ok(text.into())));
        self
    }

    /// Fails requests whose system prompt equals `system_prompt`.
    pub fn fail(mut self, system_prompt: &str, error: GatewayError) -> Self {
        self.rules.push((system_prompt.to_string(), Err(error)));
        self
    }

    pub fn otherwise(mut self, text: impl Into<String>) -> Self {
        self.default_reply = Ok(text.into());
        self
    }

    pub fn otherwise_fail(mut self, error: GatewayError) -> Self {
        self.default_reply = Err(error);
        self
    }

    /// System prompts of all requests seen so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl Default for ScriptedGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, GatewayError> {
        let system = request.system_prompt().unwrap_or_default().to_string();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(system.clone());
        }

        self.rules
            .iter()
            .find(|(prompt, _)| *prompt == system)
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| self.default_reply.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_by_system_prompt() {
        let gateway = ScriptedGateway::new()
            .reply("a", "first")
            .fail("b", GatewayError::RateLimited("later".into()))
            .otherwise("fallthrough");

        let a = gateway.complete(CompletionRequest::new("a", "x")).await;
        let b = gateway.complete(CompletionRequest::new("b", "x")).await;
        let c = gateway.complete(CompletionRequest::new("c", "x")).await;

        assert_eq!(a.unwrap(), "first");
        assert!(matches!(b, Err(GatewayError::RateLimited(_))));
        assert_eq!(c.unwrap(), "fallthrough");
        assert_eq!(gateway.calls(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_failing_gateway() {
        let gateway = ScriptedGateway::failing(GatewayError::Authentication("bad key".into()));
        let err = gateway
            .complete(CompletionRequest::new("anything", "x"))
            .await
            .unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(gateway.call_count(), 1);
    }
}
