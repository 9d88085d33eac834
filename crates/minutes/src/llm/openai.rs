//! OpenAI-compatible chat completions gateway.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::{parse_http_error, GatewayError};
use super::gateway::{ChatMessage, CompletionRequest, LlmGateway};
use crate::config::LlmConfig;
use crate::secrets::resolve_secret_optional;

/// Values shipped in `.env.example` style templates; treated as "no key".
const PLACEHOLDER_KEYS: &[&str] = &[
    "your_api_key_here",
    "your-api-key",
    "your_openai_api_key",
    "sk-your-key-here",
    "sk-...",
    "changeme",
];

pub struct OpenAiGateway {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
    organization: Option<String>,
}

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatResponseBody {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiGateway {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<SecretString>,
        organization: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| GatewayError::NotConfigured(format!("HTTP client: {}", e)))?;

        let api_key = api_key.filter(|key| !is_placeholder_key(key.expose_secret()));

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            organization,
        })
    }

    /// Resolves the API key and organization from the config's secret sources.
    ///
    /// A secret source that is configured but unreadable fails here; an absent
    /// key only fails on the first call.
    pub fn from_config(config: &LlmConfig) -> crate::Result<Self> {
        let api_key = resolve_secret_optional(
            config.api_key.as_deref(),
            config.api_key_file.as_deref(),
            config.api_key_env_var.as_deref(),
        )?;

        if api_key.is_none() {
            warn!("No OpenAI API key configured, LLM calls will fail");
        }

        let organization = resolve_secret_optional(
            config.organization.as_deref(),
            None,
            config.organization_env_var.as_deref(),
        )?
        .map(|org| org.expose_secret().to_string())
        .filter(|org| !org.is_empty());

        Ok(Self::new(
            &config.base_url,
            &config.model,
            api_key,
            organization,
            Duration::from_secs(config.request_timeout_secs),
        )?)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

fn is_placeholder_key(key: &str) -> bool {
    let key = key.trim();
    key.is_empty() || PLACEHOLDER_KEYS.iter().any(|p| key.eq_ignore_ascii_case(p))
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, GatewayError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            GatewayError::NotConfigured(
                "OpenAI API key is missing or a placeholder; set OPENAI_API_KEY".to_string(),
            )
        })?;

        let body = ChatRequestBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_output_tokens,
        };

        let mut http_request = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", api_key.expose_secret()))
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(ref org) = self.organization {
            http_request = http_request.header("OpenAI-Organization", org);
        }

        let response = http_request.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Network(format!("request timed out: {}", e))
            } else {
                GatewayError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body_text = response
            .text()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(parse_http_error(status, &body_text, "openai"));
        }

        let parsed: ChatResponseBody = serde_json::from_str(&body_text)
            .map_err(|e| GatewayError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(GatewayError::EmptyResponse);
        }

        debug!(chars = content.len(), "OpenAI response received");
        Ok(content)
    }
}
