use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI-compatible chat completions endpoint.
    #[default]
    OpenAi,
    /// No network access; every stage runs on its heuristic fallback.
    Offline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProvider,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_file: Option<String>,
    #[serde(default = "default_api_key_env_var")]
    pub api_key_env_var: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default = "default_organization_env_var")]
    pub organization_env_var: Option<String>,
    /// Timeout for the underlying HTTP request.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Deadline for one gateway call as seen by a stage. Expiry triggers the fallback.
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env_var() -> Option<String> {
    Some("OPENAI_API_KEY".to_string())
}

fn default_organization_env_var() -> Option<String> {
    Some("OPENAI_ORG_ID".to_string())
}

fn default_request_timeout() -> u64 {
    60
}

fn default_call_timeout() -> u64 {
    90
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            api_key_file: None,
            api_key_env_var: default_api_key_env_var(),
            organization: None,
            organization_env_var: default_organization_env_var(),
            request_timeout_secs: default_request_timeout(),
            call_timeout_secs: default_call_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Trimmed transcripts shorter than this skip the pipeline entirely.
    #[serde(default = "default_min_transcript_chars")]
    pub min_transcript_chars: usize,
}

fn default_min_transcript_chars() -> usize {
    10
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_transcript_chars: default_min_transcript_chars(),
        }
    }
}
