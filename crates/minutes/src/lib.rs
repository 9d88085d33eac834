pub mod config;
pub mod error;
pub mod fallback;
pub mod generator;
pub mod llm;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod samples;
pub mod secrets;
pub mod stages;
pub mod validate;

pub use config::{load_config, load_or_default, Config, LlmProvider};
pub use error::{ConfigError, MinutesError, Result};
pub use generator::{MinutesGenerator, PipelineSettings, INSUFFICIENT_CONTENT_WARNING};
pub use llm::{GatewayError, LlmClient, LlmGateway, OfflineGateway, OpenAiGateway, ScriptedGateway};
pub use model::Metadata;
pub use pipeline::{
    BroadcastProgress, NoopProgress, OverallStatus, PipelineState, ProgressReporter,
    RunProgressEvent, Stage, StageStatus,
};
pub use render::{export_as_text, MinutesStatistics};
pub use secrets::{resolve_secret, resolve_secret_optional, SecretError};
