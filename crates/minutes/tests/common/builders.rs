//! Builders for test inputs.

#![allow(dead_code)]

use std::path::PathBuf;

use minutes::model::Metadata;
use serde_json::{json, Value};
use tempfile::TempDir;

/// Builder for meeting metadata.
#[derive(Default)]
pub struct MetadataBuilder {
    metadata: Metadata,
}

impl MetadataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date(self, date: &str) -> Self {
        self.with("date", date)
    }

    pub fn meeting_type(self, meeting_type: &str) -> Self {
        self.with("meeting_type", meeting_type)
    }

    pub fn duration(self, duration: &str) -> Self {
        self.with("duration", duration)
    }

    pub fn attendees(self, attendees: &[&str]) -> Self {
        self.with("attendees", &attendees.join(", "))
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> Metadata {
        self.metadata
    }
}

/// Builder for config documents, written to a temp dir on demand.
pub struct ConfigBuilder {
    value: Value,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            value: json!({ "version": "1.0" }),
        }
    }

    pub fn offline() -> Self {
        Self::new().provider("offline")
    }

    pub fn version(mut self, version: &str) -> Self {
        self.value["version"] = json!(version);
        self
    }

    pub fn provider(self, provider: &str) -> Self {
        self.llm("provider", json!(provider))
    }

    pub fn llm(mut self, key: &str, value: Value) -> Self {
        if self.value.get("llm").is_none() {
            self.value["llm"] = json!({});
        }
        self.value["llm"][key] = value;
        self
    }

    pub fn min_transcript_chars(mut self, chars: u64) -> Self {
        self.value["pipeline"] = json!({ "min_transcript_chars": chars });
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.value).unwrap()
    }

    pub fn to_yaml(&self) -> String {
        serde_yaml::to_string(&self.value).unwrap()
    }

    /// Writes the config as `config.<ext>` and returns the dir guard and path.
    pub fn write(&self, ext: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(format!("config.{}", ext));
        let content = if ext == "json" {
            self.to_json()
        } else {
            self.to_yaml()
        };
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
