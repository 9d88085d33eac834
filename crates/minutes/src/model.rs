//! Typed records produced by the four pipeline stages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Free-form meeting metadata supplied by the caller (date, attendees, duration, type).
pub type Metadata = BTreeMap<String, String>;

/// Status every freshly extracted action item starts with.
pub const ACTION_STATUS_PENDING: &str = "pending";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Clamps free text to a legal priority. Anything unrecognised is `Medium`.
    pub fn normalize(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "high" => Priority::High,
            "low" => Priority::Low,
            _ => Priority::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
    Mixed,
}

impl Sentiment {
    pub fn normalize(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            "mixed" => Sentiment::Mixed,
            _ => Sentiment::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
            Sentiment::Mixed => "mixed",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

impl Urgency {
    pub fn normalize(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "low" => Urgency::Low,
            "high" => Urgency::High,
            _ => Urgency::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub task: String,
    pub assignee: String,
    /// Deadline as spoken in the meeting; not parsed into a date.
    pub deadline: String,
    pub priority: Priority,
    pub context: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub decision: String,
    pub context: String,
    pub rationale: String,
    pub impact: String,
    pub stakeholders: Vec<String>,
    pub implementation_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deadline {
    pub deadline: String,
    pub date: String,
    pub urgency: Urgency,
    pub context: String,
    pub responsible_party: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Speaker {
    pub name: String,
    pub role: String,
    pub utterances: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeakerRoster {
    pub speakers: Vec<Speaker>,
    /// Confidence in the roster, in [0, 1].
    pub confidence: f64,
}

impl SpeakerRoster {
    pub fn names(&self) -> Vec<String> {
        self.speakers.iter().map(|s| s.name.clone()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeetingContext {
    pub meeting_type: String,
    pub attendees: Vec<String>,
    pub topics: Vec<String>,
    pub sentiment: Sentiment,
    pub urgency: Urgency,
    pub confidence: f64,
    pub duration_estimate: String,
    pub key_themes: Vec<String>,
}

/// Stage 1 (`transcript_processor`) output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptOutput {
    pub cleaned_transcript: String,
    pub speakers: SpeakerRoster,
    pub quality_score: f64,
    pub processing_notes: String,
}

/// Stage 2 (`content_analyzer`) output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOutput {
    pub action_items: Vec<ActionItem>,
    pub decisions: Vec<Decision>,
    pub key_points: Vec<String>,
    pub context: MeetingContext,
    pub deadlines: Vec<Deadline>,
}

/// Stage 3 (`summary_writer`) output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryOutput {
    pub executive_summary: String,
    pub meeting_overview: String,
    pub key_outcomes: String,
    pub next_steps: String,
    pub insights: Vec<String>,
    pub stakeholder_impact: BTreeMap<String, String>,
}

/// Stage 4 (`minutes_formatter`) output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinutesOutput {
    pub formatted_minutes: String,
    pub sections: BTreeMap<String, String>,
    pub action_items_table: String,
    pub decisions_list: String,
    pub attendees_list: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_normalize() {
        assert_eq!(Priority::normalize("HIGH"), Priority::High);
        assert_eq!(Priority::normalize("  low "), Priority::Low);
        assert_eq!(Priority::normalize("urgent"), Priority::Medium);
        assert_eq!(Priority::normalize(""), Priority::Medium);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["HIGH", "Medium", "whatever", "low"] {
            let once = Priority::normalize(raw);
            assert_eq!(Priority::normalize(once.as_str()), once);
        }
        for raw in ["Positive", "MIXED", "angry"] {
            let once = Sentiment::normalize(raw);
            assert_eq!(Sentiment::normalize(once.as_str()), once);
        }
    }

    #[test]
    fn test_sentiment_and_urgency_defaults() {
        assert_eq!(Sentiment::normalize("ecstatic"), Sentiment::Neutral);
        assert_eq!(Urgency::normalize("asap"), Urgency::Medium);
        assert_eq!(Urgency::normalize("High"), Urgency::High);
    }

    #[test]
    fn test_enums_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        assert_eq!(serde_json::to_string(&Sentiment::Mixed).unwrap(), "\"mixed\"");
        assert_eq!(serde_json::to_string(&Urgency::Low).unwrap(), "\"low\"");
    }
}
