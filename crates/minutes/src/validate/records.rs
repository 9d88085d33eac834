//! Per-schema validators for each stage's sub-extractions.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use super::fields::{char_len, clamp_unit, list_from, number, string_list, text, text_or};
use super::json::{parse_json, Shape};
use super::ParseError;
use crate::model::{
    ActionItem, Deadline, Decision, MeetingContext, Priority, Sentiment, Speaker, SpeakerRoster,
    Urgency, ACTION_STATUS_PENDING,
};

pub const MAX_ACTION_ITEMS: usize = 15;
pub const MAX_DECISIONS: usize = 10;
pub const MAX_KEY_POINTS: usize = 12;
pub const MAX_DEADLINES: usize = 8;
pub const MAX_INSIGHTS: usize = 6;

/// Required text fields must be longer than this many characters.
const MIN_ITEM_TEXT: usize = 5;
const MIN_POINT_TEXT: usize = 10;

const DEFAULT_CONFIDENCE: f64 = 0.8;

static RE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)$").unwrap());

/// Array elements that are JSON objects; anything else is dropped.
fn objects(value: &Value) -> impl Iterator<Item = &Map<String, Value>> {
    value
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

pub fn parse_speakers(response: &str) -> Result<SpeakerRoster, ParseError> {
    let value = parse_json(response, Shape::Object)?;
    let obj = value.as_object().ok_or(ParseError::NoJson)?;

    let roles = obj.get("speaker_roles").and_then(Value::as_object);
    let contributions = obj.get("speaker_contributions").and_then(Value::as_object);

    let mut names = string_list(obj.get("identified_speakers"));
    if names.is_empty() {
        if let Some(contrib) = contributions {
            names = contrib.keys().map(|k| k.trim().to_string()).collect();
        }
    }

    let mut speakers: Vec<Speaker> = Vec::new();
    for name in names {
        if name.is_empty() || speakers.iter().any(|s| s.name == name) {
            continue;
        }
        let role = roles
            .and_then(|r| text(r.get(&name)))
            .unwrap_or_else(|| "Participant".to_string());
        let utterances = contributions
            .map(|c| string_list(c.get(&name)))
            .unwrap_or_default();
        speakers.push(Speaker {
            name,
            role,
            utterances,
        });
    }

    let confidence = number(obj.get("confidence_score"))
        .map(clamp_unit)
        .unwrap_or(DEFAULT_CONFIDENCE);

    Ok(SpeakerRoster {
        speakers,
        confidence,
    })
}

/// A reply that is a bare number, clamped to [0, 1].
///
/// Ratios, percentages and numbers embedded in prose are rejected.
pub fn parse_quality_score(response: &str) -> Result<f64, ParseError> {
    let body = parse_text(response)?;
    let body = body.trim_end_matches('.').trim();

    if !RE_NUMBER.is_match(body) {
        return Err(ParseError::InvalidNumber(body.chars().take(40).collect()));
    }
    body.parse::<f64>()
        .map(clamp_unit)
        .map_err(|_| ParseError::InvalidNumber(body.chars().take(40).collect()))
}

pub fn parse_action_items(response: &str) -> Result<Vec<ActionItem>, ParseError> {
    let value = parse_json(response, Shape::Array)?;

    let items: Vec<ActionItem> = objects(&value)
        .filter_map(|obj| {
            let task = text(obj.get("task")).filter(|t| char_len(t) > MIN_ITEM_TEXT)?;
            Some(ActionItem {
                task,
                assignee: text_or(obj, &["assignee", "owner"], "Unassigned"),
                deadline: text_or(obj, &["deadline", "due_date"], "not specified"),
                priority: Priority::normalize(&text_or(obj, &["priority"], "medium")),
                context: text_or(obj, &["context"], ""),
                status: ACTION_STATUS_PENDING.to_string(),
            })
        })
        .take(MAX_ACTION_ITEMS)
        .collect();

    debug!(count = items.len(), "Validated action items");
    Ok(items)
}

pub fn parse_decisions(response: &str) -> Result<Vec<Decision>, ParseError> {
    let value = parse_json(response, Shape::Array)?;

    Ok(objects(&value)
        .filter_map(|obj| {
            let decision = text(obj.get("decision")).filter(|d| char_len(d) > MIN_ITEM_TEXT)?;
            Some(Decision {
                decision,
                context: text_or(obj, &["context"], "Meeting discussion"),
                rationale: text_or(obj, &["rationale"], "not specified"),
                impact: text_or(obj, &["impact"], "Team/Project"),
                stakeholders: string_list(obj.get("stakeholders")),
                implementation_date: text_or(obj, &["implementation_date"], "not specified"),
            })
        })
        .take(MAX_DECISIONS)
        .collect())
}

pub fn parse_key_points(response: &str) -> Result<Vec<String>, ParseError> {
    let value = parse_json(response, Shape::Array)?;
    Ok(text_items(&value, MIN_POINT_TEXT, MAX_KEY_POINTS))
}

pub fn parse_meeting_context(response: &str) -> Result<MeetingContext, ParseError> {
    let value = parse_json(response, Shape::Object)?;
    let obj = value.as_object().ok_or(ParseError::NoJson)?;

    Ok(MeetingContext {
        meeting_type: text_or(obj, &["meeting_type"], "General Meeting"),
        attendees: list_from(obj, &["attendees"]),
        topics: list_from(obj, &["topics", "topics_discussed"]),
        sentiment: Sentiment::normalize(&text_or(obj, &["sentiment"], "neutral")),
        urgency: Urgency::normalize(&text_or(obj, &["urgency", "urgency_level"], "medium")),
        confidence: number(obj.get("confidence"))
            .map(clamp_unit)
            .unwrap_or(DEFAULT_CONFIDENCE),
        duration_estimate: text_or(
            obj,
            &["duration_estimate", "meeting_duration_estimate"],
            "not specified",
        ),
        key_themes: list_from(obj, &["key_themes"]),
    })
}

pub fn parse_deadlines(response: &str) -> Result<Vec<Deadline>, ParseError> {
    let value = parse_json(response, Shape::Array)?;

    Ok(objects(&value)
        .filter_map(|obj| {
            let deadline = text(obj.get("deadline")).filter(|d| char_len(d) > MIN_ITEM_TEXT)?;
            Some(Deadline {
                deadline,
                date: text_or(obj, &["date"], "not specified"),
                urgency: Urgency::normalize(&text_or(obj, &["urgency"], "medium")),
                context: text_or(obj, &["context"], ""),
                responsible_party: text_or(obj, &["responsible_party"], "Unassigned"),
            })
        })
        .take(MAX_DEADLINES)
        .collect())
}

pub fn parse_insights(response: &str) -> Result<Vec<String>, ParseError> {
    let value = parse_json(response, Shape::Array)?;
    Ok(text_items(&value, MIN_POINT_TEXT, MAX_INSIGHTS))
}

/// Group name to impact description. Descriptions must be longer than 10 characters.
pub fn parse_stakeholder_impact(response: &str) -> Result<BTreeMap<String, String>, ParseError> {
    let value = parse_json(response, Shape::Object)?;
    let obj = value.as_object().ok_or(ParseError::NoJson)?;

    Ok(obj
        .iter()
        .filter_map(|(group, v)| {
            let group = group.trim();
            let impact = text(Some(v)).filter(|i| char_len(i) > MIN_POINT_TEXT)?;
            (!group.is_empty()).then(|| (group.to_string(), impact))
        })
        .collect())
}

/// Named Markdown sections. Blank values are dropped.
pub fn parse_sections(response: &str) -> Result<BTreeMap<String, String>, ParseError> {
    let value = parse_json(response, Shape::Object)?;
    let obj = value.as_object().ok_or(ParseError::NoJson)?;

    Ok(obj
        .iter()
        .filter_map(|(name, v)| match v {
            Value::String(s) if !s.trim().is_empty() => Some((name.clone(), s.clone())),
            _ => None,
        })
        .collect())
}

/// Free text with an optional wrapping code fence removed.
pub fn parse_text(response: &str) -> Result<String, ParseError> {
    let mut body = response.trim();
    if let Some(rest) = body.strip_prefix("```") {
        let rest = rest.split_once('\n').map(|(_, r)| r).unwrap_or("");
        body = rest.trim_end().strip_suffix("```").unwrap_or(rest).trim();
    }

    if body.is_empty() {
        Err(ParseError::Empty)
    } else {
        Ok(body.to_string())
    }
}

fn text_items(value: &Value, min_len: usize, cap: usize) -> Vec<String> {
    value
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|v| text(Some(v)))
        .filter(|s| char_len(s) > min_len)
        .take(cap)
        .collect()
}
