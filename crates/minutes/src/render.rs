//! Markdown templates for the minutes document and its sub-blocks.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::fallback::truncate_chars;
use crate::model::{ActionItem, Decision, ExtractionOutput, Metadata, SummaryOutput};
use crate::pipeline::PipelineState;

pub const NO_ACTION_ITEMS: &str = "No specific action items were identified in this meeting.";
pub const NO_DECISIONS: &str = "No formal decisions were recorded in this meeting.";

const MAX_TASK_CHARS: usize = 60;
const MAX_LISTED_ATTENDEES: usize = 6;
const WORDS_PER_MINUTE: usize = 200;

static RE_BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*|__(.+?)__").unwrap());
static RE_ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\s][^*]*?)\*|\b_([^_]+?)_\b").unwrap());

/// `date` from the metadata, or today's date.
pub fn meeting_date(metadata: &Metadata) -> String {
    metadata
        .get("date")
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .map(String::from)
        .unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string())
}

/// Meeting type from the metadata, then from the analysed context.
pub fn meeting_type(metadata: &Metadata, extraction: Option<&ExtractionOutput>) -> String {
    metadata
        .get("meeting_type")
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(String::from)
        .or_else(|| extraction.map(|e| e.context.meeting_type.clone()))
        .unwrap_or_else(|| "Meeting".to_string())
}

/// Attendees listed in the metadata (comma separated), else the analysed ones.
pub fn attendees(metadata: &Metadata, extraction: Option<&ExtractionOutput>) -> Vec<String> {
    let listed: Vec<String> = metadata
        .get("attendees")
        .map(|a| {
            a.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    if listed.is_empty() {
        extraction
            .map(|e| e.context.attendees.clone())
            .unwrap_or_default()
    } else {
        listed
    }
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

fn footer() -> String {
    format!(
        "---\n*These minutes were generated automatically on {}.*",
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    )
}

// ── Sub-blocks ──

pub fn action_items_table(items: &[ActionItem]) -> String {
    if items.is_empty() {
        return NO_ACTION_ITEMS.to_string();
    }

    let mut lines = vec![
        "| Task | Assignee | Due Date | Priority | Status |".to_string(),
        "|------|----------|----------|----------|--------|".to_string(),
    ];
    for item in items {
        lines.push(format!(
            "| {} | {} | {} | {} | {} |",
            escape_cell(&truncate_chars(&item.task, MAX_TASK_CHARS)),
            escape_cell(&item.assignee),
            escape_cell(&item.deadline),
            capitalize_word(item.priority.as_str()),
            capitalize_word(&item.status),
        ));
    }
    lines.join("\n")
}

fn capitalize_word(s: &str) -> String {
    crate::fallback::capitalize(s)
}

pub fn decisions_list(decisions: &[Decision]) -> String {
    if decisions.is_empty() {
        return NO_DECISIONS.to_string();
    }

    decisions
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let mut block = format!("### {}. {}\n**Context:** {}", i + 1, d.decision, d.context);
            if d.rationale != "not specified" && !d.rationale.is_empty() {
                block.push_str(&format!("\n**Rationale:** {}", d.rationale));
            }
            if d.implementation_date != "not specified" && !d.implementation_date.is_empty() {
                block.push_str(&format!("\n**Implementation:** {}", d.implementation_date));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_attendee_names(attendees: &[String]) -> String {
    if attendees.is_empty() {
        return "Not recorded".to_string();
    }
    if attendees.len() > MAX_LISTED_ATTENDEES {
        format!(
            "{} and {} others",
            attendees[..MAX_LISTED_ATTENDEES].join(", "),
            attendees.len() - MAX_LISTED_ATTENDEES
        )
    } else {
        attendees.join(", ")
    }
}

/// Date, optional time and duration, and the attendee line.
pub fn attendees_block(attendees: &[String], metadata: &Metadata) -> String {
    let mut lines = vec![
        "## Meeting Information".to_string(),
        format!("**Date:** {}", meeting_date(metadata)),
    ];
    if let Some(time) = metadata.get("start_time").filter(|t| !t.trim().is_empty()) {
        lines.push(format!("**Time:** {}", time.trim()));
    }
    if let Some(duration) = metadata.get("duration").filter(|d| !d.trim().is_empty()) {
        lines.push(format!("**Duration:** {}", duration.trim()));
    }
    lines.push(format!("**Attendees:** {}", format_attendee_names(attendees)));
    lines.join("\n")
}

// ── Whole documents ──

/// Minutes assembled directly from the earlier stage outputs.
pub fn fallback_document(
    summary: &SummaryOutput,
    extraction: &ExtractionOutput,
    metadata: &Metadata,
) -> String {
    let title = meeting_type(metadata, Some(extraction));
    let people = attendees(metadata, Some(extraction));

    let actions = if extraction.action_items.is_empty() {
        NO_ACTION_ITEMS.to_string()
    } else {
        let mut rows = vec![
            "| Task | Assignee | Due Date | Priority |".to_string(),
            "|------|----------|----------|----------|".to_string(),
        ];
        rows.extend(extraction.action_items.iter().map(|item| {
            format!(
                "| {} | {} | {} | {} |",
                escape_cell(&item.task),
                escape_cell(&item.assignee),
                escape_cell(&item.deadline),
                capitalize_word(item.priority.as_str())
            )
        }));
        rows.join("\n")
    };

    let decisions = if extraction.decisions.is_empty() {
        NO_DECISIONS.to_string()
    } else {
        extraction
            .decisions
            .iter()
            .enumerate()
            .map(|(i, d)| format!("{}. {}", i + 1, d.decision))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "# {title} Minutes\n\n\
         **Date:** {date}\n\
         **Attendees:** {attendees}\n\n\
         ## Executive Summary\n{summary}\n\n\
         ## Meeting Overview\n{overview}\n\n\
         ## Action Items\n{actions}\n\n\
         ## Decisions\n{decisions}\n\n\
         ## Next Steps\n{next_steps}\n\n\
         {footer}",
        title = title,
        date = meeting_date(metadata),
        attendees = format_attendee_names(&people),
        summary = summary.executive_summary,
        overview = summary.meeting_overview,
        actions = actions,
        decisions = decisions,
        next_steps = summary.next_steps,
        footer = footer(),
    )
}

pub fn fallback_sections(
    summary: &SummaryOutput,
    extraction: &ExtractionOutput,
    metadata: &Metadata,
) -> BTreeMap<String, String> {
    let header = format!(
        "# {} Minutes\n\n**Date:** {}",
        meeting_type(metadata, Some(extraction)),
        meeting_date(metadata)
    );

    BTreeMap::from([
        ("header".to_string(), header),
        ("summary".to_string(), summary.executive_summary.clone()),
        ("overview".to_string(), summary.meeting_overview.clone()),
        ("outcomes".to_string(), summary.key_outcomes.clone()),
        ("next_steps".to_string(), summary.next_steps.clone()),
    ])
}

/// Placeholder for input too short to hold a meeting.
pub fn insufficient_content_document(metadata: &Metadata) -> String {
    format!(
        "# Meeting Minutes\n\n\
         **Date:** {}\n\n\
         ## Notice\n\
         The transcript provided did not contain enough content to prepare meeting minutes. \
         Please supply a fuller record of the discussion and generate the minutes again.\n\n\
         {}",
        meeting_date(metadata),
        footer()
    )
}

pub fn error_document(message: &str, metadata: &Metadata) -> String {
    format!(
        "# Meeting Minutes - Processing Error\n\n\
         **Date:** {}\n\n\
         ## Notice\n\
         The minutes for this meeting could not be completed. Processing stopped with the following error:\n\n\
         > {}\n\n\
         Please review the transcript and the service configuration, then try again.\n\n\
         {}",
        meeting_date(metadata),
        message.replace('\n', " "),
        footer()
    )
}

// ── Plain text ──

fn is_table_separator(line: &str) -> bool {
    line.starts_with('|') && line.chars().all(|c| matches!(c, '|' | '-' | ':' | ' '))
}

/// Strips Markdown formatting for plain-text consumers.
pub fn export_as_text(markdown: &str) -> String {
    let mut out = Vec::new();

    for line in markdown.lines() {
        let trimmed = line.trim();

        if trimmed == "---" || is_table_separator(trimmed) {
            continue;
        }

        let line = if trimmed.starts_with('|') {
            trimmed
                .replace("\\|", "\u{0}")
                .trim_matches('|')
                .split('|')
                .map(|cell| cell.trim().replace('\u{0}', "|"))
                .collect::<Vec<_>>()
                .join("  ")
        } else if trimmed.starts_with('#') {
            trimmed.trim_start_matches('#').trim_start().to_string()
        } else {
            line.to_string()
        };

        let line = RE_BOLD.replace_all(&line, "$1$2");
        let line = RE_ITALIC.replace_all(&line, "$1$2");
        out.push(line.into_owned());
    }

    out.join("\n").trim().to_string()
}

// ── Statistics ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinutesStatistics {
    pub characters: usize,
    pub words: usize,
    pub lines: usize,
    pub action_items: usize,
    pub decisions: usize,
    pub key_points: usize,
    pub sections: usize,
    pub reading_time_minutes: usize,
}

impl MinutesStatistics {
    pub fn from_state(state: &PipelineState) -> Self {
        let text = state.formatted_minutes().unwrap_or_default();
        let words = text.split_whitespace().count();

        Self {
            characters: text.chars().count(),
            words,
            lines: text.lines().count(),
            action_items: state.extraction.as_ref().map_or(0, |e| e.action_items.len()),
            decisions: state.extraction.as_ref().map_or(0, |e| e.decisions.len()),
            key_points: state.extraction.as_ref().map_or(0, |e| e.key_points.len()),
            sections: state.minutes.as_ref().map_or(0, |m| {
                m.sections.values().filter(|v| !v.trim().is_empty()).count()
            }),
            reading_time_minutes: words.div_ceil(WORDS_PER_MINUTE).max(1),
        }
    }
}
