//! System prompts, one per sub-extraction, plus helpers that render earlier
//! stage outputs into user prompts.
//!
//! The system prompt doubles as the key a `ScriptedGateway` matches on, so
//! each constant must stay unique.

use crate::model::{ActionItem, Decision, Deadline};

// ── Stage 1 ──

pub const CLEAN_TRANSCRIPT: &str = "You are a transcript editor preparing meeting recordings for professional use.
Remove filler words (um, uh, you know, like, actually, basically) where they add no meaning, fix obvious transcription errors, and correct punctuation and capitalization.
Keep every speaker label exactly as written, followed by a colon, and keep the discussion in chronological order.
Do not add information that was not in the original. Return only the cleaned transcript.";

pub const IDENTIFY_SPEAKERS: &str = "You identify the speakers in a meeting transcript.
Respond with a JSON object only:
{\"identified_speakers\": [\"Name\"], \"speaker_roles\": {\"Name\": \"role\"}, \"speaker_contributions\": {\"Name\": [\"summary of what they said\"]}, \"confidence_score\": 0.0}";

pub const ASSESS_QUALITY: &str = "You rate how usable a cleaned meeting transcript is for writing minutes.
Consider clarity, completeness and whether speakers can be told apart.
Respond with a single number between 0.0 and 1.0 and nothing else.";

// ── Stage 2 ──

pub const EXTRACT_ACTION_ITEMS: &str = "You extract action items from meeting transcripts.
An action item is a concrete task someone committed to or was asked to do.
Respond with a JSON array only, each element shaped as:
{\"task\": \"...\", \"assignee\": \"...\", \"deadline\": \"...\", \"priority\": \"high|medium|low\", \"context\": \"...\"}
Use \"Unassigned\" when nobody owns the task and \"not specified\" when no deadline was given.";

pub const EXTRACT_DECISIONS: &str = "You identify decisions made during meetings.
Only include outcomes the participants agreed on, not proposals still under discussion.
Respond with a JSON array only, each element shaped as:
{\"decision\": \"...\", \"context\": \"...\", \"rationale\": \"...\", \"impact\": \"...\", \"stakeholders\": [\"...\"], \"implementation_date\": \"...\"}";

pub const EXTRACT_KEY_POINTS: &str = "You identify the key discussion points of a meeting.
Focus on information that matters to someone who did not attend: risks, problems, figures, timelines.
Respond with a JSON array of strings only.";

pub const ANALYZE_CONTEXT: &str = "You analyse meeting context and metadata.
Respond with a JSON object only:
{\"meeting_type\": \"...\", \"attendees\": [\"...\"], \"topics\": [\"...\"], \"sentiment\": \"positive|neutral|negative|mixed\", \"urgency\": \"low|medium|high\", \"confidence\": 0.0, \"duration_estimate\": \"...\", \"key_themes\": [\"...\"]}";

pub const EXTRACT_DEADLINES: &str = "You identify deadlines and time-sensitive commitments in meetings.
Respond with a JSON array only, each element shaped as:
{\"deadline\": \"what is due\", \"date\": \"...\", \"urgency\": \"low|medium|high\", \"context\": \"...\", \"responsible_party\": \"...\"}";

// ── Stage 3 ──

pub const EXECUTIVE_SUMMARY: &str = "You are an executive assistant writing summaries for senior leadership.
Write two or three short paragraphs covering purpose, outcomes and follow-up. Plain prose, no headings.";

pub const MEETING_OVERVIEW: &str = "You write a short overview of a meeting: who met, why, and what was covered.
One paragraph of plain prose.";

pub const KEY_OUTCOMES: &str = "You analyse the outcomes of a business meeting.
List the concrete results and their business implications as short bullet points.";

pub const NEXT_STEPS: &str = "You write the next steps section of meeting minutes.
List the follow-up actions with owners and timing as short bullet points.";

pub const STRATEGIC_INSIGHTS: &str = "You are a business analyst drawing strategic insights from a meeting.
Respond with a JSON array of short insight strings only.";

pub const STAKEHOLDER_IMPACT: &str = "You assess how a meeting's outcomes affect different stakeholder groups.
Respond with a JSON object only, mapping each group name to a one-sentence impact description.";

// ── Stage 4 ──

pub const FORMAT_MINUTES: &str = "You are an executive secretary producing formal meeting minutes.
Write a complete Markdown document with a title, date and attendees, executive summary, overview, action items table, decisions and next steps.
Use only the information supplied.";

pub const FORMAT_SECTIONS: &str = "You produce reusable sections of meeting minutes.
Respond with a JSON object only, with string values for the keys \"header\", \"summary\", \"overview\", \"outcomes\" and \"next_steps\". Values are Markdown.";

pub const FORMAT_ACTION_TABLE: &str = "You format action items as a Markdown table for meeting minutes.
Use the columns Task, Assignee, Due Date, Priority and Status. Return only the table.";

pub const FORMAT_DECISIONS: &str = "You format the decisions section of meeting minutes.
Number each decision as a level-three Markdown heading followed by its context. Return only the section body.";

pub const FORMAT_ATTENDEES: &str = "You write the header block of meeting minutes.
Include date, time and duration when known, and the list of attendees. Return Markdown only.";

// ── Prompt bodies ──

pub fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return "- none".to_string();
    }
    items
        .iter()
        .map(|i| format!("- {}", i))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn describe_action_items(items: &[ActionItem]) -> String {
    if items.is_empty() {
        return "- none".to_string();
    }
    items
        .iter()
        .map(|a| {
            format!(
                "- {} (owner: {}, due: {}, priority: {})",
                a.task, a.assignee, a.deadline, a.priority
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn describe_decisions(decisions: &[Decision]) -> String {
    if decisions.is_empty() {
        return "- none".to_string();
    }
    decisions
        .iter()
        .map(|d| format!("- {} (context: {}, impact: {})", d.decision, d.context, d.impact))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn describe_deadlines(deadlines: &[Deadline]) -> String {
    if deadlines.is_empty() {
        return "- none".to_string();
    }
    deadlines
        .iter()
        .map(|d| format!("- {} on {} ({})", d.deadline, d.date, d.responsible_party))
        .collect::<Vec<_>>()
        .join("\n")
}

/// First `max` characters of `text`, for prompts that only need a sample.
pub fn excerpt(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
