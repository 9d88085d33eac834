//! Deterministic heuristics used when the model is unavailable or its output
//! cannot be validated.
//!
//! Everything here is a pure function of its arguments: no gateway access,
//! no I/O, and no panics on any input (including the empty string).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::model::{
    ActionItem, Deadline, Decision, ExtractionOutput, MeetingContext, Priority, Sentiment,
    Speaker, SpeakerRoster, Urgency, ACTION_STATUS_PENDING,
};

pub const MAX_FALLBACK_ACTION_ITEMS: usize = 10;
pub const MAX_FALLBACK_DECISIONS: usize = 8;
pub const MAX_FALLBACK_KEY_POINTS: usize = 8;

const FALLBACK_CONTEXT: &str = "Extracted using fallback method";

/// Shortest decision text kept, in characters (exclusive).
const MIN_DECISION_TEXT: usize = 5;

const KEY_POINT_KEYWORDS: &[&str] = &[
    "important",
    "key",
    "critical",
    "issue",
    "problem",
    "budget",
    "timeline",
];

/// Keyword buckets checked in order; the first whole-word hit names the meeting type.
const MEETING_TYPES: &[(&[&str], &str)] = &[
    (&["standup", "stand-up", "daily", "scrum"], "Daily Standup"),
    (&["client", "customer"], "Client Meeting"),
    (&["planning", "sprint", "roadmap"], "Planning Meeting"),
    (&["retrospective", "retro", "review"], "Review Meeting"),
    (&["board meeting", "board of directors"], "Board Meeting"),
];

/// Subjects that never name a person.
const NON_PERSON_SUBJECTS: &[&str] = &[
    "you", "they", "he", "she", "it", "this", "that", "there", "which", "who", "what", "someone",
    "somebody", "everyone", "anyone", "nobody", "one",
];

/// Words that continue the speaker's own sentence ("... and will review").
const CONTINUATIONS: &[&str] = &["and", "but", "or", "then", "so", "also"];

static RE_FILLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:u+m+|u+h+|erm|you know|basically|actually|literally)\b,?\s*").unwrap()
});
static RE_FILLER_LIKE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i),\s*like,").unwrap());
static RE_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static RE_SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" +([,.!?;:])").unwrap());
static RE_SPEAKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_ ]{0,39}?)\s*:\s*(.*)$").unwrap());
static RE_ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b([a-z][a-z0-9_]*)(?:\s+(?:will|should|must|needs? to|has to|have to|is going to|are going to)|'ll)\s+([^.!?\n]+)",
    )
    .unwrap()
});
static RE_DECISION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:we|they|the team|everyone)\s+(?:have\s+|had\s+)?(?:decided|agreed)\s+(?:to\s+|that\s+|on\s+|upon\s+)?([^.!?\n]+)",
    )
    .unwrap()
});
static RE_DECISION_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bdecision\s*[:\-]\s*([^.!?\n]+)").unwrap());
static RE_MEETING_TYPES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    MEETING_TYPES
        .iter()
        .map(|(keywords, label)| {
            let alternatives: Vec<String> = keywords.iter().map(|k| regex::escape(k)).collect();
            let pattern = format!(r"(?i)\b(?:{})s?\b", alternatives.join("|"));
            (Regex::new(&pattern).unwrap(), *label)
        })
        .collect()
});
static RE_DECISION_LETS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\blet'?s\s+(?:go with|prioritize|stick with)\s+([^.!?\n]+)").unwrap()
});

/// Splits a `Name: text` line into the speaker and the utterance.
pub fn split_speaker(line: &str) -> (Option<String>, &str) {
    if let Some(caps) = RE_SPEAKER.captures(line) {
        if let (Some(name), Some(body)) = (caps.get(1), caps.get(2)) {
            let name = name.as_str().trim();
            if !name.is_empty() && name.split_whitespace().count() <= 3 {
                return (Some(title_case(name)), body.as_str());
            }
        }
    }
    (None, line)
}

fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Uppercases the first character and leaves the rest alone.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ── Stage 1 ──

/// Removes filler words and redundant whitespace, keeping line structure.
/// Text without any alphanumeric content cleans to the empty string.
pub fn clean_transcript(raw: &str) -> String {
    let lines: Vec<String> = raw
        .lines()
        .map(|line| {
            let line = RE_FILLER.replace_all(line, "");
            let line = RE_FILLER_LIKE.replace_all(&line, ",");
            let line = RE_SPACES.replace_all(&line, " ");
            let line = RE_SPACE_BEFORE_PUNCT.replace_all(&line, "$1");
            line.trim().trim_start_matches([',', ';']).trim().to_string()
        })
        .filter(|line| has_content(line))
        .collect();

    lines.join("\n")
}

/// True when a line holds a word other than a bare "like".
fn has_content(line: &str) -> bool {
    line.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .any(|w| !w.is_empty() && !w.eq_ignore_ascii_case("like"))
}

/// Roster from `Name:` line prefixes, sorted by name.
pub fn identify_speakers(text: &str) -> SpeakerRoster {
    let mut utterances: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for line in text.lines() {
        if let (Some(name), body) = split_speaker(line) {
            let entry = utterances.entry(name).or_default();
            let body = body.trim();
            if !body.is_empty() {
                entry.push(body.to_string());
            }
        }
    }

    let confidence = if utterances.is_empty() { 0.0 } else { 0.7 };
    let speakers = utterances
        .into_iter()
        .map(|(name, utterances)| Speaker {
            name,
            role: "Participant".to_string(),
            utterances,
        })
        .collect();

    SpeakerRoster {
        speakers,
        confidence,
    }
}

pub fn quality_score(cleaned: &str, speaker_count: usize) -> f64 {
    let words = cleaned.split_whitespace().count();
    let mut score: f64 = 0.5;
    if (50..=2000).contains(&words) {
        score += 0.2;
    }
    if speaker_count > 0 {
        score += 0.2;
    }
    if !cleaned.trim().is_empty() {
        score += 0.1;
    }
    score.clamp(0.0, 1.0)
}

// ── Stage 2 ──

fn resolve_assignee(subject: &str, speaker: Option<&str>) -> String {
    let lower = subject.to_lowercase();
    match lower.as_str() {
        "i" => speaker.unwrap_or("Unassigned").to_string(),
        "we" => "Team".to_string(),
        s if CONTINUATIONS.contains(&s) => speaker.unwrap_or("Unassigned").to_string(),
        s if NON_PERSON_SUBJECTS.contains(&s) => "Unassigned".to_string(),
        _ => capitalize(subject),
    }
}

/// "<Name> will/should/needs to <task>" patterns, one item per match.
///
/// A `Name:` prefix on the line resolves first-person subjects to that speaker.
/// Deadlines are not parsed; priority is always medium.
pub fn action_items(text: &str) -> Vec<ActionItem> {
    let mut items = Vec::new();

    for line in text.lines() {
        let (speaker, body) = split_speaker(line);
        for caps in RE_ACTION.captures_iter(body) {
            let (Some(subject), Some(task)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let task = task.as_str().trim().trim_end_matches([',', ';']).trim();
            if task.chars().count() <= 10 {
                continue;
            }
            items.push(ActionItem {
                task: capitalize(task),
                assignee: resolve_assignee(subject.as_str(), speaker.as_deref()),
                deadline: "not specified".to_string(),
                priority: Priority::Medium,
                context: FALLBACK_CONTEXT.to_string(),
                status: ACTION_STATUS_PENDING.to_string(),
            });
            if items.len() >= MAX_FALLBACK_ACTION_ITEMS {
                return items;
            }
        }
    }

    items
}

/// "we decided/agreed ...", "Decision: ..." and "let's go with ..." statements.
pub fn decisions(text: &str) -> Vec<Decision> {
    let mut found: Vec<Decision> = Vec::new();

    for line in text.lines() {
        let (_, body) = split_speaker(line);
        let matches = [&*RE_DECISION, &*RE_DECISION_LABEL, &*RE_DECISION_LETS]
            .into_iter()
            .flat_map(|re| re.captures_iter(body).filter_map(|c| c.get(1)))
            .map(|m| m.as_str().trim().trim_end_matches([',', ';']).trim().to_string());

        for decision in matches {
            if decision.chars().count() <= MIN_DECISION_TEXT
                || found
                    .iter()
                    .any(|d| d.decision.eq_ignore_ascii_case(&decision))
            {
                continue;
            }
            found.push(Decision {
                decision: capitalize(&decision),
                context: FALLBACK_CONTEXT.to_string(),
                rationale: "not specified".to_string(),
                impact: "Team/Project".to_string(),
                stakeholders: Vec::new(),
                implementation_date: "not specified".to_string(),
            });
            if found.len() >= MAX_FALLBACK_DECISIONS {
                return found;
            }
        }
    }

    found
}

/// Sentences over 30 characters mentioning one of a fixed set of keywords.
pub fn key_points(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| split_speaker(line).1)
        .flat_map(|body| body.split(['.', '!', '?']))
        .map(str::trim)
        .filter(|s| s.chars().count() > 30)
        .filter(|s| {
            let lower = s.to_lowercase();
            KEY_POINT_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .take(MAX_FALLBACK_KEY_POINTS)
        .map(String::from)
        .collect()
}

pub fn classify_meeting_type(text: &str) -> &'static str {
    RE_MEETING_TYPES
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, label)| *label)
        .unwrap_or("General Meeting")
}

pub fn meeting_context(text: &str, roster: &SpeakerRoster) -> MeetingContext {
    let attendees = if roster.speakers.is_empty() {
        identify_speakers(text).names()
    } else {
        roster.names()
    };

    MeetingContext {
        meeting_type: classify_meeting_type(text).to_string(),
        attendees,
        topics: vec!["General Discussion".to_string()],
        sentiment: Sentiment::Neutral,
        urgency: Urgency::Medium,
        confidence: 0.6,
        duration_estimate: "not specified".to_string(),
        key_themes: Vec::new(),
    }
}

/// Deadline mentions need date understanding the heuristics do not have.
pub fn deadlines(_text: &str) -> Vec<Deadline> {
    Vec::new()
}

// ── Stage 3 ──

pub fn executive_summary(meeting_type: &str, extraction: &ExtractionOutput, word_count: usize) -> String {
    format!(
        "This {} produced {} decision(s) and {} action item(s). \
         The discussion covered roughly {} words of content and closed with owners \
         identified for the follow-up work.",
        meeting_type.to_lowercase(),
        extraction.decisions.len(),
        extraction.action_items.len(),
        word_count
    )
}

pub fn meeting_overview(meeting_type: &str, attendees: &[String], topics: &[String]) -> String {
    let who = if attendees.is_empty() {
        "The participants".to_string()
    } else {
        format!("{} participant(s) ({})", attendees.len(), attendees.join(", "))
    };
    format!(
        "{} met for a {} covering {} topic area(s): {}. \
         The session focused on coordination and on agreeing the next round of work.",
        who,
        meeting_type.to_lowercase(),
        topics.len(),
        if topics.is_empty() {
            "general discussion".to_string()
        } else {
            topics.join(", ")
        }
    )
}

pub fn key_outcomes(decisions: &[Decision], action_items: &[ActionItem], key_points: &[String]) -> String {
    let mut outcomes = Vec::new();

    if !decisions.is_empty() {
        outcomes.push(format!("Decisions: {} decision(s) recorded", decisions.len()));
        for (i, decision) in decisions.iter().take(2).enumerate() {
            outcomes.push(format!("  {}. {}", i + 1, truncate_chars(&decision.decision, 80)));
        }
    }

    if !action_items.is_empty() {
        outcomes.push(format!("Action items: {} task(s) assigned", action_items.len()));
        let assignees: BTreeSet<&str> = action_items.iter().map(|a| a.assignee.as_str()).collect();
        let shown: Vec<&str> = assignees.iter().take(4).copied().collect();
        let more = if assignees.len() > 4 { " and others" } else { "" };
        outcomes.push(format!("  Owners: {}{}", shown.join(", "), more));
    }

    if !key_points.is_empty() {
        outcomes.push(format!("Discussion: {} key point(s) raised", key_points.len()));
    }

    if outcomes.is_empty() {
        "The meeting served as coordination and information sharing; no concrete outcomes were recorded."
            .to_string()
    } else {
        outcomes.join("\n")
    }
}

pub fn next_steps(action_items: &[ActionItem], deadlines: &[Deadline]) -> String {
    if action_items.is_empty() && deadlines.is_empty() {
        return "No specific follow-up was identified. Participants continue with current priorities."
            .to_string();
    }

    let mut steps = vec!["Immediate actions:".to_string()];
    for item in action_items.iter().take(5) {
        steps.push(format!("- {} ({})", truncate_chars(&item.task, 60), item.assignee));
    }
    if !deadlines.is_empty() {
        steps.push(format!("{} deadline(s) need attention.", deadlines.len()));
    }
    steps.join("\n")
}

pub fn insights(key_points: &[String], decisions: &[Decision], meeting_type: &str) -> Vec<String> {
    let mut insights = Vec::new();

    if decisions.len() > 2 {
        insights.push("Several decisions were finalized in a single session".to_string());
    }
    if key_points.len() > 4 {
        insights.push("Discussion spanned a broad set of business-relevant topics".to_string());
    }

    let by_type = match meeting_type {
        "Daily Standup" => Some("Progress tracking and blocker reporting follow a regular rhythm"),
        "Client Meeting" => Some("Client relationship work centres on service delivery"),
        "Planning Meeting" => Some("Scope and resourcing for upcoming work were weighed explicitly"),
        "Review Meeting" => Some("Past work was examined with an eye to improvements"),
        "Board Meeting" => Some("Governance oversight of organisational performance was maintained"),
        _ => None,
    };
    if let Some(insight) = by_type {
        insights.push(insight.to_string());
    }

    if insights.is_empty() {
        insights.push("The meeting stayed focused on its business objectives".to_string());
    }
    insights
}

pub fn stakeholder_impact(
    decisions: &[Decision],
    action_items: &[ActionItem],
    attendees: &[String],
) -> BTreeMap<String, String> {
    let mut impact = BTreeMap::new();

    let owners: BTreeSet<&str> = action_items
        .iter()
        .map(|a| a.assignee.as_str())
        .filter(|a| !a.is_empty() && *a != "Unassigned")
        .collect();
    if !owners.is_empty() {
        impact.insert(
            "Direct Contributors".to_string(),
            format!("{} owner(s) took on new responsibilities that need follow-through", owners.len()),
        );
    }
    if !decisions.is_empty() {
        impact.insert(
            "Organization".to_string(),
            format!("{} decision(s) will shape priorities and direction", decisions.len()),
        );
    }
    if !attendees.is_empty() {
        impact.insert(
            "Meeting Participants".to_string(),
            format!("{} attendee(s) were directly involved in the outcomes", attendees.len()),
        );
    }
    if impact.is_empty() {
        impact.insert(
            "General".to_string(),
            "Routine coordination with little impact beyond the team".to_string(),
        );
    }
    impact
}

pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STANDUP: &str = "John: Good morning everyone, let's start our daily standup.\n\
        Sarah: Yesterday I completed the auth module. Today I'll work on the API integration.\n\
        Mike: I finished the database migration and will focus on frontend components today.\n\
        John: Thanks everyone.";

    // ── Totality ──

    #[test]
    fn test_fallbacks_are_total_on_empty_input() {
        assert_eq!(clean_transcript(""), "");
        assert!(identify_speakers("").speakers.is_empty());
        assert!(action_items("").is_empty());
        assert!(decisions("").is_empty());
        assert!(key_points("").is_empty());
        assert!(deadlines("").is_empty());
        assert_eq!(classify_meeting_type(""), "General Meeting");
        assert_eq!(quality_score("", 0), 0.5);
    }

    #[test]
    fn test_fallbacks_handle_odd_input() {
        let odd = ":::\n\u{1F600}: will\n' will '\n\t\n:will do the thing";
        let _ = clean_transcript(odd);
        let _ = identify_speakers(odd);
        let _ = action_items(odd);
        let _ = decisions(odd);
        let _ = key_points(odd);
    }

    // ── Cleaning & speakers ──

    #[test]
    fn test_clean_removes_fillers() {
        let cleaned = clean_transcript("Ann: Um, so I basically   finished it.\n\n   \nBo: uh ok");
        assert_eq!(cleaned, "Ann: so I finished it.\nBo: ok");
    }

    #[test]
    fn test_clean_filler_only_text_is_empty() {
        assert_eq!(clean_transcript("um uh um, uh... basically, actually!"), "");
        assert_eq!(clean_transcript("um uh um uh like basically"), "");
        assert_eq!(clean_transcript("I like it"), "I like it");
    }

    #[test]
    fn test_identify_speakers_sorted_and_title_cased() {
        let roster = identify_speakers("mike: hello\nAnn: hi\nmike: again");
        assert_eq!(roster.names(), vec!["Ann", "Mike"]);
        assert_eq!(roster.speakers[1].utterances, vec!["hello", "again"]);
        assert_eq!(roster.confidence, 0.7);
    }

    #[test]
    fn test_quality_score_heuristic() {
        let words = vec!["word"; 60].join(" ");
        assert!((quality_score(&words, 2) - 1.0).abs() < 1e-9);
        assert!((quality_score("short text", 0) - 0.6).abs() < 1e-9);
    }

    // ── Action items ──

    #[test]
    fn test_first_person_action_item_uses_speaker() {
        let items = action_items("Sarah: I will finish the report by Friday.");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].assignee, "Sarah");
        assert!(items[0].task.to_lowercase().contains("finish the report"));
        assert_eq!(items[0].deadline, "not specified");
        assert_eq!(items[0].priority, Priority::Medium);
        assert_eq!(items[0].status, "pending");
    }

    #[test]
    fn test_action_items_from_standup() {
        let items = action_items(STANDUP);
        let owners: Vec<&str> = items.iter().map(|i| i.assignee.as_str()).collect();
        assert_eq!(owners, vec!["Sarah", "Mike"]);
        assert_eq!(items[0].task, "Work on the API integration");
        assert!(items[1].task.starts_with("Focus on frontend"));
    }

    #[test]
    fn test_named_and_team_subjects() {
        let items = action_items("Lead: Priya should update the deployment guide.\nWe need to book the venue soon");
        assert_eq!(items[0].assignee, "Priya");
        assert_eq!(items[1].assignee, "Team");
    }

    #[test]
    fn test_action_items_capped() {
        let text = (0..25)
            .map(|i| format!("Ann: I will complete deliverable number {}.", i))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(action_items(&text).len(), MAX_FALLBACK_ACTION_ITEMS);
    }

    // ── Decisions & key points ──

    #[test]
    fn test_decisions_patterns() {
        let text = "Ann: We decided to move the launch to March.\n\
                    Bo: Decision: adopt the shared design system.\n\
                    Cy: Let's prioritize payment system first, then reporting.\n\
                    Di: we agreed to move the launch to March";
        let found = decisions(text);
        let texts: Vec<&str> = found.iter().map(|d| d.decision.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Move the launch to March",
                "Adopt the shared design system",
                "Payment system first, then reporting",
            ]
        );
        assert_eq!(found[0].impact, "Team/Project");
    }

    #[test]
    fn test_short_decisions_are_kept() {
        let found = decisions("Ann: We agreed on pricing.\nBo: We decided to hire Dana.\nCy: We agreed on it.");
        let texts: Vec<&str> = found.iter().map(|d| d.decision.as_str()).collect();
        assert_eq!(texts, vec!["Pricing", "Hire Dana"]);
    }

    #[test]
    fn test_key_points_need_keyword_and_length() {
        let text = "Ann: The budget for Q3 is the most pressing item today. Short issue.\n\
                    Bo: We talked about lunch options for the team offsite";
        assert_eq!(
            key_points(text),
            vec!["The budget for Q3 is the most pressing item today"]
        );
    }

    // ── Context ──

    #[test]
    fn test_meeting_type_buckets() {
        assert_eq!(classify_meeting_type("Our daily standup"), "Daily Standup");
        assert_eq!(classify_meeting_type("Call with the customer"), "Client Meeting");
        assert_eq!(classify_meeting_type("Sprint kickoff"), "Planning Meeting");
        assert_eq!(classify_meeting_type("Quarterly numbers"), "General Meeting");
        assert_eq!(classify_meeting_type("Sprint retro notes"), "Planning Meeting");
        assert_eq!(classify_meeting_type("Team retro"), "Review Meeting");
        assert_eq!(classify_meeting_type("Quick stand-up"), "Daily Standup");
        assert_eq!(classify_meeting_type("Quarterly board meeting"), "Board Meeting");
    }

    #[test]
    fn test_meeting_type_matches_whole_words() {
        assert_eq!(classify_meeting_type("The retrofit is on schedule"), "General Meeting");
        assert_eq!(classify_meeting_type("Dailymotion embed broke"), "General Meeting");
        assert_eq!(classify_meeting_type("Two customers called"), "Client Meeting");
    }

    #[test]
    fn test_meeting_context_uses_roster() {
        let roster = identify_speakers(STANDUP);
        let ctx = meeting_context(STANDUP, &roster);
        assert_eq!(ctx.meeting_type, "Daily Standup");
        assert_eq!(ctx.attendees, vec!["John", "Mike", "Sarah"]);
        assert_eq!(ctx.topics, vec!["General Discussion"]);
        assert_eq!(ctx.confidence, 0.6);
    }

    // ── Summary heuristics ──

    #[test]
    fn test_stakeholder_impact_groups() {
        let empty = stakeholder_impact(&[], &[], &[]);
        assert_eq!(empty.keys().collect::<Vec<_>>(), vec!["General"]);

        let items = action_items("Ann: I will write the migration plan.");
        let impact = stakeholder_impact(&[], &items, &["Ann".to_string()]);
        assert!(impact.contains_key("Direct Contributors"));
        assert!(impact.contains_key("Meeting Participants"));
        assert!(impact.values().all(|v| v.chars().count() > 10));
    }

    #[test]
    fn test_insights_by_meeting_type() {
        let insights = insights(&[], &[], "Daily Standup");
        assert_eq!(insights.len(), 1);
        assert!(insights[0].contains("blocker"));
        assert!(insights.iter().all(|i| i.chars().count() > 10));
    }

    #[test]
    fn test_next_steps_without_items() {
        assert!(next_steps(&[], &[]).starts_with("No specific follow-up"));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdefghijk", 8), "abcde...");
    }
}
