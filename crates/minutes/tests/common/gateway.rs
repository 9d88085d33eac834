//! Scripted gateways for pipeline tests.

#![allow(dead_code)]

use std::sync::Arc;

use minutes::llm::ScriptedGateway;
use minutes::stages::prompts;
use minutes::{MinutesGenerator, PipelineSettings};

pub const PLANNING_TRANSCRIPT: &str = "\
Ann: Welcome to the roadmap review. The main issue is the launch timeline.
Bo: I will finish the migration plan by Friday.
Cy: We decided to delay the mobile release until the API is stable.
Ann: Cy should update the customer announcement.
Bo: The budget for contractors is the critical constraint this quarter.";

/// Answers every prompt of every stage with valid output.
pub fn well_formed_gateway(cleaned: &str) -> ScriptedGateway {
    ScriptedGateway::new()
        .reply(prompts::CLEAN_TRANSCRIPT, cleaned)
        .reply(
            prompts::IDENTIFY_SPEAKERS,
            r#"{"identified_speakers": ["Ann", "Bo", "Cy"],
                "speaker_roles": {"Ann": "Product lead", "Bo": "Engineer", "Cy": "Mobile lead"},
                "confidence_score": 0.92}"#,
        )
        .reply(prompts::ASSESS_QUALITY, "0.88")
        .reply(
            prompts::EXTRACT_ACTION_ITEMS,
            r#"[{"task": "Finish the migration plan", "assignee": "Bo", "deadline": "Friday", "priority": "high"},
                {"task": "Update the customer announcement", "assignee": "Cy", "priority": "medium"}]"#,
        )
        .reply(
            prompts::EXTRACT_DECISIONS,
            r#"[{"decision": "Delay the mobile release until the API is stable", "context": "API instability", "stakeholders": ["Cy"]}]"#,
        )
        .reply(
            prompts::EXTRACT_KEY_POINTS,
            r#"["Launch timeline is the main issue", "Contractor budget is the critical constraint"]"#,
        )
        .reply(
            prompts::ANALYZE_CONTEXT,
            r#"{"meeting_type": "Planning Meeting", "attendees": ["Ann", "Bo", "Cy"],
                "topics": ["Launch timeline", "Budget"], "sentiment": "mixed", "urgency": "high", "confidence": 0.9}"#,
        )
        .reply(
            prompts::EXTRACT_DEADLINES,
            r#"[{"deadline": "Migration plan", "date": "Friday", "urgency": "high", "responsible_party": "Bo"}]"#,
        )
        .reply(
            prompts::EXECUTIVE_SUMMARY,
            "The team reviewed the roadmap and agreed to delay the mobile release until the API is stable.",
        )
        .reply(prompts::MEETING_OVERVIEW, "Ann, Bo and Cy met to review the launch roadmap.")
        .reply(prompts::KEY_OUTCOMES, "- Mobile release delayed\n- Migration plan due Friday")
        .reply(prompts::NEXT_STEPS, "- Bo finishes the migration plan by Friday")
        .reply(
            prompts::STRATEGIC_INSIGHTS,
            r#"["API stability now gates the mobile roadmap", "Contractor budget limits parallel work"]"#,
        )
        .reply(
            prompts::STAKEHOLDER_IMPACT,
            r#"{"Customers": "Mobile customers wait longer for the new release"}"#,
        )
        .reply(
            prompts::FORMAT_MINUTES,
            "# Planning Meeting Minutes\n\n## Executive Summary\nThe team reviewed the roadmap.",
        )
        .reply(
            prompts::FORMAT_SECTIONS,
            r##"{"header": "# Planning Meeting Minutes", "summary": "Roadmap reviewed.", "overview": "Three attendees.",
                "outcomes": "Release delayed.", "next_steps": "Migration plan by Friday."}"##,
        )
        .reply(
            prompts::FORMAT_ACTION_TABLE,
            "| Task | Assignee | Due Date | Priority | Status |\n|---|---|---|---|---|\n| Finish the migration plan | Bo | Friday | High | Pending |",
        )
        .reply(prompts::FORMAT_DECISIONS, "### 1. Delay the mobile release\n**Context:** API instability")
        .reply(prompts::FORMAT_ATTENDEES, "## Meeting Information\n**Attendees:** Ann, Bo, Cy")
}

pub fn generator_with(gateway: ScriptedGateway) -> (MinutesGenerator, Arc<ScriptedGateway>) {
    let gateway = Arc::new(gateway);
    let generator = MinutesGenerator::new(gateway.clone(), PipelineSettings::default());
    (generator, gateway)
}
