//! Turns untrusted LLM output into typed, bounded records.
//!
//! Every parser returns `Result<T, ParseError>`. A `ParseError` is expected
//! degradation: the caller substitutes the matching heuristic from
//! [`crate::fallback`] and carries on.

pub mod fields;
pub mod json;
pub mod records;

use thiserror::Error;

pub use json::{extract_json, parse_json, Shape};
pub use records::{
    parse_action_items, parse_deadlines, parse_decisions, parse_insights, parse_key_points,
    parse_meeting_context, parse_quality_score, parse_sections, parse_speakers,
    parse_stakeholder_impact, parse_text, MAX_ACTION_ITEMS, MAX_DEADLINES, MAX_DECISIONS,
    MAX_INSIGHTS, MAX_KEY_POINTS,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("response was empty")]
    Empty,

    #[error("no JSON found in response")]
    NoJson,

    #[error("malformed JSON: {0}")]
    Malformed(String),

    #[error("expected a JSON {expected}, found {found}")]
    WrongShape {
        expected: &'static str,
        found: &'static str,
    },

    #[error("expected a number, found '{0}'")]
    InvalidNumber(String),
}
