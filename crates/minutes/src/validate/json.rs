use serde_json::Value;

use super::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Array,
    Object,
}

impl Shape {
    fn name(&self) -> &'static str {
        match self {
            Shape::Array => "array",
            Shape::Object => "object",
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Locates the JSON payload in a model response.
///
/// Prefers the body of a Markdown code fence when one is present, then scans
/// from the first `{` or `[` to its matching close, tracking string
/// boundaries and escapes. An unterminated payload runs to the end of input.
pub fn extract_json(response: &str) -> Option<&str> {
    candidates(response).next()
}

/// Every balanced top-level `{...}` or `[...]` span, in order of appearance.
fn candidates(response: &str) -> impl Iterator<Item = &str> {
    let body = fenced_block(response).unwrap_or(response);
    let mut offset = 0;

    std::iter::from_fn(move || {
        let start = offset + body[offset..].find(['{', '['])?;
        let end = balanced_end(body, start);
        offset = end;
        Some(&body[start..end])
    })
}

/// Byte index just past the bracket closing the one at `start`.
fn balanced_end(body: &str, start: usize) -> usize {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in body[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => depth += 1,
            '}' | ']' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return start + i + c.len_utf8();
                }
            }
            _ => {}
        }
    }

    body.len()
}

/// Content between the first pair of ``` fences, language tag removed.
fn fenced_block(response: &str) -> Option<&str> {
    let open = response.find("```")?;
    let after_open = &response[open + 3..];
    let body_start = after_open.find('\n').map(|i| i + 1)?;
    let body = &after_open[body_start..];
    let close = body.find("```")?;
    Some(&body[..close])
}

/// Whether a value of the right shape carries anything a record parser can use.
fn has_content(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().any(|v| v.is_object() || v.is_string()),
        Value::Object(map) => !map.is_empty(),
        _ => false,
    }
}

/// Parses the JSON payload of `response` and checks its top-level shape.
///
/// Prose can carry bracketed asides before the real payload, so each
/// candidate is tried in turn. The first one of the requested shape with
/// usable content wins; otherwise the first one of the requested shape.
pub fn parse_json(response: &str, shape: Shape) -> Result<Value, ParseError> {
    if response.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let mut first_error = None;
    let mut first_match = None;

    for payload in candidates(response) {
        let value: Value = match serde_json::from_str(payload) {
            Ok(value) => value,
            Err(e) => {
                first_error.get_or_insert(ParseError::Malformed(e.to_string()));
                continue;
            }
        };

        let matches = match shape {
            Shape::Array => value.is_array(),
            Shape::Object => value.is_object(),
        };
        if !matches {
            first_error.get_or_insert(ParseError::WrongShape {
                expected: shape.name(),
                found: value_kind(&value),
            });
            continue;
        }

        if has_content(&value) {
            return Ok(value);
        }
        first_match.get_or_insert(value);
    }

    match (first_match, first_error) {
        (Some(value), _) => Ok(value),
        (None, Some(err)) => Err(err),
        (None, None) => Err(ParseError::NoJson),
    }
}
