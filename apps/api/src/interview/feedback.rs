//! Interview Feedback — best-effort extraction of the grading JSON from free-form model text.
//!
//! The model is asked for strict JSON but routinely wraps it in prose or code fences.
//! `parse_feedback` scans for the first balanced `{...}` span that parses as a JSON
//! object, then coerces its fields. Callers substitute `InterviewFeedback::fallback()`
//! when parsing fails.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Structured grading result returned by the `end` phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewFeedback {
    pub overall_score: u32,                   // 0 – 100
    pub skill_ratings: BTreeMap<String, u32>, // each 0 – 100
    pub summary: String,
    pub improvement_plan: Vec<String>,
}

impl InterviewFeedback {
    /// Generic feedback served when the model output cannot be parsed.
    pub fn fallback() -> Self {
        Self {
            overall_score: 70,
            skill_ratings: BTreeMap::from([
                ("technical_knowledge".to_string(), 70),
                ("communication".to_string(), 75),
                ("problem_solving".to_string(), 70),
            ]),
            summary: "Thank you for completing this mock interview. You showed good potential and understanding of the core concepts. Continue practicing to improve your confidence and depth of knowledge.".to_string(),
            improvement_plan: vec![
                "Practice explaining complex concepts in simple terms".to_string(),
                "Work on more hands-on projects to gain practical experience".to_string(),
                "Study common interview patterns for your target role".to_string(),
            ],
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum FeedbackParseError {
    #[error("no JSON object found in model output")]
    NoJsonObject,

    #[error("feedback is missing field '{0}'")]
    MissingField(&'static str),

    #[error("feedback field '{field}' is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Parses model output into feedback.
pub fn parse_feedback(text: &str) -> Result<InterviewFeedback, FeedbackParseError> {
    let object = extract_json_object(text).ok_or(FeedbackParseError::NoJsonObject)?;

    let overall_score = coerce_score(required(&object, "overallScore")?).ok_or_else(|| {
        FeedbackParseError::InvalidField {
            field: "overallScore",
            reason: "expected a number between 0 and 100".to_string(),
        }
    })?;

    let skill_ratings = match required(&object, "skillRatings")? {
        Value::Object(ratings) => ratings
            .iter()
            .map(|(skill, value)| {
                coerce_score(value).map(|score| (skill.clone(), score)).ok_or_else(|| {
                    FeedbackParseError::InvalidField {
                        field: "skillRatings",
                        reason: format!("rating for '{skill}' is not numeric"),
                    }
                })
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?,
        _ => {
            return Err(FeedbackParseError::InvalidField {
                field: "skillRatings",
                reason: "expected an object".to_string(),
            })
        }
    };

    let summary = coerce_text(required(&object, "summary")?).ok_or_else(|| {
        FeedbackParseError::InvalidField {
            field: "summary",
            reason: "expected a string".to_string(),
        }
    })?;

    let improvement_plan = match required(&object, "improvementPlan")? {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                coerce_text(item).ok_or_else(|| FeedbackParseError::InvalidField {
                    field: "improvementPlan",
                    reason: "items must be strings".to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        Value::String(single) => vec![single.clone()],
        _ => {
            return Err(FeedbackParseError::InvalidField {
                field: "improvementPlan",
                reason: "expected a list of strings".to_string(),
            })
        }
    };

    Ok(InterviewFeedback {
        overall_score,
        skill_ratings,
        summary,
        improvement_plan,
    })
}

/// Returns the first balanced `{...}` span in `text` that parses as a JSON object.
/// Braces inside string literals do not count toward the balance.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    text.char_indices()
        .filter(|&(_, c)| c == '{')
        .filter_map(|(start, _)| balanced_span_end(text, start).map(|end| &text[start..end]))
        .find_map(|candidate| match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        })
}

/// Byte offset one past the brace that closes the one at `start`.
fn balanced_span_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

fn required<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, FeedbackParseError> {
    match object.get(field) {
        Some(Value::Null) | None => Err(FeedbackParseError::MissingField(field)),
        Some(value) => Ok(value),
    }
}

/// Numbers and numeric strings ("85", "85%") become a 0–100 integer.
fn coerce_score(value: &Value) -> Option<u32> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    raw.is_finite()
        .then(|| raw.clamp(0.0, 100.0).round() as u32)
}

fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
