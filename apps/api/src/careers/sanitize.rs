//! Sanitization of user-submitted posting content.
//!
//! Plain text is trimmed and HTML-escaped. Job descriptions keep a small
//! allowlist of formatting tags so the rich-text editor output survives.

use std::collections::HashSet;

use ammonia::Builder;
use serde_json::Value;
use thiserror::Error;

use crate::models::career::{new_question_id, Question, QuestionCategory, QuestionSet};

/// Tags a job description may keep. Everything else is stripped.
pub const RICH_TEXT_TAGS: &[&str] = &[
    "b", "i", "em", "strong", "p", "ul", "ol", "li", "br", "span", "div",
];

/// Attributes allowed on any of the rich text tags.
pub const RICH_TEXT_ATTRIBUTES: &[&str] = &["style"];

const ESCAPES: &[(char, &str)] = &[
    ('&', "&amp;"),
    ('"', "&quot;"),
    ('\'', "&#x27;"),
    ('<', "&lt;"),
    ('>', "&gt;"),
    ('/', "&#x2F;"),
    ('\\', "&#x5C;"),
    ('`', "&#96;"),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SanitizeError {
    #[error("Questions must be an array")]
    NotAnArray,

    #[error("Each question category must be an object (category {index} is not)")]
    CategoryNotObject { index: usize },
}

/// Trims `value` and escapes HTML-significant characters.
pub fn sanitize_string(value: &str) -> String {
    let trimmed = value.trim();
    let mut out = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        match ESCAPES.iter().find(|(from, _)| *from == c) {
            Some((_, entity)) => out.push_str(entity),
            None => out.push(c),
        }
    }
    out
}

/// Sanitizes a loosely typed JSON member. Anything that is not a string becomes empty.
pub fn sanitize_value(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(sanitize_string)
        .unwrap_or_default()
}

/// Reverses [`sanitize_string`] so stored text can be shown in an editor
/// without being escaped a second time on the next save.
pub fn unescape_string(value: &str) -> String {
    let mut out = value.to_string();
    // `&amp;` last so "&amp;lt;" decodes to "&lt;" rather than "<".
    for (c, entity) in ESCAPES.iter().rev() {
        out = out.replace(entity, &c.to_string());
    }
    out
}

/// Keeps formatting markup from the allowlist and removes everything else,
/// including the contents of `<script>` and `<style>` elements.
pub fn sanitize_rich_text(html: &str) -> String {
    Builder::empty()
        .add_tags(RICH_TEXT_TAGS)
        .add_generic_attributes(RICH_TEXT_ATTRIBUTES)
        .clean_content_tags(HashSet::from(["script", "style"]))
        .clean(html)
        .to_string()
}

/// True when `html` has no visible text once every tag is removed.
pub fn is_blank_rich_text(html: &str) -> bool {
    Builder::empty()
        .clean_content_tags(HashSet::from(["script", "style"]))
        .clean(html)
        .to_string()
        .replace("&nbsp;", " ")
        .trim()
        .is_empty()
}

/// Validates the shape of a submitted question set and sanitizes every text member.
///
/// Category ids fall back to the category's position, question ids to a fresh id.
/// Members other than the known ones are dropped.
pub fn validate_and_sanitize_questions(value: &Value) -> Result<QuestionSet, SanitizeError> {
    let raw_categories = value.as_array().ok_or(SanitizeError::NotAnArray)?;

    let mut categories = Vec::with_capacity(raw_categories.len());
    for (index, raw) in raw_categories.iter().enumerate() {
        let cat = raw
            .as_object()
            .ok_or(SanitizeError::CategoryNotObject { index })?;

        let id = cat.get("id").and_then(as_integer).unwrap_or(index as i64 + 1);
        let question_count_to_ask = cat
            .get("questionCountToAsk")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok());

        let questions = cat
            .get("questions")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(sanitize_question).collect())
            .unwrap_or_default();

        categories.push(QuestionCategory {
            id,
            category: sanitize_value(cat.get("category")),
            question_count_to_ask,
            questions,
        });
    }

    Ok(QuestionSet { categories })
}

/// Exactly 24 hexadecimal characters, the shape of a document-store object id.
pub fn is_valid_object_id(id: &str) -> bool {
    id.len() == 24 && id.chars().all(|c| c.is_ascii_hexdigit())
}

fn sanitize_question(raw: &Value) -> Question {
    let id = match raw.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => sanitize_string(s),
        Some(Value::Number(n)) => n.to_string(),
        _ => new_question_id(),
    };

    Question {
        id,
        question: sanitize_value(raw.get("question")),
        kind: sanitize_value(raw.get("type")),
        required: raw.get("required").map(is_truthy).unwrap_or(false),
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Loose truthiness as web clients send it: `0`, `""`, `false` and `null` are false.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
