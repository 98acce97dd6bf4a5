//! Pull a JSON object out of free-form completion text.
//!
//! Models asked for JSON still wrap it in code fences or prose now and then.
//! [`extract_json_object`] tries, in order: the whole text, the first fenced
//! block, and the outermost `{ ... }` span.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```").expect("valid fenced block pattern")
});

/// Raised when no JSON object can be recovered from the text.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ConverterError {
    pub message: String,
}

impl ConverterError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Parse `text` into a JSON object, tolerating fences and surrounding prose.
pub fn extract_json_object(text: &str) -> Result<Value, ConverterError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ConverterError::new("empty completion"));
    }

    if let Some(obj) = parse_object(trimmed) {
        return Ok(obj);
    }

    if let Some(obj) = FENCED_BLOCK
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_object(m.as_str()))
    {
        return Ok(obj);
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            if let Some(obj) = parse_object(&trimmed[start..=end]) {
                return Ok(obj);
            }
        }
    }

    Err(ConverterError::new(format!(
        "no JSON object found in completion: {}",
        truncate(trimmed, 200)
    )))
}

fn parse_object(candidate: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
