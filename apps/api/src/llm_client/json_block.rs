//! Pulls the JSON payload out of a Markdown-fenced model answer.
//!
//! Only the first ```` ```json ```` fence is honored. Text before and after it
//! is ignored, and there is no fallback scan for bare objects.

use serde_json::Value;
use thiserror::Error;

const FENCE_OPEN: &str = "```json\n";
const FENCE_CLOSE: &str = "\n```";

#[derive(Debug, Error)]
pub enum JsonBlockError {
    #[error("No JSON block found")]
    NoJsonBlockFound,

    #[error("Malformed JSON in response block: {0}")]
    MalformedJson(#[from] serde_json::Error),
}

/// Returns the raw body of the first fenced JSON block, untrimmed.
fn fenced_body(text: &str) -> Option<&str> {
    let start = text.find(FENCE_OPEN)? + FENCE_OPEN.len();
    let rest = &text[start..];
    let end = rest.find(FENCE_CLOSE)?;
    Some(&rest[..end])
}

/// Extracts and parses the first ```` ```json ```` block in `text`.
pub fn extract_json(text: &str) -> Result<Value, JsonBlockError> {
    let body = fenced_body(text).ok_or(JsonBlockError::NoJsonBlockFound)?;
    Ok(serde_json::from_str(body.trim())?)
}
