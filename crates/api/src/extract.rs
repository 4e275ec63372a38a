//! Extracting plain text from chat-completion response payloads.
//!
//! The Responses API has shipped several payload shapes over time, and legacy
//! chat-completion shapes still appear. Each shape is handled by a pure
//! strategy function; strategies run in priority order and the first
//! non-empty match wins.

use serde_json::Value;

type Strategy = fn(&Value) -> Option<String>;

const STRATEGIES: &[Strategy] = &[output_text, output_items, legacy_message, legacy_text];

/// Best-effort plain text from a completion payload. None when no strategy
/// finds non-empty text.
pub fn response_text(payload: &Value) -> Option<String> {
    STRATEGIES.iter().find_map(|strategy| strategy(payload))
}

/// True when the upstream reports the reply was cut off by the output token
/// budget.
pub fn truncated_by_token_limit(payload: &Value) -> bool {
    payload
        .pointer("/incomplete_details/reason")
        .and_then(Value::as_str)
        == Some("max_output_tokens")
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Top-level `output_text` convenience field.
fn output_text(payload: &Value) -> Option<String> {
    payload
        .get("output_text")
        .and_then(Value::as_str)
        .and_then(non_empty)
}

/// Scan of `output[].content[]` blocks: plain strings, `.text`, nested
/// `.content[].text`, or the `.parts[].text` fallback naming.
fn output_items(payload: &Value) -> Option<String> {
    for item in payload.get("output")?.as_array()? {
        let Some(content) = item.get("content").and_then(Value::as_array) else {
            continue;
        };

        let mut parts: Vec<&str> = Vec::new();
        for block in content {
            if let Some(s) = block.as_str() {
                parts.push(s);
            } else if let Some(s) = block.get("text").and_then(Value::as_str) {
                parts.push(s);
            } else if let Some(nested) = block.get("content").and_then(Value::as_array) {
                for sub in nested {
                    if let Some(s) = sub.get("text").and_then(Value::as_str) {
                        parts.push(s);
                    }
                }
            } else if let Some(nested) = block.get("parts").and_then(Value::as_array) {
                for sub in nested {
                    if let Some(s) = sub.get("text").and_then(Value::as_str) {
                        parts.push(s);
                    }
                }
            }
        }

        if let Some(joined) = non_empty(&parts.concat()) {
            return Some(joined);
        }
    }
    None
}

/// Legacy chat-completion shape: `choices[0].message.content`.
fn legacy_message(payload: &Value) -> Option<String> {
    payload
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .and_then(non_empty)
}

/// Oldest completion shape: `choices[0].text`.
fn legacy_text(payload: &Value) -> Option<String> {
    payload
        .pointer("/choices/0/text")
        .and_then(Value::as_str)
        .and_then(non_empty)
}
