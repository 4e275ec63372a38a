//! Shared API request/response types used by the server and web client.

use garde::Validate;
use serde::{Deserialize, Serialize};

/// Waitlist submission from the contact form.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LeadPayload {
    /// Trimmed and lowercased by the server before validation.
    #[garde(pattern(r"^[^\s@]+@[^\s@]+\.[^\s@]+$"))]
    pub email: String,
    /// reCAPTCHA v3 token from the client-side widget.
    #[garde(skip)]
    #[serde(default)]
    pub token: String,
    /// reCAPTCHA action the client executed with.
    #[garde(skip)]
    #[serde(default)]
    pub action: Option<String>,
    // Honeypot aliases. Hidden form fields that humans never fill in; the
    // client renders one of them depending on the form variant.
    #[garde(skip)]
    #[serde(default)]
    pub website: Option<String>,
    #[garde(skip)]
    #[serde(default)]
    pub hp: Option<String>,
    #[garde(skip)]
    #[serde(default)]
    pub company: Option<String>,
}

impl LeadPayload {
    /// First non-blank honeypot value, if any field was filled.
    pub fn honeypot_value(&self) -> Option<&str> {
        [&self.website, &self.hp, &self.company]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|v| !v.trim().is_empty())
    }
}

/// Returned after a waitlist submission.
#[derive(Debug, Serialize, Deserialize)]
pub struct LeadResponse {
    pub ok: bool,
    pub message: String,
}

/// A question for the assistant. Exactly one of the three text fields is
/// expected; `term` is a glossary lookup.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AssistantPayload {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub term: Option<String>,
    /// Ignored by the server; the model is pinned there.
    #[serde(default)]
    pub model: Option<String>,
}

impl AssistantPayload {
    /// Resolve the question text: `message`, else `query`, else `term`
    /// wrapped into a definition prompt. Blank strings do not count.
    pub fn resolved_message(&self) -> Option<String> {
        let pick = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        pick(&self.message).or_else(|| pick(&self.query)).or_else(|| {
            pick(&self.term).map(|t| format!("Explain this term in plain English: {}", t))
        })
    }
}

/// Assistant reply. Canned replies (over quota, off-topic) are still shaped
/// like normal answers so the chat UI renders them as assistant bubbles.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AssistantResponse {
    pub answer: String,
    /// Raw upstream payload, passed through for client-side debugging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Daily cap, echoed with the over-quota reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}
