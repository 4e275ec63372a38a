//! OpenAI Responses API client.
//!
//! Uses the Responses API: https://platform.openai.com/docs/api-reference/responses
//! The raw payload is returned as `serde_json::Value` because the response
//! shape varies across model generations; see `extract` for the text
//! extraction strategies.

use serde::Serialize;
use serde_json::Value;

/// Model is pinned server-side regardless of what the client asked for.
pub const MODEL: &str = "gpt-4";

/// Output token budget. Large enough that normal 2-4 sentence answers are
/// never truncated.
const MAX_OUTPUT_TOKENS: u32 = 800;

const SYSTEM_PROMPT: &str = "You are Domus AI — a concise, helpful assistant specialized in real estate. Persona: Domus AI builds the future of real estate research and automation. Whether the user is an agent, investor, or a first-time homebuyer, you deliver AI-powered insights to help them make smarter decisions — from neighborhood trends to lead discovery and lien alerts. ONLY answer questions directly related to real estate, property, housing, mortgages, home buying, selling, investing, property law, zoning, liens, valuations, or comparable market analysis. If the user asks about topics outside real estate (for example: politics, weather, sports, entertainment, health, general news, or finance unrelated to property investing), reply exactly: \"I can only answer real estate related questions.\" Do NOT provide any additional information or attempt to answer off-topic requests. After answering, if it would genuinely help the user (e.g., they are buying/selling/investing or need personalized assistance), you may add ONE friendly line suggesting they reach out via the \"Contact a Real Estate Agent\" form below so Domus AI can match them with an agent. Keep it very light and do this at most once.";

#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    api_key: String,
}

impl Client {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Send a user message with the fixed persona prompt and a brevity
    /// instruction. Returns the raw response payload.
    pub async fn create_response(&self, user_message: &str) -> Result<Value, Error> {
        let request = ResponsesRequest {
            model: MODEL,
            input: vec![
                InputMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                InputMessage {
                    role: "user",
                    content: format!(
                        "{}\n\nPlease answer concisely in 2-4 short sentences.",
                        user_message
                    ),
                },
            ],
            max_output_tokens: MAX_OUTPUT_TOKENS,
        };

        let response = self
            .http
            .post("https://api.openai.com/v1/responses")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;
        // Tolerant parse: upstream error bodies are not always JSON.
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

#[derive(Debug)]
pub enum Error {
    Request(String),
    Api { status: u16, body: Value },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Request(e) => write!(f, "request failed: {}", e),
            Error::Api { status, .. } => write!(f, "API error {}", status),
        }
    }
}

impl std::error::Error for Error {}

#[derive(Serialize)]
struct ResponsesRequest {
    model: &'static str,
    input: Vec<InputMessage>,
    max_output_tokens: u32,
}

#[derive(Serialize)]
struct InputMessage {
    role: &'static str,
    content: String,
}
