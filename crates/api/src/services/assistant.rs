//! Chat-completion service abstraction wrapping the OpenAI client.

use async_trait::async_trait;
use serde_json::Value;

use crate::openai;

/// Completion failures, split so the handler can surface upstream
/// diagnostics on the 502 path.
#[derive(Debug)]
pub enum CompletionError {
    /// Upstream answered with a non-2xx status.
    Api { status: u16, details: Value },
    /// Transport or other local failure.
    Other(anyhow::Error),
}

/// Chat-completion service trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send the user message upstream and return the raw response payload.
    async fn complete(&self, message: &str) -> Result<Value, CompletionError>;
}

/// OpenAI implementation of CompletionService.
pub struct OpenAiCompletion {
    client: openai::Client,
}

impl OpenAiCompletion {
    pub fn new(client: openai::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletion {
    async fn complete(&self, message: &str) -> Result<Value, CompletionError> {
        match self.client.create_response(message).await {
            Ok(payload) => Ok(payload),
            Err(openai::Error::Api { status, body }) => Err(CompletionError::Api {
                status,
                details: body,
            }),
            Err(e) => Err(CompletionError::Other(anyhow::anyhow!(
                "completion request failed: {}",
                e
            ))),
        }
    }
}
