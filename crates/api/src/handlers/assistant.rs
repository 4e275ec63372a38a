//! Real-estate assistant queries proxied to a hosted chat-completion API.
//!
//! Over-quota and off-topic outcomes are deliberately HTTP 200 with canned
//! answers so the chat UI renders them as normal assistant bubbles instead
//! of error toasts. The denylist is applied twice: to the incoming question
//! (skipping the upstream call entirely) and again to the extracted answer
//! in case the model drifts off-topic.

use axum::{
    Json, Router, debug_handler, extract::State, http::StatusCode, response::IntoResponse,
    routing::post,
};
use chrono::Utc;
use domus_shared::api::{AssistantPayload, AssistantResponse};

use crate::{
    error::AppError,
    extract,
    filter::{self, OFF_TOPIC_REPLY},
    middleware::client_ip::ClientIp,
    openai,
    services::CompletionError,
    state::AppState,
};

/// Maximum assistant interactions per IP per day while in beta.
const MAX_DAILY: i64 = 8;

const LIMIT_REPLY: &str = "You have reached the limit of messages in this interaction (we are in beta). Please wait 24 hours or reach us in the \"Contact a Real Estate Agent\" form below for more information.";

const TRUNCATION_WARNING: &str =
    "Model response was truncated (max_output_tokens). Try again or increase max_output_tokens.";

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(ask_assistant))
}

#[debug_handler]
async fn ask_assistant(
    ip: ClientIp,
    State(state): State<AppState>,
    Json(payload): Json<AssistantPayload>,
) -> Result<impl IntoResponse, AppError> {
    let Some(message) = payload.resolved_message() else {
        return Err(AppError::External(
            StatusCode::BAD_REQUEST,
            "Missing or invalid message/query/term",
        ));
    };

    // The model is pinned server-side; a client override is ignored.
    if let Some(model) = payload.model.as_deref()
        && model != openai::MODEL
    {
        tracing::warn!(requested = model, forced = openai::MODEL, "ignoring client model override");
    }

    let Some(completion) = state.completion.as_ref() else {
        tracing::error!("assistant query received but no completion API key is configured");
        return Err(AppError::External(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Missing API key",
        ));
    };

    if ip.is_known() {
        let count = state.stores.quota.hit_daily(&ip.0, Utc::now()).await?;
        if count > MAX_DAILY {
            tracing::info!(ip = %ip.0, count, "daily assistant quota reached");
            return Ok(Json(AssistantResponse {
                answer: LIMIT_REPLY.to_string(),
                limit: Some(MAX_DAILY),
                ..Default::default()
            }));
        }
    }

    if filter::is_off_topic(&message) {
        return Ok(Json(AssistantResponse {
            answer: OFF_TOPIC_REPLY.to_string(),
            ..Default::default()
        }));
    }

    let raw = match completion.complete(&message).await {
        Ok(raw) => raw,
        Err(CompletionError::Api { status, details }) => {
            tracing::error!(status, "upstream completion error");
            return Err(AppError::Upstream {
                status: Some(status),
                details: Some(details),
            });
        }
        Err(CompletionError::Other(e)) => {
            tracing::error!("completion request failed: {:#}", e);
            return Err(AppError::Upstream {
                status: None,
                details: None,
            });
        }
    };

    if extract::truncated_by_token_limit(&raw) {
        tracing::warn!("completion truncated by the output token budget");
        return Ok(Json(AssistantResponse {
            answer: String::new(),
            raw: Some(raw),
            warning: Some(TRUNCATION_WARNING.to_string()),
            ..Default::default()
        }));
    }

    let answer = extract::response_text(&raw).unwrap_or_default();
    if answer.is_empty() {
        tracing::warn!("no text found in completion payload");
    }

    if filter::is_off_topic(&answer) {
        tracing::warn!("completion drifted off-topic; substituting the canned reply");
        return Ok(Json(AssistantResponse {
            answer: OFF_TOPIC_REPLY.to_string(),
            raw: Some(raw),
            ..Default::default()
        }));
    }

    Ok(Json(AssistantResponse {
        answer,
        raw: Some(raw),
        ..Default::default()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MockCompletionService;
    use crate::stores::MockQuotaStore;
    use crate::test_utils::{TestStateBuilder, response_body};
    use serde_json::json;

    fn ask(message: &str) -> AssistantPayload {
        AssistantPayload {
            message: Some(message.to_string()),
            ..Default::default()
        }
    }

    fn ip() -> ClientIp {
        ClientIp("203.0.113.9".to_string())
    }

    fn completion_returning(payload: serde_json::Value) -> MockCompletionService {
        let mut completion = MockCompletionService::new();
        completion
            .expect_complete()
            .returning(move |_| Ok(payload.clone()));
        completion
    }

    #[tokio::test]
    async fn missing_message_is_a_client_error() {
        let state = TestStateBuilder::new().build();

        let result = ask_assistant(ip(), State(state), Json(AssistantPayload::default())).await;

        let Err(AppError::External(status, msg)) = result else {
            panic!("expected rejection");
        };
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(msg, "Missing or invalid message/query/term");
    }

    #[tokio::test]
    async fn missing_api_key_is_a_server_error() {
        let state = TestStateBuilder::new().without_completion().build();

        let result = ask_assistant(ip(), State(state), Json(ask("What is escrow?"))).await;

        let Err(AppError::External(status, msg)) = result else {
            panic!("expected configuration error");
        };
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(msg, "Missing API key");
    }

    #[tokio::test]
    async fn ninth_request_gets_the_beta_limit_reply() {
        let mut quota = MockQuotaStore::new();
        quota.expect_hit_daily().returning(|_, _| Ok(9));

        // Expectation-free completion mock: an upstream call would panic.
        let state = TestStateBuilder::new()
            .with_quota(quota)
            .with_completion(MockCompletionService::new())
            .build();

        let result = ask_assistant(ip(), State(state), Json(ask("What is escrow?")))
            .await
            .unwrap();

        let response = result.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response_body(response).await;
        assert_eq!(
            body["answer"],
            "You have reached the limit of messages in this interaction (we are in beta). Please wait 24 hours or reach us in the \"Contact a Real Estate Agent\" form below for more information."
        );
        assert_eq!(body["limit"], 8);
    }

    #[tokio::test]
    async fn eighth_request_is_still_served() {
        let mut quota = MockQuotaStore::new();
        quota.expect_hit_daily().returning(|_, _| Ok(8));

        let state = TestStateBuilder::new()
            .with_quota(quota)
            .with_completion(completion_returning(json!({ "output_text": "Escrow is..." })))
            .build();

        let result = ask_assistant(ip(), State(state), Json(ask("What is escrow?")))
            .await
            .unwrap();

        let body = response_body(result.into_response()).await;
        assert_eq!(body["answer"], "Escrow is...");
    }

    #[tokio::test]
    async fn off_topic_question_is_refused_without_an_upstream_call() {
        // Expectation-free completion mock: an upstream call would panic.
        let state = TestStateBuilder::new()
            .with_completion(MockCompletionService::new())
            .build();

        let result = ask_assistant(
            ip(),
            State(state),
            Json(ask("What's the weather like?")),
        )
        .await
        .unwrap();

        let response = result.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response_body(response).await;
        assert_eq!(body["answer"], "I can only answer real estate related questions.");
        assert!(body.get("raw").is_none());
    }

    #[tokio::test]
    async fn quota_is_skipped_for_unknown_ips() {
        // Expectation-free quota mock: a hit would panic.
        let state = TestStateBuilder::new()
            .with_quota(MockQuotaStore::new())
            .with_completion(completion_returning(json!({ "output_text": "Answer." })))
            .build();

        let result = ask_assistant(
            ClientIp(String::new()),
            State(state),
            Json(ask("What is escrow?")),
        )
        .await
        .unwrap();

        let body = response_body(result.into_response()).await;
        assert_eq!(body["answer"], "Answer.");
    }

    #[tokio::test]
    async fn answer_is_extracted_from_nested_output() {
        let payload = json!({ "output": [{ "content": [{ "text": "Lien defined." }] }] });
        let state = TestStateBuilder::new()
            .with_completion(completion_returning(payload.clone()))
            .build();

        let result = ask_assistant(ip(), State(state), Json(ask("What is a lien?")))
            .await
            .unwrap();

        let body = response_body(result.into_response()).await;
        assert_eq!(body["answer"], "Lien defined.");
        assert_eq!(body["raw"], payload);
    }

    #[tokio::test]
    async fn term_lookup_is_wrapped_into_a_prompt() {
        let mut completion = MockCompletionService::new();
        completion
            .expect_complete()
            .with(mockall::predicate::eq(
                "Explain this term in plain English: lien",
            ))
            .returning(|_| Ok(json!({ "output_text": "A lien is a claim." })));

        let state = TestStateBuilder::new().with_completion(completion).build();

        let payload = AssistantPayload {
            term: Some("lien".to_string()),
            ..Default::default()
        };
        let result = ask_assistant(ip(), State(state), Json(payload))
            .await
            .unwrap();

        let body = response_body(result.into_response()).await;
        assert_eq!(body["answer"], "A lien is a claim.");
    }

    #[tokio::test]
    async fn truncated_response_returns_a_warning_not_an_error() {
        let payload = json!({
            "incomplete_details": { "reason": "max_output_tokens" },
            "output": [{ "content": [{ "text": "partial" }] }]
        });
        let state = TestStateBuilder::new()
            .with_completion(completion_returning(payload))
            .build();

        let result = ask_assistant(ip(), State(state), Json(ask("What is escrow?")))
            .await
            .unwrap();

        let response = result.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response_body(response).await;
        assert_eq!(body["answer"], "");
        assert!(
            body["warning"]
                .as_str()
                .is_some_and(|w| !w.is_empty())
        );
    }

    #[tokio::test]
    async fn off_topic_answer_is_replaced_with_the_canned_reply() {
        let payload = json!({ "output_text": "The weather will improve prices." });
        let state = TestStateBuilder::new()
            .with_completion(completion_returning(payload.clone()))
            .build();

        let result = ask_assistant(ip(), State(state), Json(ask("What is escrow?")))
            .await
            .unwrap();

        let body = response_body(result.into_response()).await;
        assert_eq!(body["answer"], "I can only answer real estate related questions.");
        assert_eq!(body["raw"], payload);
    }

    #[tokio::test]
    async fn unrecognized_payload_yields_an_empty_answer() {
        let state = TestStateBuilder::new()
            .with_completion(completion_returning(json!({ "object": "response" })))
            .build();

        let result = ask_assistant(ip(), State(state), Json(ask("What is escrow?")))
            .await
            .unwrap();

        let response = result.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response_body(response).await;
        assert_eq!(body["answer"], "");
    }

    #[tokio::test]
    async fn upstream_error_becomes_a_502_with_details() {
        let mut completion = MockCompletionService::new();
        completion.expect_complete().returning(|_| {
            Err(CompletionError::Api {
                status: 401,
                details: json!({ "error": { "code": "invalid_api_key" } }),
            })
        });

        let state = TestStateBuilder::new().with_completion(completion).build();

        let result = ask_assistant(ip(), State(state), Json(ask("What is escrow?"))).await;

        let Err(AppError::Upstream { status, details }) = result else {
            panic!("expected upstream error");
        };
        assert_eq!(status, Some(401));
        assert_eq!(details.unwrap()["error"]["code"], "invalid_api_key");
    }

    #[tokio::test]
    async fn transport_failure_becomes_a_bare_502() {
        let mut completion = MockCompletionService::new();
        completion
            .expect_complete()
            .returning(|_| Err(CompletionError::Other(anyhow::anyhow!("dns failure"))));

        let state = TestStateBuilder::new().with_completion(completion).build();

        let result = ask_assistant(ip(), State(state), Json(ask("What is escrow?"))).await;

        let Err(AppError::Upstream { status, details }) = result else {
            panic!("expected upstream error");
        };
        assert!(status.is_none());
        assert!(details.is_none());
    }
}
