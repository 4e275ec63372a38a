use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

#[derive(Debug)]
pub enum AppError {
    /// Internal errors - logged but return generic 500 to user
    Internal(anyhow::Error),
    /// User-facing errors - message is safe to show
    External(StatusCode, &'static str),
    /// Validation errors - safe to show
    Validation(String),
    /// Rate/cooldown errors with a dynamic message
    RateLimited(String),
    /// Upstream completion API failures, surfaced as 502 with diagnostics
    Upstream {
        status: Option<u16>,
        details: Option<Value>,
    },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Internal(err) => {
                tracing::error!("internal error: {:?}", err);
                sentry::capture_error(
                    err.as_ref() as &(dyn std::error::Error + Send + Sync + 'static)
                );

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
            AppError::External(status, msg) => {
                (status, Json(json!({ "error": msg }))).into_response()
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            AppError::RateLimited(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, Json(json!({ "error": msg }))).into_response()
            }
            AppError::Upstream { status, details } => {
                let mut body = serde_json::Map::new();
                body.insert("error".to_string(), json!("Upstream OpenAI error"));
                if let Some(status) = status {
                    body.insert("status".to_string(), json!(status));
                }
                if let Some(details) = details {
                    body.insert("details".to_string(), details);
                }

                (StatusCode::BAD_GATEWAY, Json(Value::Object(body))).into_response()
            }
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}
