//! Waitlist lead intake.
//!
//! Pipeline, short-circuiting at the first failure:
//! 1. Honeypot fields (any non-blank value means a bot)
//! 2. Per-IP fixed window, 10 requests / 60 s
//! 3. Email normalization + format validation
//! 4. Per-email 60 s cooldown
//! 5. reCAPTCHA verification (success, score >= 0.5, action match)
//! 6. Duplicate check (idempotent success, no second insert)
//! 7. Insert with a database-generated timestamp
//! 8. Cooldown start + best-effort confirmation email
//!
//! The confirmation email never fails the request; its errors are logged
//! and swallowed.

use axum::{
    Json, Router, debug_handler, extract::State, http::StatusCode, response::IntoResponse,
    routing::post,
};
use chrono::Utc;
use domus_shared::api::{LeadPayload, LeadResponse};
use garde::Validate;

use crate::{error::AppError, middleware::client_ip::ClientIp, state::AppState};

/// Expected reCAPTCHA action when the client does not send one.
const DEFAULT_ACTION: &str = "contact_form";
/// Minimum acceptable reCAPTCHA v3 score.
const MIN_SCORE: f64 = 0.5;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(submit_lead))
}

#[debug_handler]
async fn submit_lead(
    ip: ClientIp,
    State(state): State<AppState>,
    Json(mut payload): Json<LeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();

    // Hidden form fields; any value means an automated submission.
    if payload.honeypot_value().is_some() {
        tracing::warn!("lead rejected: honeypot field filled");
        return Err(AppError::External(
            StatusCode::BAD_REQUEST,
            "Invalid submission",
        ));
    }

    if ip.is_known() && !state.stores.lead_ip.hit(&ip.0, now).is_allowed() {
        return Err(AppError::External(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests. Try again later.",
        ));
    }

    payload.email = payload.email.trim().to_lowercase();
    payload
        .validate()
        .map_err(|_| AppError::Validation("Invalid email".to_string()))?;
    let email = payload.email.clone();

    if let Some(secs) = state.stores.email_cooldown.remaining_secs(&email, now) {
        return Err(AppError::RateLimited(format!(
            "Please wait {}s before submitting this email again",
            secs
        )));
    }

    let Some(captcha) = state.captcha.as_ref() else {
        tracing::error!("lead submission received but no captcha secret is configured");
        return Err(AppError::External(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Captcha not configured",
        ));
    };

    if payload.token.is_empty() {
        return Err(AppError::External(
            StatusCode::BAD_REQUEST,
            "Missing captcha token",
        ));
    }

    let verdict = captcha.verify(&payload.token).await?;
    if !verdict.success {
        tracing::warn!(codes = ?verdict.error_codes, "captcha verification failed");
        return Err(AppError::External(
            StatusCode::BAD_REQUEST,
            "Captcha verification failed",
        ));
    }
    if let Some(score) = verdict.score
        && score < MIN_SCORE
    {
        tracing::warn!(score, "captcha score below threshold");
        return Err(AppError::External(
            StatusCode::BAD_REQUEST,
            "Captcha score too low",
        ));
    }
    let expected_action = payload.action.as_deref().unwrap_or(DEFAULT_ACTION);
    if let Some(action) = verdict.action.as_deref()
        && action != expected_action
    {
        tracing::warn!(expected = expected_action, got = action, "captcha action mismatch");
        return Err(AppError::External(
            StatusCode::BAD_REQUEST,
            "Captcha action mismatch",
        ));
    }

    // Check-then-act on purpose: concurrent first submissions of one email
    // can both pass this check (see DESIGN.md).
    if state.repos.leads.find_by_email(&email).await?.is_some() {
        return Ok(Json(LeadResponse {
            ok: true,
            message: "Already registered".to_string(),
        }));
    }

    let lead = state.repos.leads.create(&email).await?;
    state.stores.email_cooldown.touch(&email, now);

    if let Err(e) = state.email.send_waitlist_confirmation(&email).await {
        tracing::warn!(email = %email, "confirmation email failed: {:#}", e);
    }

    tracing::info!(lead_id = %lead.id, email = %email, "lead captured");

    Ok(Json(LeadResponse {
        ok: true,
        message: "Thanks — we will connect you with an agent shortly.".to_string(),
    }))
}
