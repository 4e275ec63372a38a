//! External service abstractions.
//!
//! This module contains traits and implementations for external services
//! that the API depends on. Each service is abstracted behind a trait to
//! enable mocking in tests.
//!
//! ## Services
//!
//! - **captcha** - reCAPTCHA v3 token verification
//! - **assistant** - chat completion via the OpenAI Responses API
//! - **email** - transactional email via Resend (prod) or SMTP (dev)
//!
//! ## Usage in Handlers
//!
//! Services are accessed via `AppState`:
//!
//! ```ignore
//! async fn handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
//!     let verdict = captcha.verify(&payload.token).await?;
//!     let raw = completion.complete(&message).await?;
//!     state.email.send_waitlist_confirmation(&email).await?;
//! }
//! ```

mod assistant;
mod captcha;
mod email;

pub use assistant::{CompletionError, CompletionService, OpenAiCompletion};
pub use captcha::{CaptchaVerdict, CaptchaVerifier, RecaptchaVerifier};
pub use email::{EmailSender, EmailSenderImpl};

#[cfg(test)]
pub use assistant::MockCompletionService;
#[cfg(test)]
pub use captcha::MockCaptchaVerifier;
#[cfg(test)]
pub use email::MockEmailSender;
