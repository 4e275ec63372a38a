use std::sync::Arc;

use crate::{
    config::Config,
    repos::Repos,
    services::{CaptchaVerifier, CompletionService, EmailSender},
    stores::Stores,
};

#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Database repositories.
    pub repos: Repos,
    /// Rate-limit counters (in-memory + optional Redis quota).
    pub stores: Stores,
    /// CAPTCHA verifier; None when no secret is configured.
    pub captcha: Option<Arc<dyn CaptchaVerifier>>,
    /// Chat-completion service; None when no API key is configured.
    pub completion: Option<Arc<dyn CompletionService>>,
    /// Email sender.
    pub email: Arc<dyn EmailSender>,
}
