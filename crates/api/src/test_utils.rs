//! Shared test utilities for API handler tests.
//!
//! Provides common mock factories and a flexible `TestStateBuilder` for
//! constructing `AppState` instances with only the mocks needed for each
//! test. Components left unset get default (expectation-free) mocks, so an
//! unexpected call fails the test loudly.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::test_utils::{TestStateBuilder, mock_lead};
//!
//! let mut repo = MockLeadRepo::new();
//! repo.expect_find_by_email().returning(|_| Ok(None));
//!
//! let state = TestStateBuilder::new().with_lead_repo(repo).build();
//! ```

use std::sync::Arc;

use axum::response::Response;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use uuid::Uuid;

use crate::config::Config;
use crate::models::Lead;
use crate::repos::{MockLeadRepo, Repos};
use crate::services::{
    CaptchaVerdict, CaptchaVerifier, CompletionService, EmailSender, MockCaptchaVerifier,
    MockCompletionService, MockEmailSender,
};
use crate::state::AppState;
use crate::stores::{CooldownTracker, FixedWindowLimiter, MockQuotaStore, Stores};

/// Creates a test configuration with dummy values.
pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 3000,
        database_url: "postgres://test".to_string(),
        redis_url: None,
        smtp_url: None,
        resend_api_key: None,
        recaptcha_secret_key: Some("test-secret".to_string()),
        openai_api_key: Some("test-key".to_string()),
        env: "test".to_string(),
        sentry_dsn: None,
    }
}

/// Creates a mock lead with the given email.
pub fn mock_lead(email: &str) -> Lead {
    Lead {
        id: Uuid::new_v4(),
        email: email.to_string(),
        created_at: Utc::now(),
    }
}

/// Creates a verdict that passes every captcha check.
pub fn passing_verdict() -> CaptchaVerdict {
    CaptchaVerdict {
        success: true,
        score: Some(0.9),
        action: Some("contact_form".to_string()),
        error_codes: None,
    }
}

/// Reads a JSON response body.
pub async fn response_body(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Builder for constructing test `AppState` with custom mocks.
pub struct TestStateBuilder {
    lead_repo: Option<MockLeadRepo>,
    quota: Option<MockQuotaStore>,
    captcha: Option<MockCaptchaVerifier>,
    completion: Option<MockCompletionService>,
    email_sender: Option<MockEmailSender>,
    captcha_configured: bool,
    completion_configured: bool,
}

impl TestStateBuilder {
    /// Creates a new builder with no mocks configured.
    pub fn new() -> Self {
        Self {
            lead_repo: None,
            quota: None,
            captcha: None,
            completion: None,
            email_sender: None,
            captcha_configured: true,
            completion_configured: true,
        }
    }

    pub fn with_lead_repo(mut self, repo: MockLeadRepo) -> Self {
        self.lead_repo = Some(repo);
        self
    }

    pub fn with_quota(mut self, quota: MockQuotaStore) -> Self {
        self.quota = Some(quota);
        self
    }

    pub fn with_captcha(mut self, captcha: MockCaptchaVerifier) -> Self {
        self.captcha = Some(captcha);
        self
    }

    pub fn with_completion(mut self, completion: MockCompletionService) -> Self {
        self.completion = Some(completion);
        self
    }

    pub fn with_email_sender(mut self, sender: MockEmailSender) -> Self {
        self.email_sender = Some(sender);
        self
    }

    /// Simulate a missing CAPTCHA secret.
    pub fn without_captcha(mut self) -> Self {
        self.captcha_configured = false;
        self
    }

    /// Simulate a missing completion API key.
    pub fn without_completion(mut self) -> Self {
        self.completion_configured = false;
        self
    }

    /// Builds the `AppState` using configured mocks or defaults.
    pub fn build(self) -> AppState {
        let repos = Repos {
            leads: Arc::new(self.lead_repo.unwrap_or_else(MockLeadRepo::new)),
        };

        let stores = Stores {
            lead_ip: Arc::new(FixedWindowLimiter::new(Duration::seconds(60), 10)),
            email_cooldown: Arc::new(CooldownTracker::new(Duration::seconds(60))),
            quota: Arc::new(self.quota.unwrap_or_else(default_quota)),
        };

        let captcha = self.captcha_configured.then(|| {
            Arc::new(self.captcha.unwrap_or_else(MockCaptchaVerifier::new))
                as Arc<dyn CaptchaVerifier>
        });
        let completion = self.completion_configured.then(|| {
            Arc::new(self.completion.unwrap_or_else(MockCompletionService::new))
                as Arc<dyn CompletionService>
        });
        let email = Arc::new(self.email_sender.unwrap_or_else(MockEmailSender::new))
            as Arc<dyn EmailSender>;

        AppState {
            config: test_config(),
            repos,
            stores,
            captcha,
            completion,
            email,
        }
    }
}

impl Default for TestStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates a default quota mock that always reports the first hit of the day.
fn default_quota() -> MockQuotaStore {
    let mut quota = MockQuotaStore::new();
    quota.expect_hit_daily().returning(|_, _| Ok(1));
    quota
}
