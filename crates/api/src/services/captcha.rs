//! reCAPTCHA v3 token verification.
//!
//! Verification failures (including a non-2xx from the verification endpoint
//! or an unparseable body) come back as an unsuccessful verdict; only
//! transport errors propagate as Err.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

const VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Parsed verification result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaptchaVerdict {
    pub success: bool,
    pub score: Option<f64>,
    pub action: Option<String>,
    #[serde(rename = "error-codes")]
    pub error_codes: Option<Vec<String>>,
}

/// CAPTCHA verification service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// Verify a client token against the verification endpoint.
    async fn verify(&self, token: &str) -> Result<CaptchaVerdict>;
}

/// Google reCAPTCHA implementation of CaptchaVerifier.
pub struct RecaptchaVerifier {
    http: reqwest::Client,
    secret: String,
}

impl RecaptchaVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<CaptchaVerdict> {
        let params = [("secret", self.secret.as_str()), ("response", token)];

        let response = self.http.post(VERIFY_URL).form(&params).send().await?;

        if !response.status().is_success() {
            tracing::warn!(
                status = %response.status(),
                "captcha verification endpoint returned an error status"
            );
            return Ok(CaptchaVerdict::default());
        }

        match response.json::<CaptchaVerdict>().await {
            Ok(verdict) => Ok(verdict),
            Err(e) => {
                tracing::warn!("unparseable captcha verification body: {}", e);
                Ok(CaptchaVerdict::default())
            }
        }
    }
}
