use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Redis URL for the durable daily quota counter. When unset the quota
    /// falls back to an in-process counter that resets on restart.
    #[serde(default)]
    pub redis_url: Option<String>,
    /// SMTP URL for development email (e.g., smtp://localhost:1025)
    #[serde(default)]
    pub smtp_url: Option<String>,
    /// Resend API key for production email
    #[serde(default)]
    pub resend_api_key: Option<String>,
    /// reCAPTCHA v3 server secret. The lead endpoint answers 500 when unset.
    #[serde(default)]
    pub recaptcha_secret_key: Option<String>,
    /// OpenAI API key. The assistant endpoint answers 500 when unset.
    #[serde(default)]
    pub openai_api_key: Option<String>,
    /// Set to "production" for JSON logging, anything else for human-readable.
    #[serde(default)]
    pub env: String,
    /// Sentry DSN for error tracking
    #[serde(default)]
    pub sentry_dsn: Option<String>,
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.env == "production"
    }
}
