//! Email sending abstraction.
//!
//! Uses Resend in production, SMTP (lettre) in development.
//! This allows local development without a Resend account.

use anyhow::Result;
use async_trait::async_trait;
use lettre::{
    Message, SmtpTransport, Transport,
    message::{Mailbox, header::ContentType},
};
use resend_rs::types::CreateEmailBaseOptions;

const FROM_NAME: &str = "Domus AI";
const FROM_ADDRESS: &str = "noreply@mail.domusai.app";
const SUBJECT: &str = "You're on the Domus AI waitlist";
const BODY: &str = "Thanks for joining the Domus AI waitlist.\n\nWe will connect you with an agent shortly. Until then, feel free to reply to this email with any questions about buying, selling, or investing.";

/// Email sending service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send the waitlist confirmation email.
    async fn send_waitlist_confirmation(&self, to: &str) -> Result<()>;
}

/// Email sender choosing a transport at construction.
pub enum EmailSenderImpl {
    /// SMTP-based sender using lettre (for development)
    Smtp(SmtpSender),
    /// Resend API sender (for production)
    Resend(ResendSender),
}

impl EmailSenderImpl {
    /// Create a new email sender based on config.
    /// Uses Resend if api key is provided, otherwise falls back to SMTP.
    pub fn new(resend_api_key: Option<String>, smtp_url: Option<String>) -> Result<Self> {
        if let Some(api_key) = resend_api_key.filter(|k| !k.is_empty()) {
            Ok(Self::Resend(ResendSender::new(api_key)))
        } else if let Some(url) = smtp_url.filter(|u| !u.is_empty()) {
            Ok(Self::Smtp(SmtpSender::new(url)?))
        } else {
            anyhow::bail!("Either RESEND_API_KEY or SMTP_URL must be configured")
        }
    }
}

#[async_trait]
impl EmailSender for EmailSenderImpl {
    async fn send_waitlist_confirmation(&self, to: &str) -> Result<()> {
        match self {
            Self::Resend(sender) => sender.send_waitlist_confirmation(to).await,
            Self::Smtp(sender) => sender.send_waitlist_confirmation(to),
        }
    }
}

/// SMTP sender using lettre.
pub struct SmtpSender {
    transport: SmtpTransport,
}

impl SmtpSender {
    pub fn new(smtp_url: String) -> Result<Self> {
        let transport = SmtpTransport::from_url(&smtp_url)?.build();

        Ok(Self { transport })
    }

    pub fn send_waitlist_confirmation(&self, to: &str) -> Result<()> {
        let email = Message::builder()
            .from(Mailbox::new(
                Some(FROM_NAME.to_owned()),
                FROM_ADDRESS.parse()?,
            ))
            .to(Mailbox::new(None, to.parse()?))
            .subject(SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(BODY.to_string())?;

        self.transport.send(&email)?;

        Ok(())
    }
}

/// Resend API sender.
pub struct ResendSender {
    client: resend_rs::Resend,
}

impl ResendSender {
    pub fn new(api_key: String) -> Self {
        Self {
            client: resend_rs::Resend::new(&api_key),
        }
    }

    pub async fn send_waitlist_confirmation(&self, to: &str) -> Result<()> {
        let email = CreateEmailBaseOptions::new(
            format!("{} <{}>", FROM_NAME, FROM_ADDRESS),
            [to],
            SUBJECT,
        )
        .with_text(BODY);

        self.client.emails.send(email).await?;

        Ok(())
    }
}
