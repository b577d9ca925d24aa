//! Transactional email
//!
//! [`ResendMailer`] posts to the Resend HTTP API. Without an API key the
//! server uses [`LogMailer`], which only logs the message (development).

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Serialize;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

/// A message ready to send
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

pub type MailResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[async_trait]
pub trait Mailer: Send + Sync + std::fmt::Debug {
    async fn send(&self, email: OutgoingEmail) -> MailResult;
}

/// Password reset message (link valid for 30 minutes)
pub fn password_reset_email(to: &str, display_name: &str, href: &str) -> OutgoingEmail {
    OutgoingEmail {
        to: to.to_string(),
        subject: "Reset your password".to_string(),
        html: format!(
            "<p>Hi {display_name},</p>\
             <p>Click the button below to reset your password (valid for 30 minutes):</p>\
             <p><a href=\"{href}\" style=\"display:inline-block;padding:10px 16px;background:#2563eb;\
             color:#fff;border-radius:8px;text-decoration:none\">Reset Password</a></p>\
             <p>Or copy this link: {href}</p>"
        ),
        text: format!(
            "Hi {display_name},\n\n\
             Reset your password (valid for 30 minutes):\n{href}\n"
        ),
    }
}

// ============================================================================
// Resend
// ============================================================================

#[derive(Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    from: String,
}

impl std::fmt::Debug for ResendMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendMailer")
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

impl ResendMailer {
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            from: from.into(),
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: OutgoingEmail) -> MailResult {
        let body = ResendRequest {
            from: &self.from,
            to: [&email.to],
            subject: &email.subject,
            html: &email.html,
            text: &email.text,
        };
        let resp = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(format!("Resend rejected email ({status}): {detail}").into());
        }

        tracing::info!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

// ============================================================================
// Development / tests
// ============================================================================

/// Logs messages instead of sending them
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> MailResult {
        tracing::warn!(
            to = %email.to,
            subject = %email.subject,
            body = %email.text,
            "Email delivery not configured; message logged only"
        );
        Ok(())
    }
}

/// Keeps messages in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryMailer {
    outbox: Arc<Mutex<Vec<OutgoingEmail>>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.outbox.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, email: OutgoingEmail) -> MailResult {
        self.outbox
            .lock()
            .map_err(|_| "outbox lock poisoned")?
            .push(email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_email_carries_the_link() {
        let email = password_reset_email(
            "ann@example.com",
            "Ann",
            "http://localhost:3000/reset-password?token=abc",
        );
        assert_eq!(email.subject, "Reset your password");
        assert!(email.html.contains("href=\"http://localhost:3000/reset-password?token=abc\""));
        assert!(email.text.contains("token=abc"));
    }

    #[tokio::test]
    async fn memory_mailer_records_messages() {
        let mailer = MemoryMailer::new();
        mailer
            .send(password_reset_email("a@example.com", "A", "http://x/reset-password?token=t"))
            .await
            .unwrap();
        assert_eq!(mailer.sent().len(), 1);
        assert_eq!(mailer.sent()[0].to, "a@example.com");
    }
}
