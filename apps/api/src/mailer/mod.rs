//! Outbound email. Every message the service sends goes through a `Mailer`;
//! production wires in `SendGridMailer`, tests swap in `RecordingMailer`.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const SENDGRID_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub from: String,
    pub reply_to: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct SendGridRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    reply_to: Address<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

impl<'a> From<&'a OutgoingEmail> for SendGridRequest<'a> {
    fn from(email: &'a OutgoingEmail) -> Self {
        SendGridRequest {
            personalizations: vec![Personalization {
                to: vec![Address { email: &email.to }],
            }],
            from: Address { email: &email.from },
            reply_to: Address {
                email: &email.reply_to,
            },
            subject: &email.subject,
            content: vec![Content {
                content_type: "text/html",
                value: &email.html,
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct SendGridErrors {
    errors: Vec<SendGridErrorBody>,
}

#[derive(Debug, Deserialize)]
struct SendGridErrorBody {
    message: String,
}

/// SendGrid v3 transport. One attempt per message, no retries.
#[derive(Clone)]
pub struct SendGridMailer {
    client: Client,
    api_key: String,
}

impl SendGridMailer {
    pub fn new(api_key: String) -> Result<Self, MailError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            api_key,
        })
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let response = self
            .client
            .post(SENDGRID_API_URL)
            .bearer_auth(&self.api_key)
            .json(&SendGridRequest::from(email))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<SendGridErrors>(&body)
                .ok()
                .and_then(|e| e.errors.into_iter().next())
                .map(|e| e.message)
                .unwrap_or(body);
            warn!("SendGrid returned {status}: {message}");
            return Err(MailError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Email '{}' accepted for delivery to {}", email.subject, email.to);
        Ok(())
    }
}

/// Keeps every message instead of sending it.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingMailer {
    sent: std::sync::Mutex<Vec<OutgoingEmail>>,
    fail: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_all(&self) {
        self.fail.store(true, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(MailError::Api {
                status: 503,
                message: "mail transport unavailable".to_string(),
            });
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sendgrid_payload_shape() {
        let email = OutgoingEmail {
            to: "org@example.com".to_string(),
            subject: "Hello".to_string(),
            html: "<p>Hi</p>".to_string(),
            from: "noreply@jobnest.test".to_string(),
            reply_to: "help@jobnest.test".to_string(),
        };

        let json = serde_json::to_value(SendGridRequest::from(&email)).unwrap();

        assert_eq!(json["personalizations"][0]["to"][0]["email"], "org@example.com");
        assert_eq!(json["from"]["email"], "noreply@jobnest.test");
        assert_eq!(json["reply_to"]["email"], "help@jobnest.test");
        assert_eq!(json["content"][0]["type"], "text/html");
        assert_eq!(json["content"][0]["value"], "<p>Hi</p>");
    }

    #[tokio::test]
    async fn test_recording_mailer_captures_and_fails_on_demand() {
        let mailer = RecordingMailer::default();
        let email = OutgoingEmail {
            to: "a@example.com".to_string(),
            subject: "s".to_string(),
            html: "h".to_string(),
            from: "f@example.com".to_string(),
            reply_to: "r@example.com".to_string(),
        };

        mailer.send(&email).await.unwrap();
        mailer.fail_all();
        assert!(mailer.send(&email).await.is_err());
        assert_eq!(mailer.sent(), vec![email]);
    }
}
