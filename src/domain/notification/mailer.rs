//! Outbound e-mail through an HTTP mail relay
//!
//! The relay receives `{from, to, subject, html}` as JSON with a bearer key.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const RELAY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum MailError {
    /// Worth retrying (network, timeout, 429, 5xx)
    #[error("transient mail failure: {0}")]
    Transient(String),
    /// Retrying cannot help (bad address, rejected payload)
    #[error("permanent mail failure: {0}")]
    Permanent(String),
}

impl MailError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, MailError::Transient(_))
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

#[derive(Debug, Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Mail relay client
#[derive(Debug, Clone)]
pub struct HttpMailer {
    relay_url: String,
    api_key: String,
    from: String,
    client: Client,
}

impl HttpMailer {
    pub fn new(
        relay_url: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(RELAY_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to build mail client with timeout, using defaults");
                Client::new()
            });

        Self {
            relay_url: relay_url.into(),
            api_key: api_key.into(),
            from: from.into(),
            client,
        }
    }
}

/// Map relay HTTP status to a delivery outcome
pub fn classify_status(status: StatusCode) -> Result<(), MailError> {
    if status.is_success() {
        Ok(())
    } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        Err(MailError::Transient(format!("relay responded {}", status)))
    } else {
        Err(MailError::Permanent(format!("relay responded {}", status)))
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    #[instrument(skip(self, message), fields(to = %message.to))]
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let payload = RelayPayload {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .client
            .post(&self.relay_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MailError::Transient(e.to_string()))?;

        classify_status(response.status())?;
        debug!("Mail accepted by relay");
        Ok(())
    }
}

/// Used when no relay is configured: logs instead of sending
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        info!(to = %message.to, subject = %message.subject, "Mail relay disabled, e-mail logged only");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_status_should_be_delivered() {
        assert!(classify_status(StatusCode::ACCEPTED).is_ok());
    }

    #[test]
    fn throttling_and_server_errors_should_be_retryable() {
        for status in [
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            let err = classify_status(status).unwrap_err();
            assert!(err.is_retryable(), "{}", status);
        }
    }

    #[test]
    fn client_errors_should_be_permanent() {
        let err = classify_status(StatusCode::UNPROCESSABLE_ENTITY).unwrap_err();

        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn log_mailer_should_always_succeed() {
        let message = EmailMessage {
            to: "founder@daftar.os".to_string(),
            subject: "hi".to_string(),
            html: "<p>hi</p>".to_string(),
        };

        assert!(LogMailer.send(&message).await.is_ok());
    }
}
