//! # Notification Sender
//!
//! Delivery of verification links. The workflow only sees the
//! [`NotificationSender`] trait, so tests can capture mail instead of sending it.
//!
//! ## Implementations
//!
//! - [`LogSender`] - Development implementation that writes the email to the log
//! - [`HttpMailSender`] - Production implementation posting to an external mail API
//!
//! Failed deliveries are reported to the caller and never retried.

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Failed to send email: {0}")]
    SendFailed(String),
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Sends one HTML email to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::SendFailed`] when the message could not be handed
    /// to the transport.
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        body_html: &str,
    ) -> Result<(), EmailError>;
}

/// Writes outgoing mail to the log instead of delivering it.
pub struct LogSender;

#[async_trait]
impl NotificationSender for LogSender {
    #[instrument(skip(self, body_html), fields(recipient = %recipient, subject = %subject))]
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        body_html: &str,
    ) -> Result<(), EmailError> {
        info!(body = %body_html, "Mock email (not delivered)");
        Ok(())
    }
}

/// Posts mail to an HTTP email API with basic auth.
pub struct HttpMailSender {
    api_url: String,
    api_key: String,
    sender_email: String,
    http_client: reqwest::Client,
}

impl HttpMailSender {
    pub fn new(mail: &MailConfig) -> Self {
        info!(
            api_url = %mail.api_url,
            sender_email = %mail.sender,
            "Initializing external mail sender"
        );

        Self {
            api_url: mail.api_url.clone(),
            api_key: mail.api_key.clone(),
            sender_email: mail.sender.clone(),
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl NotificationSender for HttpMailSender {
    #[instrument(
        skip(self, body_html),
        fields(
            recipient = %recipient,
            subject = %subject,
            sender = %self.sender_email
        )
    )]
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        body_html: &str,
    ) -> Result<(), EmailError> {
        let payload = json!({
            "to": recipient,
            "from": self.sender_email,
            "subject": subject,
            "content": [{ "type": "text/html", "value": body_html }]
        });

        debug!("Posting email to mail API");
        let response = self
            .http_client
            .post(&self.api_url)
            .basic_auth("api", Some(&self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Network request to mail API failed");
                EmailError::SendFailed(format!("Network request error: {e}"))
            })?;

        let status = response.status();
        if status.is_success() {
            info!("Email accepted by mail API");
            return Ok(());
        }

        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error response body".to_string());
        error!(%status, %error_body, "Mail API returned error");

        Err(EmailError::SendFailed(format!(
            "Mail provider returned {status}: {error_body}"
        )))
    }
}
