//! Email service for sending pending-grade notifications.
//!
//! Supports two providers:
//! - `sendgrid`: Uses the SendGrid v3 mail send API
//! - `console`: Logs emails to console (development and dry runs)

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain::models::Notification;
use domain::services::{DeliveryReceipt, MailError, Mailer};
use reqwest::Client;
use tracing::{debug, error, info};

use crate::config::{EmailConfig, EmailProvider};

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
    client: Client,
}

impl EmailService {
    /// Creates a new EmailService with the given configuration.
    pub fn new(config: EmailConfig) -> Result<Self, MailError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| MailError::SendFailed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Console provider - logs email to console (for development).
    async fn send_console(&self, message: &Notification) -> Result<DeliveryReceipt, MailError> {
        info!(
            to = ?message.to,
            bcc = ?message.bcc,
            from = %message.sender_email,
            subject = %message.subject,
            course_id = message.course_id,
            assignment_id = message.assignment_id,
            "Email (console provider)"
        );

        debug!(body_html = %message.html_body, "Email body (HTML)");

        Ok(DeliveryReceipt {
            status: 200,
            message_id: None,
        })
    }

    /// SendGrid provider - sends via SendGrid API.
    async fn send_sendgrid(&self, message: &Notification) -> Result<DeliveryReceipt, MailError> {
        if self.config.sendgrid_api_key.is_empty() {
            return Err(MailError::NotConfigured);
        }

        let body = sendgrid_payload(message);

        let response = self
            .client
            .post(&self.config.sendgrid_url)
            .bearer_auth(&self.config.sendgrid_api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MailError::SendFailed(format!("SendGrid request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            let message_id = response
                .headers()
                .get("x-message-id")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            info!(
                to = ?message.to,
                subject = %message.subject,
                status = status.as_u16(),
                message_id = ?message_id,
                "Email sent via SendGrid"
            );
            Ok(DeliveryReceipt {
                status: status.as_u16(),
                message_id,
            })
        } else {
            let error_body = response.text().await.unwrap_or_default();
            error!(
                status = %status,
                error = %error_body,
                "SendGrid API error"
            );
            Err(MailError::Provider {
                status: status.as_u16(),
                body: error_body,
            })
        }
    }
}

#[async_trait]
impl Mailer for EmailService {
    async fn send(&self, notification: &Notification) -> Result<DeliveryReceipt, MailError> {
        match self.config.provider {
            EmailProvider::Console => self.send_console(notification).await,
            EmailProvider::Sendgrid => self.send_sendgrid(notification).await,
        }
    }
}

/// Builds the SendGrid v3 request body for a notification.
pub fn sendgrid_payload(message: &Notification) -> serde_json::Value {
    let to: Vec<serde_json::Value> = message
        .to
        .iter()
        .map(|email| serde_json::json!({ "email": email }))
        .collect();

    let mut personalization = serde_json::json!({ "to": to });
    if !message.bcc.is_empty() {
        let bcc: Vec<serde_json::Value> = message
            .bcc
            .iter()
            .map(|email| serde_json::json!({ "email": email }))
            .collect();
        personalization["bcc"] = serde_json::json!(bcc);
    }

    let mut from = serde_json::json!({ "email": message.sender_email });
    if let Some(name) = &message.sender_name {
        from["name"] = serde_json::json!(name);
    }

    serde_json::json!({
        "personalizations": [personalization],
        "from": from,
        "subject": message.subject,
        "content": [{
            "type": "text/html",
            "value": message.html_body
        }],
        "tracking_settings": {
            "click_tracking": {
                "enable": message.click_tracking,
                "enable_text": message.click_tracking
            }
        }
    })
}
