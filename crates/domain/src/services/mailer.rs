//! Mailer abstraction for dispatching notifications.

use std::sync::Mutex;

use thiserror::Error;

use crate::models::Notification;

/// Errors that can occur while dispatching a notification.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Provider returned {status}: {body}")]
    Provider { status: u16, body: String },
}

/// Confirmation returned by the provider for an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// HTTP status the provider answered with.
    pub status: u16,
    /// Provider-assigned message id, when the provider returns one.
    pub message_id: Option<String>,
}

/// Transactional email provider.
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    /// Send one notification. `Ok` means the provider accepted the message.
    async fn send(&self, notification: &Notification) -> Result<DeliveryReceipt, MailError>;
}

/// Mock mailer for development and testing.
///
/// Records notifications instead of sending them.
#[derive(Debug, Default)]
pub struct MockMailer {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
    sent: Mutex<Vec<Notification>>,
}

impl MockMailer {
    /// Create a new mock mailer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock mailer whose every send fails.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Default::default()
        }
    }

    /// Notifications accepted so far.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Mailer for MockMailer {
    async fn send(&self, notification: &Notification) -> Result<DeliveryReceipt, MailError> {
        if self.simulate_failure {
            tracing::warn!(
                course_id = notification.course_id,
                assignment_id = notification.assignment_id,
                "Mock mailer simulating failure"
            );
            return Err(MailError::Provider {
                status: 500,
                body: "Simulated failure".to_string(),
            });
        }

        self.sent.lock().unwrap().push(notification.clone());
        Ok(DeliveryReceipt {
            status: 202,
            message_id: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification() -> Notification {
        Notification {
            course_id: 1,
            assignment_id: 2,
            sender_email: "alerts@example.edu".to_string(),
            sender_name: None,
            to: vec!["t@x.com".to_string()],
            bcc: vec![],
            subject: "s".to_string(),
            html_body: "<ul></ul>".to_string(),
            click_tracking: false,
        }
    }

    #[test]
    fn test_mail_error_display() {
        let err = MailError::Provider {
            status: 400,
            body: "bad request".to_string(),
        };
        assert_eq!(err.to_string(), "Provider returned 400: bad request");
        assert_eq!(
            MailError::NotConfigured.to_string(),
            "Email service not configured"
        );
    }

    #[tokio::test]
    async fn test_mock_mailer_records() {
        let mailer = MockMailer::new();
        let receipt = mailer.send(&notification()).await.unwrap();
        assert_eq!(receipt.status, 202);
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_mailer_failing() {
        let mailer = MockMailer::failing();
        assert!(mailer.send(&notification()).await.is_err());
        assert!(mailer.sent().is_empty());
    }
}
