//! Common fixtures for the integration tests.
//!
//! Everything here runs in-process: the domain mocks stand in for the
//! database, and `http::TestServer` stands in for Canvas and SendGrid.

#![allow(dead_code)]

pub mod http;

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use domain::models::{AlertConfiguration, NotificationTemplate, RecipientPolicy, DEFAULT_FOOTER};
use domain::services::{InMemoryAlertRegistry, MockCoursePlatform, MockMailer};
use grade_alert::jobs::PendingGradesJob;

pub const CANVAS_URL: &str = "https://canvas.example.edu";
pub const SENDER: &str = "alerts@example.edu";
pub const OBSERVER: &str = "observer@example.edu";

/// An expiration date comfortably in the future.
pub fn next_month() -> NaiveDate {
    (Utc::now() + Duration::days(30)).date_naive()
}

/// An active, non-expired alert row.
pub fn alert(course_id: i64, assignment_id: i64, recipients: &str) -> AlertConfiguration {
    AlertConfiguration {
        course_id,
        assignment_id,
        recipients: recipients.to_string(),
        date_expiration: Some(next_month()),
        is_active: true,
        date_last_ran: None,
    }
}

pub fn template() -> NotificationTemplate {
    NotificationTemplate {
        sender_email: SENDER.to_string(),
        sender_name: None,
        observer_bcc: OBSERVER.to_string(),
        footer: DEFAULT_FOOTER.to_string(),
    }
}

/// The wired-up job plus handles on its collaborators.
pub struct TestHarness {
    pub registry: Arc<InMemoryAlertRegistry>,
    pub platform: Arc<MockCoursePlatform>,
    pub mailer: Arc<MockMailer>,
    pub job: PendingGradesJob,
}

impl TestHarness {
    pub fn new(
        registry: InMemoryAlertRegistry,
        platform: MockCoursePlatform,
        mailer: MockMailer,
    ) -> Self {
        Self::with_policy(registry, platform, mailer, RecipientPolicy::default())
    }

    pub fn with_policy(
        registry: InMemoryAlertRegistry,
        platform: MockCoursePlatform,
        mailer: MockMailer,
        policy: RecipientPolicy,
    ) -> Self {
        let registry = Arc::new(registry);
        let platform = Arc::new(platform);
        let mailer = Arc::new(mailer);
        let job = PendingGradesJob::new(
            registry.clone(),
            platform.clone(),
            mailer.clone(),
            template(),
            policy,
        );

        Self {
            registry,
            platform,
            mailer,
            job,
        }
    }
}
