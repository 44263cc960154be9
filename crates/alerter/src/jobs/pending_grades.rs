//! Pending grades job.
//!
//! Reads the active alert configurations, checks each assignment for
//! submissions awaiting grading, emails the recipients and stamps the
//! registry row after a confirmed send. Rows are processed one at a time and
//! a failure on one row never stops the others.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use domain::models::{
    split_recipients, AlertConfiguration, Notification, NotificationTemplate, RecipientPolicy,
};
use domain::services::{check_submissions, AlertRegistry, CoursePlatform, Mailer};
use tracing::{error, info, warn, Instrument};

/// Outcome of processing one alert configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertOutcome {
    /// Email accepted by the provider. `recorded` is false when the registry
    /// update failed or was disabled.
    Notified { pending: usize, recorded: bool },
    /// Nothing awaiting grading.
    NoPending,
    /// Recipient list was empty after applying the recipient policy.
    NoRecipients,
    /// The course platform could not be queried.
    CheckFailed(String),
    /// The notification templates failed to render.
    RenderFailed(String),
    /// The email provider rejected or failed the send.
    SendFailed(String),
}

/// Totals for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub alerts: usize,
    pub notified: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &AlertOutcome) {
        self.alerts += 1;
        match outcome {
            AlertOutcome::Notified { .. } => self.notified += 1,
            AlertOutcome::NoPending | AlertOutcome::NoRecipients => self.skipped += 1,
            AlertOutcome::CheckFailed(_)
            | AlertOutcome::RenderFailed(_)
            | AlertOutcome::SendFailed(_) => self.failed += 1,
        }
    }
}

/// One pass over the alert registry.
pub struct PendingGradesJob {
    registry: Arc<dyn AlertRegistry>,
    platform: Arc<dyn CoursePlatform>,
    mailer: Arc<dyn Mailer>,
    template: NotificationTemplate,
    recipient_policy: RecipientPolicy,
    record_runs: bool,
}

impl PendingGradesJob {
    /// Create a new pending grades job.
    pub fn new(
        registry: Arc<dyn AlertRegistry>,
        platform: Arc<dyn CoursePlatform>,
        mailer: Arc<dyn Mailer>,
        template: NotificationTemplate,
        recipient_policy: RecipientPolicy,
    ) -> Self {
        Self {
            registry,
            platform,
            mailer,
            template,
            recipient_policy,
            record_runs: true,
        }
    }

    /// Leave `date_last_ran` untouched (dry runs).
    pub fn without_recording(mut self) -> Self {
        self.record_runs = false;
        self
    }

    pub fn name(&self) -> &'static str {
        "pending_grades"
    }

    /// Processes every active alert configuration.
    ///
    /// A registry that cannot be read yields an empty run.
    pub async fn run(&self) -> RunSummary {
        let start = Instant::now();
        let mut summary = RunSummary::default();

        let alerts = match self.registry.active_alerts().await {
            Ok(alerts) => alerts,
            Err(e) => {
                error!(job = self.name(), error = %e, "Failed to load alert configurations");
                Vec::new()
            }
        };

        info!(job = self.name(), alerts = alerts.len(), "Job starting");

        for alert in &alerts {
            let span = tracing::info_span!(
                "alert",
                course_id = alert.course_id,
                assignment_id = alert.assignment_id
            );
            let outcome = self.process(alert).instrument(span).await;
            summary.record(&outcome);
        }

        info!(
            job = self.name(),
            alerts = summary.alerts,
            notified = summary.notified,
            skipped = summary.skipped,
            failed = summary.failed,
            elapsed_ms = start.elapsed().as_millis(),
            "Job completed"
        );

        summary
    }

    /// Check, notify and record one alert configuration.
    pub async fn process(&self, alert: &AlertConfiguration) -> AlertOutcome {
        let (course_id, assignment_id) = (alert.course_id, alert.assignment_id);

        let check = match check_submissions(self.platform.as_ref(), course_id, assignment_id).await
        {
            Ok(check) => check,
            Err(e) => {
                error!(
                    course_id = course_id,
                    assignment_id = assignment_id,
                    error = %e,
                    "Failed to check submissions"
                );
                return AlertOutcome::CheckFailed(e.to_string());
            }
        };

        if check.pending.is_empty() {
            info!(
                course_id = course_id,
                assignment_id = assignment_id,
                "No submissions awaiting grading"
            );
            return AlertOutcome::NoPending;
        }

        let recipients = split_recipients(&alert.recipients, self.recipient_policy);
        if recipients.is_empty() {
            warn!(
                course_id = course_id,
                assignment_id = assignment_id,
                raw = %alert.recipients,
                "No usable recipients, skipping notification"
            );
            return AlertOutcome::NoRecipients;
        }

        let notification = match Notification::compose(
            &self.template,
            recipients,
            course_id,
            assignment_id,
            &check.assignment_name,
            &check.pending,
        ) {
            Ok(notification) => notification,
            Err(e) => {
                error!(
                    course_id = course_id,
                    assignment_id = assignment_id,
                    error = %e,
                    "Failed to render notification"
                );
                return AlertOutcome::RenderFailed(e.to_string());
            }
        };

        match self.mailer.send(&notification).await {
            Ok(receipt) => {
                info!(
                    course_id = course_id,
                    assignment_id = assignment_id,
                    pending = check.pending.len(),
                    status = receipt.status,
                    "Email sent successfully"
                );
                let recorded = self.record_run(course_id, assignment_id).await;
                AlertOutcome::Notified {
                    pending: check.pending.len(),
                    recorded,
                }
            }
            Err(e) => {
                error!(
                    course_id = course_id,
                    assignment_id = assignment_id,
                    error = %e,
                    "Failed to send notification"
                );
                AlertOutcome::SendFailed(e.to_string())
            }
        }
    }

    /// Stamps `date_last_ran` with the current time. Failures are logged only.
    async fn record_run(&self, course_id: i64, assignment_id: i64) -> bool {
        if !self.record_runs {
            return false;
        }

        let ran_at = Utc::now();
        match self.registry.mark_ran(course_id, assignment_id, ran_at).await {
            Ok(_) => {
                info!(
                    course_id = course_id,
                    assignment_id = assignment_id,
                    ran_at = %ran_at,
                    "Date last ran updated"
                );
                true
            }
            Err(e) => {
                error!(
                    course_id = course_id,
                    assignment_id = assignment_id,
                    error = %e,
                    "Failed to update date_last_ran"
                );
                false
            }
        }
    }
}
