//! Domain models for pending grade alerts.

pub mod alert;
pub mod notification;
pub mod recipients;
pub mod submission;

pub use alert::AlertConfiguration;
pub use notification::{Notification, NotificationTemplate, DEFAULT_FOOTER};
pub use recipients::{split_recipients, RecipientPolicy};
pub use submission::{
    pending_submissions, speed_grader_link, Assignment, Course, PendingSubmission, Submission,
    WorkflowState, GRADE_LINK_LABEL,
};
