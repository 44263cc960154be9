//! Submission check: find submissions awaiting grading for one assignment.

use tracing::debug;

use crate::models::{pending_submissions, PendingSubmission};

use super::course_platform::{CoursePlatform, PlatformError};

/// Result of checking one assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCheck {
    pub assignment_name: String,
    pub pending: Vec<PendingSubmission>,
}

/// Resolves the course and assignment, lists all submissions and keeps the
/// ones in `submitted` state.
pub async fn check_submissions(
    platform: &dyn CoursePlatform,
    course_id: i64,
    assignment_id: i64,
) -> Result<PendingCheck, PlatformError> {
    let course = platform.course(course_id).await?;
    let assignment = platform.assignment(course_id, assignment_id).await?;
    let submissions = platform.submissions(course_id, assignment_id).await?;

    let pending = pending_submissions(platform.base_url(), &course, &assignment, &submissions);

    debug!(
        course_id = course_id,
        assignment_id = assignment_id,
        total = submissions.len(),
        pending = pending.len(),
        "Checked submissions"
    );

    Ok(PendingCheck {
        assignment_name: assignment.name,
        pending,
    })
}
