//! Course platform abstraction.
//!
//! Provides the read-only view of courses, assignments and submissions the
//! submission check needs.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use thiserror::Error;

use crate::models::{Assignment, Course, Submission, WorkflowState};

/// Errors raised by a course platform client.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Platform request failed: {0}")]
    Request(String),

    #[error("Platform returned {status} for {url}: {body}")]
    Status { status: u16, url: String, body: String },

    #[error("Invalid response from platform: {0}")]
    Decode(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Pagination loops back to {0}")]
    Pagination(String),
}

/// Read access to a learning-management platform.
#[async_trait::async_trait]
pub trait CoursePlatform: Send + Sync {
    /// Web base URL used to build grading links.
    fn base_url(&self) -> &str;

    /// Fetch a course by id.
    async fn course(&self, course_id: i64) -> Result<Course, PlatformError>;

    /// Fetch an assignment by id.
    async fn assignment(&self, course_id: i64, assignment_id: i64)
        -> Result<Assignment, PlatformError>;

    /// List every submission of an assignment, with student names when available.
    async fn submissions(
        &self,
        course_id: i64,
        assignment_id: i64,
    ) -> Result<Vec<Submission>, PlatformError>;
}

/// Mock course platform for development and testing.
///
/// Records every `(course_id, assignment_id)` pair whose submissions were listed.
#[derive(Debug, Default)]
pub struct MockCoursePlatform {
    base_url: String,
    assignments: HashMap<(i64, i64), (String, Vec<Submission>)>,
    failing: HashSet<(i64, i64)>,
    calls: Mutex<Vec<(i64, i64)>>,
}

impl MockCoursePlatform {
    /// Create an empty mock platform.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Register an assignment and its submissions as `(user_id, state, name)` triples.
    pub fn with_assignment(
        mut self,
        course_id: i64,
        assignment_id: i64,
        name: &str,
        submissions: &[(i64, &str, &str)],
    ) -> Self {
        let submissions = submissions
            .iter()
            .map(|(user_id, state, student)| Submission {
                user_id: *user_id,
                workflow_state: WorkflowState::from(*state),
                student_name: Some(student.to_string()),
            })
            .collect();
        self.assignments
            .insert((course_id, assignment_id), (name.to_string(), submissions));
        self
    }

    /// Make every call for this pair fail with a server error.
    pub fn failing_for(mut self, course_id: i64, assignment_id: i64) -> Self {
        self.failing.insert((course_id, assignment_id));
        self
    }

    /// Pairs whose submissions were listed, in call order.
    pub fn calls(&self) -> Vec<(i64, i64)> {
        self.calls.lock().unwrap().clone()
    }

    fn check_failure(&self, course_id: i64, assignment_id: i64) -> Result<(), PlatformError> {
        if self.failing.contains(&(course_id, assignment_id)) {
            return Err(PlatformError::Status {
                status: 500,
                url: format!("/courses/{}/assignments/{}", course_id, assignment_id),
                body: "simulated failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl CoursePlatform for MockCoursePlatform {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn course(&self, course_id: i64) -> Result<Course, PlatformError> {
        if self.assignments.keys().any(|(c, _)| *c == course_id) {
            Ok(Course {
                id: course_id,
                name: None,
            })
        } else {
            Err(PlatformError::NotFound(format!("course {}", course_id)))
        }
    }

    async fn assignment(
        &self,
        course_id: i64,
        assignment_id: i64,
    ) -> Result<Assignment, PlatformError> {
        self.check_failure(course_id, assignment_id)?;
        self.assignments
            .get(&(course_id, assignment_id))
            .map(|(name, _)| Assignment {
                id: assignment_id,
                course_id,
                name: name.clone(),
            })
            .ok_or_else(|| PlatformError::NotFound(format!("assignment {}", assignment_id)))
    }

    async fn submissions(
        &self,
        course_id: i64,
        assignment_id: i64,
    ) -> Result<Vec<Submission>, PlatformError> {
        self.calls.lock().unwrap().push((course_id, assignment_id));
        self.check_failure(course_id, assignment_id)?;
        self.assignments
            .get(&(course_id, assignment_id))
            .map(|(_, submissions)| submissions.clone())
            .ok_or_else(|| PlatformError::NotFound(format!("assignment {}", assignment_id)))
    }
}
