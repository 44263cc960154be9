//! Course, assignment and submission models.

use serde::{Deserialize, Serialize};

/// Link text shown next to each student in a notification.
pub const GRADE_LINK_LABEL: &str = "Click here to grade";

/// Workflow state of a submission as reported by the course platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkflowState {
    Submitted,
    Unsubmitted,
    Graded,
    PendingReview,
    Other(String),
}

impl WorkflowState {
    pub fn as_str(&self) -> &str {
        match self {
            WorkflowState::Submitted => "submitted",
            WorkflowState::Unsubmitted => "unsubmitted",
            WorkflowState::Graded => "graded",
            WorkflowState::PendingReview => "pending_review",
            WorkflowState::Other(state) => state,
        }
    }

    /// Only `submitted` counts as awaiting grading.
    pub fn is_awaiting_grade(&self) -> bool {
        matches!(self, WorkflowState::Submitted)
    }
}

impl From<&str> for WorkflowState {
    fn from(state: &str) -> Self {
        match state {
            "submitted" => WorkflowState::Submitted,
            "unsubmitted" => WorkflowState::Unsubmitted,
            "graded" => WorkflowState::Graded,
            "pending_review" => WorkflowState::PendingReview,
            other => WorkflowState::Other(other.to_string()),
        }
    }
}

impl From<String> for WorkflowState {
    fn from(state: String) -> Self {
        WorkflowState::from(state.as_str())
    }
}

impl From<WorkflowState> for String {
    fn from(state: WorkflowState) -> Self {
        state.as_str().to_string()
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A course on the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: i64,
    pub name: Option<String>,
}

/// An assignment within a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub id: i64,
    pub course_id: i64,
    pub name: String,
}

/// One student's submission for an assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub user_id: i64,
    pub workflow_state: WorkflowState,
    /// Display name of the student, when the platform included user info.
    pub student_name: Option<String>,
}

/// A submission awaiting grading, ready to be listed in a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingSubmission {
    pub student_name: String,
    pub grading_link: String,
    pub label: &'static str,
}

/// Builds the SpeedGrader deep link for one student's submission.
pub fn speed_grader_link(
    base_url: &str,
    course_id: i64,
    assignment_id: i64,
    student_id: i64,
) -> String {
    format!(
        "{}/courses/{}/gradebook/speed_grader?assignment_id={}&student_id={}",
        base_url.trim_end_matches('/'),
        course_id,
        assignment_id,
        student_id
    )
}

/// Selects the submissions awaiting grading and annotates them with grading links.
pub fn pending_submissions(
    base_url: &str,
    course: &Course,
    assignment: &Assignment,
    submissions: &[Submission],
) -> Vec<PendingSubmission> {
    submissions
        .iter()
        .filter(|s| s.workflow_state.is_awaiting_grade())
        .map(|s| PendingSubmission {
            student_name: s
                .student_name
                .clone()
                .unwrap_or_else(|| format!("Student {}", s.user_id)),
            grading_link: speed_grader_link(base_url, course.id, assignment.id, s.user_id),
            label: GRADE_LINK_LABEL,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(user_id: i64, state: &str, name: Option<&str>) -> Submission {
        Submission {
            user_id,
            workflow_state: WorkflowState::from(state),
            student_name: name.map(str::to_string),
        }
    }

    fn course() -> Course {
        Course {
            id: 100,
            name: Some("Biology 101".to_string()),
        }
    }

    fn assignment() -> Assignment {
        Assignment {
            id: 200,
            course_id: 100,
            name: "Lab Report 1".to_string(),
        }
    }

    #[test]
    fn test_workflow_state_parsing() {
        assert_eq!(WorkflowState::from("submitted"), WorkflowState::Submitted);
        assert_eq!(WorkflowState::from("graded"), WorkflowState::Graded);
        assert_eq!(
            WorkflowState::from("pending_review"),
            WorkflowState::PendingReview
        );
        assert_eq!(
            WorkflowState::from("complete"),
            WorkflowState::Other("complete".to_string())
        );
    }

    #[test]
    fn test_workflow_state_display() {
        assert_eq!(WorkflowState::Submitted.to_string(), "submitted");
        assert_eq!(WorkflowState::PendingReview.to_string(), "pending_review");
        assert_eq!(WorkflowState::Other("x".to_string()).to_string(), "x");
    }

    #[test]
    fn test_only_submitted_awaits_grade() {
        assert!(WorkflowState::Submitted.is_awaiting_grade());
        assert!(!WorkflowState::Graded.is_awaiting_grade());
        assert!(!WorkflowState::PendingReview.is_awaiting_grade());
        assert!(!WorkflowState::Unsubmitted.is_awaiting_grade());
        assert!(!WorkflowState::from("Submitted").is_awaiting_grade());
    }

    #[test]
    fn test_speed_grader_link() {
        assert_eq!(
            speed_grader_link("https://canvas.example.edu", 100, 200, 42),
            "https://canvas.example.edu/courses/100/gradebook/speed_grader?assignment_id=200&student_id=42"
        );
    }

    #[test]
    fn test_speed_grader_link_trailing_slash() {
        assert_eq!(
            speed_grader_link("https://canvas.example.edu/", 1, 2, 3),
            "https://canvas.example.edu/courses/1/gradebook/speed_grader?assignment_id=2&student_id=3"
        );
    }

    #[test]
    fn test_pending_submissions_filters_by_state() {
        let submissions = vec![
            submission(1, "submitted", Some("Ada Lovelace")),
            submission(2, "graded", Some("Alan Turing")),
            submission(3, "pending_review", Some("Grace Hopper")),
            submission(4, "unsubmitted", Some("Edsger Dijkstra")),
        ];

        let pending = pending_submissions(
            "https://canvas.example.edu",
            &course(),
            &assignment(),
            &submissions,
        );

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].student_name, "Ada Lovelace");
        assert_eq!(pending[0].label, GRADE_LINK_LABEL);
        assert!(pending[0].grading_link.ends_with("assignment_id=200&student_id=1"));
    }

    #[test]
    fn test_pending_submissions_missing_name() {
        let submissions = vec![submission(7, "submitted", None)];
        let pending = pending_submissions("https://c.edu", &course(), &assignment(), &submissions);
        assert_eq!(pending[0].student_name, "Student 7");
    }

    #[test]
    fn test_pending_submissions_empty() {
        let pending = pending_submissions("https://c.edu", &course(), &assignment(), &[]);
        assert!(pending.is_empty());
    }
}
