//! Canvas LMS REST client.
//!
//! Implements the domain `CoursePlatform` over the Canvas v1 API, following
//! `Link: <...>; rel="next"` headers until every page has been read.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use domain::models::{Assignment, Course, Submission, WorkflowState};
use domain::services::{CoursePlatform, PlatformError};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::header::LINK;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::CanvasConfig;

/// Path of the REST API below the instance base URL.
const API_PREFIX: &str = "/api/v1";

/// Longest error body kept in a `PlatformError`.
const MAX_ERROR_BODY: usize = 512;

lazy_static! {
    static ref NEXT_LINK_REGEX: Regex =
        Regex::new(r#"<([^>]*)>\s*;\s*rel="?next"?\s*(?:[,;]|$)"#).unwrap();
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct CanvasCourse {
    id: i64,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CanvasAssignment {
    id: i64,
    #[serde(default)]
    course_id: Option<i64>,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CanvasSubmission {
    user_id: i64,
    workflow_state: WorkflowState,
    #[serde(default)]
    user: Option<CanvasUser>,
}

#[derive(Debug, Deserialize)]
struct CanvasUser {
    #[serde(default)]
    name: Option<String>,
}

impl From<CanvasSubmission> for Submission {
    fn from(s: CanvasSubmission) -> Self {
        Self {
            user_id: s.user_id,
            workflow_state: s.workflow_state,
            student_name: s.user.and_then(|u| u.name),
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// Client for one Canvas instance.
pub struct CanvasClient {
    client: Client,
    base_url: String,
    token: String,
    per_page: u32,
}

impl CanvasClient {
    /// Create a client from configuration.
    pub fn new(config: &CanvasConfig) -> Result<Self, PlatformError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| PlatformError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            per_page: config.per_page,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    /// GET one page. Returns the decoded body and the next page URL, if any.
    async fn get_page<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<(T, Option<String>), PlatformError> {
        debug!(url = %url, "Canvas request");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| PlatformError::Request(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PlatformError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            truncate_at_char_boundary(&mut body, MAX_ERROR_BODY);
            warn!(status = %status, url = %url, "Canvas API error");
            return Err(PlatformError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        let next = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_link);

        let body = response
            .json::<T>()
            .await
            .map_err(|e| PlatformError::Decode(e.to_string()))?;

        Ok((body, next))
    }

    /// GET a single object.
    async fn get_one<T: DeserializeOwned>(&self, url: &str) -> Result<T, PlatformError> {
        self.get_page(url).await.map(|(body, _)| body)
    }

    /// GET every page of a list endpoint.
    ///
    /// Stops with an error if a `next` link points back at a page already read.
    async fn get_all<T: DeserializeOwned>(&self, first_url: String) -> Result<Vec<T>, PlatformError> {
        let mut items = Vec::new();
        let mut visited = HashSet::new();
        let mut url = first_url;

        loop {
            let (page, next): (Vec<T>, Option<String>) = self.get_page(&url).await?;
            items.extend(page);
            visited.insert(url);

            match next {
                Some(next) if visited.contains(&next) => {
                    warn!(url = %next, pages = visited.len(), "Canvas pagination loops back");
                    return Err(PlatformError::Pagination(next));
                }
                Some(next) => url = next,
                None => break,
            }
        }

        debug!(pages = visited.len(), items = items.len(), "Canvas list complete");
        Ok(items)
    }

    fn submissions_url(&self, course_id: i64, assignment_id: i64) -> String {
        format!(
            "{}?include[]=user&per_page={}",
            self.api_url(&format!(
                "/courses/{}/assignments/{}/submissions",
                course_id, assignment_id
            )),
            self.per_page
        )
    }
}

#[async_trait]
impl CoursePlatform for CanvasClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn course(&self, course_id: i64) -> Result<Course, PlatformError> {
        let course: CanvasCourse = self
            .get_one(&self.api_url(&format!("/courses/{}", course_id)))
            .await?;
        Ok(Course {
            id: course.id,
            name: course.name,
        })
    }

    async fn assignment(
        &self,
        course_id: i64,
        assignment_id: i64,
    ) -> Result<Assignment, PlatformError> {
        let assignment: CanvasAssignment = self
            .get_one(&self.api_url(&format!(
                "/courses/{}/assignments/{}",
                course_id, assignment_id
            )))
            .await?;
        Ok(Assignment {
            id: assignment.id,
            course_id: assignment.course_id.unwrap_or(course_id),
            name: assignment.name,
        })
    }

    async fn submissions(
        &self,
        course_id: i64,
        assignment_id: i64,
    ) -> Result<Vec<Submission>, PlatformError> {
        let submissions: Vec<CanvasSubmission> = self
            .get_all(self.submissions_url(course_id, assignment_id))
            .await?;
        Ok(submissions.into_iter().map(Into::into).collect())
    }
}

/// Extracts the `rel="next"` target from a `Link` header value.
///
/// URLs may themselves contain commas, so the header is matched as a whole
/// rather than split into links first.
pub fn next_link(header: &str) -> Option<String> {
    NEXT_LINK_REGEX
        .captures_iter(header)
        .next()
        .map(|caps| caps[1].to_string())
}

fn truncate_at_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}
