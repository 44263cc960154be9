//! Pending-grade notification model and HTML rendering.
//!
//! Subject and body are rendered from handlebars templates. Interpolated
//! values are HTML-escaped in the body; the subject and the configured footer
//! are inserted verbatim.

use handlebars::{Handlebars, RenderError, TemplateError};
use lazy_static::lazy_static;
use serde::Serialize;

use super::submission::PendingSubmission;

/// Footer appended below the pending list unless configured otherwise.
pub const DEFAULT_FOOTER: &str = "(Email sent via FDMS)";

const SUBJECT_TEMPLATE: &str = "subject";
const PENDING_LIST_TEMPLATE: &str = "pending_list";
const BODY_TEMPLATE: &str = "body";

lazy_static! {
    static ref TEMPLATES: Handlebars<'static> =
        notification_templates().expect("notification templates must parse");
}

/// Registers the subject, pending list and body templates.
pub fn register_templates(registry: &mut Handlebars<'_>) -> Result<(), TemplateError> {
    registry.register_template_string(
        SUBJECT_TEMPLATE,
        r#"Grading Required: New Submissions for "{{{assignment_name}}}""#,
    )?;

    registry.register_template_string(
        PENDING_LIST_TEMPLATE,
        r#"<ul>{{#each pending}}<li>{{student_name}} - <a href='{{grading_link}}'>{{label}}</a></li>{{/each}}</ul>"#,
    )?;

    registry.register_template_string(
        BODY_TEMPLATE,
        "<h3>The following students have ungraded submissions for \"{{assignment_name}}\":</h3>\n{{> pending_list}}<br>{{{footer}}}<br>",
    )?;

    Ok(())
}

fn notification_templates() -> Result<Handlebars<'static>, TemplateError> {
    let mut registry = Handlebars::new();
    register_templates(&mut registry)?;
    Ok(registry)
}

#[derive(Serialize)]
struct MessageData<'a> {
    assignment_name: &'a str,
    pending: &'a [PendingSubmission],
    footer: &'a str,
}

/// Fixed parts of every notification, taken from configuration.
#[derive(Debug, Clone)]
pub struct NotificationTemplate {
    pub sender_email: String,
    pub sender_name: Option<String>,
    /// Observer address blind-copied on every notification.
    pub observer_bcc: String,
    pub footer: String,
}

/// A single email announcing ungraded submissions for one assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub course_id: i64,
    pub assignment_id: i64,
    pub sender_email: String,
    pub sender_name: Option<String>,
    pub to: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub html_body: String,
    pub click_tracking: bool,
}

impl Notification {
    /// Builds the notification for one assignment's pending submissions.
    ///
    /// The observer is blind-copied unless already among the direct recipients.
    pub fn compose(
        template: &NotificationTemplate,
        to: Vec<String>,
        course_id: i64,
        assignment_id: i64,
        assignment_name: &str,
        pending: &[PendingSubmission],
    ) -> Result<Self, RenderError> {
        let observer_is_recipient = to
            .iter()
            .any(|r| r.trim().eq_ignore_ascii_case(template.observer_bcc.trim()));
        let bcc = if observer_is_recipient {
            Vec::new()
        } else {
            vec![template.observer_bcc.clone()]
        };

        Ok(Self {
            course_id,
            assignment_id,
            sender_email: template.sender_email.clone(),
            sender_name: template.sender_name.clone(),
            to,
            bcc,
            subject: subject_for(assignment_name)?,
            html_body: render_body(assignment_name, pending, &template.footer)?,
            click_tracking: false,
        })
    }
}

/// Subject line for an assignment's notification.
pub fn subject_for(assignment_name: &str) -> Result<String, RenderError> {
    TEMPLATES.render(
        SUBJECT_TEMPLATE,
        &MessageData {
            assignment_name,
            pending: &[],
            footer: "",
        },
    )
}

/// Renders pending submissions as an HTML unordered list.
pub fn render_pending_list(pending: &[PendingSubmission]) -> Result<String, RenderError> {
    TEMPLATES.render(
        PENDING_LIST_TEMPLATE,
        &MessageData {
            assignment_name: "",
            pending,
            footer: "",
        },
    )
}

/// Renders the full HTML body: heading, pending list and footer.
pub fn render_body(
    assignment_name: &str,
    pending: &[PendingSubmission],
    footer: &str,
) -> Result<String, RenderError> {
    TEMPLATES.render(
        BODY_TEMPLATE,
        &MessageData {
            assignment_name,
            pending,
            footer,
        },
    )
}
