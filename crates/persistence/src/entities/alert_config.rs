//! Alert configuration database entity.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Database entity for the alert configuration table.
///
/// Integer and date columns are cast in the select list so the row decodes
/// the same way whatever exact column types the table was created with.
#[derive(Debug, Clone, FromRow)]
pub struct AlertConfigEntity {
    pub course_id: i64,
    pub assignment_id: i64,
    pub recipients: Option<String>,
    pub date_expiration: Option<NaiveDate>,
    pub is_active: i64,
    pub date_last_ran: Option<DateTime<Utc>>,
}

impl From<AlertConfigEntity> for domain::models::AlertConfiguration {
    fn from(entity: AlertConfigEntity) -> Self {
        Self {
            course_id: entity.course_id,
            assignment_id: entity.assignment_id,
            recipients: entity.recipients.unwrap_or_default(),
            date_expiration: entity.date_expiration,
            is_active: entity.is_active != 0,
            date_last_ran: entity.date_last_ran,
        }
    }
}
