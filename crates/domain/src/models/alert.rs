//! Alert configuration domain model.

use chrono::{DateTime, NaiveDate, Utc};

/// A registry row naming one course assignment to monitor and who to notify.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertConfiguration {
    pub course_id: i64,
    pub assignment_id: i64,
    /// Comma-separated recipient addresses, exactly as stored.
    pub recipients: String,
    pub date_expiration: Option<NaiveDate>,
    pub is_active: bool,
    pub date_last_ran: Option<DateTime<Utc>>,
}

impl AlertConfiguration {
    /// Whether this row should be processed on `today`.
    ///
    /// Mirrors the registry query: active and expiring strictly after today.
    /// A missing expiration date never matches.
    pub fn is_selectable(&self, today: NaiveDate) -> bool {
        self.is_active && self.date_expiration.is_some_and(|expires| expires > today)
    }
}
