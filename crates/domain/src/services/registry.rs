//! Alert registry abstraction.
//!
//! The registry is the persistent list of alert configurations. The job reads
//! the active rows once per run and stamps `date_last_ran` after each
//! successful notification.

use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::models::AlertConfiguration;

/// Errors raised by a registry backend.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Registry connection failed: {0}")]
    Connection(String),

    #[error("Registry query failed: {0}")]
    Query(String),
}

/// Persistent store of alert configurations.
#[async_trait::async_trait]
pub trait AlertRegistry: Send + Sync {
    /// Active, non-expired configurations ordered by course then assignment.
    async fn active_alerts(&self) -> Result<Vec<AlertConfiguration>, RegistryError>;

    /// Sets `date_last_ran` on the matching row(s). Returns the number of rows touched.
    async fn mark_ran(
        &self,
        course_id: i64,
        assignment_id: i64,
        ran_at: DateTime<Utc>,
    ) -> Result<u64, RegistryError>;
}

/// In-memory registry for development and testing.
#[derive(Debug, Default)]
pub struct InMemoryAlertRegistry {
    rows: Mutex<Vec<AlertConfiguration>>,
    today: Option<NaiveDate>,
    /// Whether to simulate an unreachable store.
    pub simulate_connection_failure: bool,
    /// Whether to simulate a failing update statement.
    pub simulate_update_failure: bool,
}

impl InMemoryAlertRegistry {
    /// Create a registry holding `rows`, evaluated against the current date.
    pub fn new(rows: Vec<AlertConfiguration>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    /// Create a registry whose every call fails to connect.
    pub fn unreachable() -> Self {
        Self {
            simulate_connection_failure: true,
            ..Default::default()
        }
    }

    /// Evaluate expiration against a fixed date instead of today.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Make every `mark_ran` call fail.
    pub fn with_failing_updates(mut self) -> Self {
        self.simulate_update_failure = true;
        self
    }

    /// Snapshot of the stored rows.
    pub fn rows(&self) -> Vec<AlertConfiguration> {
        self.rows.lock().unwrap().clone()
    }

    /// Current `date_last_ran` of a row, if the row exists.
    pub fn last_ran(&self, course_id: i64, assignment_id: i64) -> Option<Option<DateTime<Utc>>> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.course_id == course_id && r.assignment_id == assignment_id)
            .map(|r| r.date_last_ran)
    }
}

#[async_trait::async_trait]
impl AlertRegistry for InMemoryAlertRegistry {
    async fn active_alerts(&self) -> Result<Vec<AlertConfiguration>, RegistryError> {
        if self.simulate_connection_failure {
            return Err(RegistryError::Connection("simulated connection failure".to_string()));
        }

        let today = self.today.unwrap_or_else(|| Utc::now().date_naive());
        let mut active: Vec<AlertConfiguration> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.is_selectable(today))
            .cloned()
            .collect();
        active.sort_by_key(|r| (r.course_id, r.assignment_id));
        Ok(active)
    }

    async fn mark_ran(
        &self,
        course_id: i64,
        assignment_id: i64,
        ran_at: DateTime<Utc>,
    ) -> Result<u64, RegistryError> {
        if self.simulate_connection_failure {
            return Err(RegistryError::Connection("simulated connection failure".to_string()));
        }
        if self.simulate_update_failure {
            return Err(RegistryError::Query("simulated update failure".to_string()));
        }

        let mut touched = 0;
        for row in self.rows.lock().unwrap().iter_mut() {
            if row.course_id == course_id && row.assignment_id == assignment_id {
                row.date_last_ran = Some(ran_at);
                touched += 1;
            }
        }
        Ok(touched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(course_id: i64, assignment_id: i64, is_active: bool, expires: NaiveDate) -> AlertConfiguration {
        AlertConfiguration {
            course_id,
            assignment_id,
            recipients: "t@x.com".to_string(),
            date_expiration: Some(expires),
            is_active,
            date_last_ran: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_registry_error_display() {
        assert_eq!(
            RegistryError::Connection("refused".to_string()).to_string(),
            "Registry connection failed: refused"
        );
        assert_eq!(
            RegistryError::Query("bad column".to_string()).to_string(),
            "Registry query failed: bad column"
        );
    }

    #[tokio::test]
    async fn test_active_alerts_filters_and_orders() {
        let today = date(2024, 3, 1);
        let registry = InMemoryAlertRegistry::new(vec![
            row(300, 1, true, date(2024, 6, 1)),
            row(100, 9, true, date(2024, 6, 1)),
            row(100, 2, true, date(2024, 6, 1)),
            row(200, 1, false, date(2024, 6, 1)),
            row(400, 1, true, date(2024, 2, 1)),
        ])
        .with_today(today);

        let keys: Vec<(i64, i64)> = registry
            .active_alerts()
            .await
            .unwrap()
            .iter()
            .map(|a| (a.course_id, a.assignment_id))
            .collect();

        assert_eq!(keys, vec![(100, 2), (100, 9), (300, 1)]);
    }

    #[tokio::test]
    async fn test_unreachable_registry() {
        let registry = InMemoryAlertRegistry::unreachable();
        assert!(matches!(
            registry.active_alerts().await,
            Err(RegistryError::Connection(_))
        ));
    }

    #[tokio::test]
    async fn test_mark_ran_updates_matching_row_only() {
        let registry = InMemoryAlertRegistry::new(vec![
            row(100, 200, true, date(2099, 1, 1)),
            row(100, 201, true, date(2099, 1, 1)),
        ]);
        let now = Utc::now();

        let touched = registry.mark_ran(100, 200, now).await.unwrap();

        assert_eq!(touched, 1);
        assert_eq!(registry.last_ran(100, 200), Some(Some(now)));
        assert_eq!(registry.last_ran(100, 201), Some(None));
    }

    #[tokio::test]
    async fn test_failing_updates() {
        let registry =
            InMemoryAlertRegistry::new(vec![row(1, 2, true, date(2099, 1, 1))]).with_failing_updates();
        assert!(registry.mark_ran(1, 2, Utc::now()).await.is_err());
        assert_eq!(registry.last_ran(1, 2), Some(None));
    }
}
