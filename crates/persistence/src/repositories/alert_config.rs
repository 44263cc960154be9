//! Alert configuration repository implementation.

use std::time::Duration;

use chrono::{DateTime, Utc};
use domain::models::AlertConfiguration;
use domain::services::{AlertRegistry, RegistryError};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::Connection;
use tracing::{debug, warn};

use crate::db::{self, DatabaseConfig};
use crate::entities::AlertConfigEntity;

/// Repository for alert configuration database operations.
///
/// Holds connection parameters only; each public operation opens its own
/// connection and closes it before returning.
#[derive(Clone)]
pub struct AlertConfigRepository {
    options: MySqlConnectOptions,
    table: String,
    connect_timeout: Duration,
}

impl AlertConfigRepository {
    /// Creates a new repository from database configuration.
    ///
    /// `config.table` is interpolated into statements and must already have
    /// passed identifier validation.
    pub fn new(config: &DatabaseConfig) -> Self {
        Self::with_options(
            db::connect_options(config),
            &config.table,
            Duration::from_secs(config.connect_timeout_secs),
        )
    }

    /// Creates a repository from prebuilt connect options.
    pub fn with_options(
        options: MySqlConnectOptions,
        table: &str,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            options,
            table: table.to_string(),
            connect_timeout,
        }
    }

    /// Opens a fresh connection to the registry database.
    pub async fn open(&self) -> Result<MySqlConnection, sqlx::Error> {
        db::connect(&self.options, self.connect_timeout).await
    }

    /// Finds all active alert configurations that expire after today.
    pub async fn find_active(
        &self,
        conn: &mut MySqlConnection,
    ) -> Result<Vec<AlertConfigEntity>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT
                CAST(course_id AS SIGNED) AS course_id,
                CAST(assignment_id AS SIGNED) AS assignment_id,
                recipients,
                CAST(date_expiration AS DATE) AS date_expiration,
                CAST(isactive AS SIGNED) AS is_active,
                date_last_ran
            FROM {}
            WHERE date_expiration > CURDATE() AND isactive = 1
            ORDER BY course_id, assignment_id
            "#,
            self.table
        );

        sqlx::query_as::<_, AlertConfigEntity>(&sql)
            .fetch_all(&mut *conn)
            .await
    }

    /// Sets `date_last_ran` for a course assignment. Returns the number of rows updated.
    pub async fn touch_last_ran(
        &self,
        conn: &mut MySqlConnection,
        course_id: i64,
        assignment_id: i64,
        ran_at: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE {}
            SET date_last_ran = ?
            WHERE course_id = ? AND assignment_id = ?
            "#,
            self.table
        );

        let result = sqlx::query(&sql)
            .bind(ran_at)
            .bind(course_id)
            .bind(assignment_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }
}

async fn close(conn: MySqlConnection) {
    if let Err(e) = conn.close().await {
        debug!(error = %e, "Error closing registry connection");
    }
}

#[async_trait::async_trait]
impl AlertRegistry for AlertConfigRepository {
    async fn active_alerts(&self) -> Result<Vec<AlertConfiguration>, RegistryError> {
        let mut conn = self
            .open()
            .await
            .map_err(|e| RegistryError::Connection(e.to_string()))?;

        let rows = self.find_active(&mut conn).await;
        close(conn).await;

        let rows = rows.map_err(|e| RegistryError::Query(e.to_string()))?;
        debug!(count = rows.len(), "Loaded active alert configurations");
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn mark_ran(
        &self,
        course_id: i64,
        assignment_id: i64,
        ran_at: DateTime<Utc>,
    ) -> Result<u64, RegistryError> {
        let mut conn = self
            .open()
            .await
            .map_err(|e| RegistryError::Connection(e.to_string()))?;

        let touched = self
            .touch_last_ran(&mut conn, course_id, assignment_id, ran_at)
            .await;
        close(conn).await;

        let touched = touched.map_err(|e| RegistryError::Query(e.to_string()))?;
        if touched == 0 {
            warn!(
                course_id = course_id,
                assignment_id = assignment_id,
                "No registry row matched when recording last run"
            );
        }
        Ok(touched)
    }
}
