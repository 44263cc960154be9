//! Database connection management.
//!
//! Connections are opened per logical operation and closed right after, so
//! no pool is kept for the lifetime of a run.

use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::ConnectOptions;
use std::time::Duration;

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    /// Table holding the alert configurations.
    pub table: String,
    pub connect_timeout_secs: u64,
}

/// Builds MySQL connect options from the configuration.
pub fn connect_options(config: &DatabaseConfig) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.database)
        .username(&config.username)
        .password(&config.password)
}

/// Opens a single MySQL connection, giving up after `timeout`.
pub async fn connect(
    options: &MySqlConnectOptions,
    timeout: Duration,
) -> Result<MySqlConnection, sqlx::Error> {
    match tokio::time::timeout(timeout, options.connect()).await {
        Ok(result) => result,
        Err(_) => Err(sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            format!("connection attempt timed out after {:?}", timeout),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DatabaseConfig {
        DatabaseConfig {
            host: "127.0.0.1".to_string(),
            // Nothing listens on port 1.
            port: 1,
            database: "alerts".to_string(),
            username: "alerts".to_string(),
            password: "secret".to_string(),
            table: "caatt".to_string(),
            connect_timeout_secs: 2,
        }
    }

    #[tokio::test]
    async fn test_connect_refused_is_an_error() {
        let config = config();
        let result = connect(
            &connect_options(&config),
            Duration::from_secs(config.connect_timeout_secs),
        )
        .await;
        assert!(result.is_err());
    }
}
