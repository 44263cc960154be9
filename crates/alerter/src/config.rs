use domain::models::{NotificationTemplate, RecipientPolicy, DEFAULT_FOOTER};
use serde::Deserialize;
use shared::validation::{validate_email_address, validate_sql_identifier};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub canvas: CanvasConfig,
    pub database: DatabaseConfig,
    pub email: EmailConfig,
    /// How stored recipient strings are split into addresses
    #[serde(default)]
    pub recipients: RecipientPolicy,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Canvas instance and API access.
#[derive(Debug, Clone, Deserialize)]
pub struct CanvasConfig {
    /// Instance base URL, e.g. https://school.instructure.com
    pub base_url: String,

    /// API access token
    pub token: String,

    /// Page size requested when listing submissions
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,

    #[serde(default = "default_db_port")]
    pub port: u16,

    pub database: String,

    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Table holding the alert configurations
    #[serde(default = "default_table")]
    pub table: String,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Email provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailProvider {
    /// SendGrid v3 mail send API
    Sendgrid,
    /// Log notifications instead of sending them (development)
    Console,
}

/// Email service configuration for pending-grade notifications.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_email_provider")]
    pub provider: EmailProvider,

    /// SendGrid API key (for sendgrid provider)
    #[serde(default)]
    pub sendgrid_api_key: String,

    /// SendGrid mail send endpoint
    #[serde(default = "default_sendgrid_url")]
    pub sendgrid_url: String,

    /// Sender email address (From header)
    pub sender_email: String,

    /// Sender name (From header)
    #[serde(default)]
    pub sender_name: Option<String>,

    /// Observer address blind-copied on every notification
    pub observer_bcc: String,

    /// Line appended below the pending list
    #[serde(default = "default_footer")]
    pub footer: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl EmailConfig {
    /// Fixed parts of every notification.
    pub fn template(&self) -> NotificationTemplate {
        NotificationTemplate {
            sender_email: self.sender_email.clone(),
            sender_name: self.sender_name.clone(),
            observer_bcc: self.observer_bcc.clone(),
            footer: self.footer.clone(),
        }
    }
}

// Default value functions
fn default_per_page() -> u32 {
    100
}
fn default_request_timeout() -> u64 {
    30
}
fn default_db_port() -> u16 {
    3306
}
fn default_table() -> String {
    "caatt".to_string()
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}
fn default_email_provider() -> EmailProvider {
    EmailProvider::Sendgrid
}
fn default_sendgrid_url() -> String {
    "https://api.sendgrid.com/v3/mail/send".to_string()
}
fn default_footer() -> String {
    DEFAULT_FOOTER.to_string()
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            database: config.database.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            table: config.table.clone(),
            connect_timeout_secs: config.connect_timeout_secs,
        }
    }
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. `base` (config/default.toml unless overridden on the command line)
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with GA__ prefix
    /// 4. `overrides`, e.g. from command line flags
    pub fn load(base: &str, overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(base))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("GA").separator("__"));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Builds the config from embedded defaults, without touching the file system.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [canvas]
            base_url = "https://canvas.example.edu"
            token = "test-token"
            per_page = 100
            request_timeout_secs = 30

            [database]
            host = "localhost"
            port = 3306
            database = "alerts"
            username = "alerts"
            password = ""
            table = "caatt"
            connect_timeout_secs = 10

            [email]
            provider = "console"
            sender_email = "alerts@example.edu"
            observer_bcc = "observer@example.edu"

            [logging]
            level = "info"
            format = "pretty"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        // Skip validation in tests to allow partial configs
        Ok(cfg)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.canvas.base_url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "GA__CANVAS__BASE_URL must be set".to_string(),
            ));
        }
        if !self.canvas.base_url.starts_with("https://")
            && !self.canvas.base_url.starts_with("http://")
        {
            return Err(ConfigValidationError::InvalidValue(format!(
                "canvas.base_url must be an http(s) URL, got '{}'",
                self.canvas.base_url
            )));
        }
        if self.canvas.token.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "GA__CANVAS__TOKEN must be set".to_string(),
            ));
        }
        if self.canvas.per_page == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "canvas.per_page must be at least 1".to_string(),
            ));
        }

        for (key, value) in [
            ("database.host", &self.database.host),
            ("database.database", &self.database.database),
            ("database.username", &self.database.username),
        ] {
            if value.is_empty() {
                return Err(ConfigValidationError::MissingRequired(key.to_string()));
            }
        }
        validate_sql_identifier(&self.database.table).map_err(|e| {
            ConfigValidationError::InvalidValue(format!("database.table: {}", e))
        })?;

        validate_email_address(&self.email.sender_email).map_err(|e| {
            ConfigValidationError::InvalidValue(format!("email.sender_email: {}", e))
        })?;
        validate_email_address(&self.email.observer_bcc).map_err(|e| {
            ConfigValidationError::InvalidValue(format!("email.observer_bcc: {}", e))
        })?;
        if self.email.provider == EmailProvider::Sendgrid && self.email.sendgrid_api_key.is_empty()
        {
            return Err(ConfigValidationError::MissingRequired(
                "GA__EMAIL__SENDGRID_API_KEY must be set for the sendgrid provider".to_string(),
            ));
        }

        Ok(())
    }
}
