//! Repository implementations for database operations.

pub mod alert_config;

pub use alert_config::AlertConfigRepository;
