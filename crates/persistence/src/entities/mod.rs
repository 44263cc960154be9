//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod alert_config;

pub use alert_config::AlertConfigEntity;
