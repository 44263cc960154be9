//! Domain layer for the pending grade alerter.
//!
//! This crate contains:
//! - Domain models (alert configurations, submissions, notifications)
//! - Service traits for the registry, the course platform and the mailer,
//!   each with an in-memory implementation for tests
//! - The submission check that turns platform data into pending items

pub mod models;
pub mod services;
