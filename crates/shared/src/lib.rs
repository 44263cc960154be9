//! Shared utilities and common types for the pending grade alerter.
//!
//! This crate provides common functionality used across all other crates:
//! - Email address and SQL identifier validation

pub mod validation;
