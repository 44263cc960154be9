//! Persistence layer for the pending grade alerter.
//!
//! This crate contains:
//! - MySQL connection management
//! - Entity definitions (database row mappings)
//! - The alert configuration repository, which backs the domain `AlertRegistry`

pub mod db;
pub mod entities;
pub mod repositories;
