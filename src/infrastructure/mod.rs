//! Infrastructure layer for external integrations.
//!
//! # Modules
//!
//! - [`cache`] - User cache (Redis and in-memory implementations)
//! - [`persistence`] - MongoDB and in-memory repository implementations

pub mod cache;
pub mod persistence;
