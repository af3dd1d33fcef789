//! Domain layer containing business entities, repository contracts and the
//! shared error taxonomy.
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`errors`] - [`errors::CoreError`] kinds every backend failure maps into
//!
//! The domain layer has no dependencies on infrastructure or presentation layers.

pub mod entities;
pub mod errors;
pub mod repositories;
