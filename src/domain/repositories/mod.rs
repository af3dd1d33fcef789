//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! via `mockall` for service tests.
//!
//! # Available Repositories
//!
//! - [`ShortUrlRepository`] - Short URL records with atomic visit counting
//! - [`UserRepository`] - Registered users

pub mod short_url_repository;
pub mod user_repository;

pub use short_url_repository::ShortUrlRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use short_url_repository::MockShortUrlRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
