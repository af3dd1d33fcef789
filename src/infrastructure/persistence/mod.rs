//! Repository implementations.
//!
//! # Repositories
//!
//! - [`MongoShortUrlRepository`] / [`MongoUserRepository`] - MongoDB-backed storage
//! - [`InMemoryShortUrlRepository`] / [`InMemoryUserRepository`] - process-local
//!   storage for tests and local runs
//!
//! [`mongo`] holds connection bootstrap, index definitions and driver error
//! classification.

pub mod memory_short_url_repository;
pub mod memory_user_repository;
pub mod mongo;
pub mod mongo_short_url_repository;
pub mod mongo_user_repository;

pub use memory_short_url_repository::InMemoryShortUrlRepository;
pub use memory_user_repository::InMemoryUserRepository;
pub use mongo_short_url_repository::MongoShortUrlRepository;
pub use mongo_user_repository::MongoUserRepository;
