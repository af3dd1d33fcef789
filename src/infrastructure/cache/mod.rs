//! Caching layer for user lookups.
//!
//! Provides a [`UserCache`] trait with two implementations:
//! - [`RedisUserCache`] - Production Redis-backed cache
//! - [`MemoryUserCache`] - Process-local cache

mod memory_cache;
mod redis_cache;
mod service;

pub use memory_cache::MemoryUserCache;
pub use redis_cache::RedisUserCache;
pub use service::{UserCache, user_key};

#[cfg(test)]
pub use service::MockUserCache;
