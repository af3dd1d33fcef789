//! Helpers shared across layers.
//!
//! - [`base62`] - Short code codec
//! - [`code_generator`] - Machine-partitioned identifier sequence
//! - [`url_validator`] - Target URL checks
//! - [`client_ip`] - Rate limiter key extraction
//! - [`timeout`] - Deadline wrapper for backend calls

pub mod base62;
pub mod client_ip;
pub mod code_generator;
pub mod timeout;
pub mod url_validator;
