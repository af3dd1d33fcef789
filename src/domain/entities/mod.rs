//! Core domain entities.
//!
//! - [`ShortUrl`] - A short code mapped to a target URL, owned by a user
//! - [`User`] - A registered user, read on every authenticated request
//!
//! Entities follow the "New Type" pattern with separate structs for creation
//! (`ShortUrlDraft` / `NewShortUrl`, `NewUser`).

pub mod short_url;
pub mod user;

pub use short_url::{NewShortUrl, ShortUrl, ShortUrlDraft};
pub use user::{InvalidUserId, NewUser, User, UserId};
