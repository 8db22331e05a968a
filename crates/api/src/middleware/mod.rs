//! Request extractors.
//!
//! - [`auth::Authenticated`] -- Requires a valid shared-secret credential.

pub mod auth;
