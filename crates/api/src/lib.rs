//! Codex bridge HTTP server library.
//!
//! Exposes the building blocks (config, state, error handling, routes, the
//! worker engine) so integration tests and the binary entrypoint can both
//! access them.

pub mod auth;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod state;
