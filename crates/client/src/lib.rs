//! HTTP client for the Codex bridge.
//!
//! Used by command-line and chat bridges that submit prompts and poll for
//! the result. The server never pushes; [`BridgeClient::wait_for_job`]
//! implements the polling side.

pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod wait;

pub use client::BridgeClient;
pub use config::ClientConfig;
pub use error::ClientError;
pub use wait::{WaitOutcome, WaitPolicy};
