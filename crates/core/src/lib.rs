//! Domain logic for the prompt job bridge.
//!
//! Everything here is transport-agnostic: the job record and its lifecycle
//! state machine, the in-memory [`store::JobStore`], prompt validation, and
//! the [`execution`] layer that runs the external command. The HTTP surface
//! lives in `bridge-api`; the polling client in `bridge-client`.

pub mod error;
pub mod execution;
pub mod job;
pub mod output;
pub mod store;
pub mod types;
pub mod validation;
pub mod wire;
