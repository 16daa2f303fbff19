//! Client library for Palisade session daemon services.
//!
//! Session services live in a separate, longer-lived daemon process and
//! are reached over Unix domain sockets under the user's runtime
//! directory. This crate owns the lazy process-wide handle registry and
//! the typed clients built on top of it.
//!
//! Binding is strictly lazy and permanent: the first resolution of a
//! service publishes its handle for the rest of the process lifetime.
//! There are no retries, no reconnects, and no staleness detection: a
//! handle whose service died stays broken until the process restarts, and
//! callers see typed call failures rather than silent fallbacks.

pub mod client;
pub mod error;
pub mod registry;

pub use client::{PowerActionsClient, POWER_ACTIONS_SERVICE};
pub use error::{ClientError, ClientResult, TransportError};
pub use registry::{
    is_service_available, resolve, resolve_at, service_socket_path, ServiceHandle,
};
