//! Shared client-side types for the Palisade sandboxed desktop session.
//!
//! This crate holds the pieces of the session platform that in-process
//! code consumes directly: the power-menu action configuration rows
//! exchanged with the session daemon, and the permission override gate
//! consulted on every self permission-check. Nothing here performs I/O;
//! the daemon transport lives in `palisade-daemon-client`.

pub mod actions;
pub mod permissions;

pub use actions::{enabled_names, ActionEntry};
pub use permissions::{
    check_permission_for, check_self_permission, should_spoof_self_check, CompatShim,
    PermissionQuery, NETWORK_PERMISSION,
};
