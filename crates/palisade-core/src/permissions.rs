//! Self permission-check override gate.
//!
//! Sandboxed apps ask the session runtime "do I hold permission P" before
//! using a gated capability. For two classes of app the truthful answer is
//! the wrong one:
//!
//! - Legacy apps whose manifests declare network access but that predate
//!   revocable network permission. They were written assuming the grant is
//!   unconditional and tend to crash on an unexpected denial, so they must
//!   keep observing "granted" even after the user revoked it. Apps that
//!   acknowledge revocability get the true answer.
//! - Apps running under a compatibility shim, whose policy table may force
//!   a "granted" answer for specific permissions.
//!
//! The gate is evaluated on every self-check entry point before the true
//! grant state is computed; when it fires, the true computation is skipped
//! entirely. It is a pure function of the query and never fails.

use tracing::trace;

/// Permission name for outbound network access.
pub const NETWORK_PERMISSION: &str = "palisade.permission.NETWORK";

/// Compatibility-shim policy consulted for forced permission grants.
///
/// Implementations own their decision tables; the gate only decides
/// whether to consult them. An inactive shim is never asked.
pub trait CompatShim {
    /// Whether the compatibility mode is enabled for this process.
    fn is_active(&self) -> bool;

    /// Whether a "granted" answer must be forced for `permission`.
    fn force_grant(&self, permission: &str) -> bool;
}

/// One self permission-check, with the ambient process state the gate
/// needs. Constructed per call and never stored.
#[derive(Clone, Copy)]
pub struct PermissionQuery<'a> {
    /// Permission being checked.
    pub permission: &'a str,
    /// The app manifest declares use of network access.
    pub declares_network: bool,
    /// The app has marked itself aware that the network permission is
    /// revocable at runtime.
    pub aware_of_revocable_network: bool,
    /// Compatibility shim, present only when one is attached to the
    /// process.
    pub shim: Option<&'a dyn CompatShim>,
}

/// Whether the true result of this self-check must be replaced with
/// "granted".
pub fn should_spoof_self_check(query: &PermissionQuery<'_>) -> bool {
    if query.permission == NETWORK_PERMISSION
        && query.declares_network
        && !query.aware_of_revocable_network
    {
        return true;
    }

    if let Some(shim) = query.shim {
        if shim.is_active() && shim.force_grant(query.permission) {
            return true;
        }
    }

    false
}

/// Check-by-name entry point.
///
/// Consults the gate first; when it fires, `real_check` is skipped
/// entirely and "granted" is returned.
pub fn check_self_permission(
    query: &PermissionQuery<'_>,
    real_check: impl FnOnce() -> bool,
) -> bool {
    if should_spoof_self_check(query) {
        trace!(
            permission = query.permission,
            "self permission check overridden to granted"
        );
        return true;
    }
    real_check()
}

/// Check-by-pid/uid entry point.
///
/// The override only applies when `(pid, uid)` identify the calling
/// process itself; checks on behalf of other processes always run the
/// real computation.
pub fn check_permission_for(
    query: &PermissionQuery<'_>,
    pid: u32,
    uid: u32,
    real_check: impl FnOnce() -> bool,
) -> bool {
    if is_self(pid, uid) {
        return check_self_permission(query, real_check);
    }
    real_check()
}

#[cfg(unix)]
fn is_self(pid: u32, uid: u32) -> bool {
    pid == std::process::id() && uid == unsafe { libc::getuid() }
}

#[cfg(not(unix))]
fn is_self(pid: u32, _uid: u32) -> bool {
    pid == std::process::id()
}
