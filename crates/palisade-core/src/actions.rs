//! Power-menu action configuration rows.

use serde::{Deserialize, Serialize};

/// One named, user-toggleable power-menu action and its enabled state.
///
/// The ordered sequence of entries is owned by the session daemon's
/// power-actions service; clients receive point-in-time snapshots and
/// never cache them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEntry {
    pub name: String,
    pub enabled: bool,
}

impl ActionEntry {
    pub fn new(name: impl Into<String>, enabled: bool) -> Self {
        Self {
            name: name.into(),
            enabled,
        }
    }
}

/// Derive the user-visible ordered list of enabled action names from a
/// configuration snapshot.
///
/// Order is preserved from the snapshot, which the service keeps in the
/// canonical power-menu display order.
pub fn enabled_names(entries: &[ActionEntry]) -> Vec<String> {
    entries
        .iter()
        .filter(|entry| entry.enabled)
        .map(|entry| entry.name.clone())
        .collect()
}
