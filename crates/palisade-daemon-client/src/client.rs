//! Typed client for the session daemon's power-actions service.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tokio::sync::OnceCell;

use palisade_core::ActionEntry;

use crate::error::{ClientError, ClientResult, TransportError};
use crate::registry::{self, ServiceHandle};

/// Name of the session service that owns power-menu action configuration.
pub const POWER_ACTIONS_SERVICE: &str = "power-actions";

/// Client for the power-menu action configuration owned by the session
/// daemon.
///
/// The remote service is authoritative for action names, ordering, and
/// persistence; this client holds no cache of values, only the resolved
/// handle. Construction attempts resolution exactly once and records the
/// outcome: a client built while the service was unreachable stays
/// unavailable for the life of the process and never re-resolves.
pub struct PowerActionsClient {
    service: String,
    handle: Option<Arc<ServiceHandle>>,
}

static INSTANCE: OnceCell<PowerActionsClient> = OnceCell::const_new();

impl PowerActionsClient {
    /// Process-wide client instance.
    ///
    /// Resolution is attempted on first use only. If the service was
    /// unreachable then, every operation on the instance fails with
    /// [`ClientError::ServiceUnavailable`] until the process restarts.
    pub async fn instance() -> &'static PowerActionsClient {
        INSTANCE.get_or_init(Self::connect).await
    }

    /// Connect to the default power-actions service.
    pub async fn connect() -> Self {
        let handle = registry::resolve(POWER_ACTIONS_SERVICE).await.ok();
        Self {
            service: POWER_ACTIONS_SERVICE.to_string(),
            handle,
        }
    }

    /// Connect against an explicit service name and socket path.
    pub async fn connect_to(service: &str, socket: &Path) -> Self {
        // resolve_at already logged the failure; remember only that the
        // service is gone for good.
        let handle = registry::resolve_at(service, socket).await.ok();
        Self {
            service: service.to_string(),
            handle,
        }
    }

    /// Whether construction resolved a live handle.
    pub fn is_available(&self) -> bool {
        self.handle.is_some()
    }

    fn handle(&self) -> ClientResult<&ServiceHandle> {
        self.handle
            .as_deref()
            .ok_or_else(|| ClientError::ServiceUnavailable {
                service: self.service.clone(),
                reason: "service handle was never resolved".to_string(),
            })
    }

    /// Persist the enabled state for one named action.
    ///
    /// Names are not validated locally; the service is authoritative.
    pub async fn set_action(&self, name: &str, enabled: bool) -> ClientResult<()> {
        self.handle()?
            .call("actions.set", json!({ "name": name, "enabled": enabled }))
            .await
            .map_err(|e| ClientError::call_failed("actions.set", e))?;
        Ok(())
    }

    /// Current configuration snapshot, in service order.
    ///
    /// No caching: repeated calls may observe different results if the
    /// remote state changed between them.
    pub async fn actions(&self) -> ClientResult<Vec<ActionEntry>> {
        let result = self
            .handle()?
            .call("actions.list", json!({}))
            .await
            .map_err(|e| ClientError::call_failed("actions.list", e))?;

        serde_json::from_value(result)
            .map_err(|e| ClientError::call_failed("actions.list", TransportError::Serde(e)))
    }

    /// Enabled action names in the canonical display order.
    pub async fn enabled_actions(&self) -> ClientResult<Vec<String>> {
        let result = self
            .handle()?
            .call("actions.enabled", json!({}))
            .await
            .map_err(|e| ClientError::call_failed("actions.enabled", e))?;

        serde_json::from_value(result)
            .map_err(|e| ClientError::call_failed("actions.enabled", TransportError::Serde(e)))
    }

    /// Whether `name` is currently an enabled action.
    ///
    /// Membership is computed remotely against the same snapshot
    /// [`actions`](Self::actions) would see, so the two agree at any
    /// instant.
    pub async fn contains_action(&self, name: &str) -> ClientResult<bool> {
        let result = self
            .handle()?
            .call("actions.contains", json!({ "name": name }))
            .await
            .map_err(|e| ClientError::call_failed("actions.contains", e))?;

        result.as_bool().ok_or_else(|| {
            ClientError::call_failed(
                "actions.contains",
                TransportError::UnexpectedReply(result.to_string()),
            )
        })
    }
}
