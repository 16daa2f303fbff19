//! Service handle resolution and the process-wide handle registry.
//!
//! Each session service listens on a named Unix socket under the user's
//! runtime directory. Resolution is lazy: the first caller for a service
//! connects and publishes the handle; every later caller, from any
//! component, reuses it for the remainder of the process lifetime. A
//! handle whose connection later breaks is never re-resolved; its calls
//! fail until the process restarts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::error::{ClientError, ClientResult, TransportError};

/// Socket path for a named session service.
///
/// Uses XDG_RUNTIME_DIR if available, otherwise falls back to /tmp.
pub fn service_socket_path(service: &str) -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("palisade")
        .join(format!("{service}.sock"))
}

/// Check whether a service socket is accepting connections.
///
/// A passive probe for surfaces that want to render an "unavailable"
/// state without constructing a client. Never touches the handle
/// registry.
pub fn is_service_available(socket: &Path) -> bool {
    if !socket.exists() {
        return false;
    }

    match std::os::unix::net::UnixStream::connect(socket) {
        Ok(_) => true,
        Err(e) => {
            debug!("socket {:?} exists but connection failed: {}", socket, e);
            false
        }
    }
}

/// Live connection to one named session service.
///
/// At most one handle exists per (process, service) pair; [`resolve`]
/// owns that invariant. Request writes and response reads are serialized
/// internally, so the handle can be shared freely behind its `Arc`.
#[derive(Debug)]
pub struct ServiceHandle {
    service: String,
    reader: Mutex<BufReader<tokio::net::unix::OwnedReadHalf>>,
    writer: Mutex<tokio::net::unix::OwnedWriteHalf>,
    next_id: AtomicU64,
}

impl ServiceHandle {
    async fn connect(service: &str, socket: &Path) -> Result<Self, TransportError> {
        let stream = UnixStream::connect(socket).await?;
        let (read, write) = stream.into_split();

        Ok(Self {
            service: service.to_string(),
            reader: Mutex::new(BufReader::new(read)),
            writer: Mutex::new(write),
            next_id: AtomicU64::new(1),
        })
    }

    /// Service name this handle was resolved for.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Send one JSON-RPC request and wait for its response.
    ///
    /// Blocks the calling task for the duration of the round trip; any
    /// timeout semantics are the transport's own.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let mut req_str = serde_json::to_string(&request)?;
        req_str.push('\n');

        {
            let mut writer = self.writer.lock().await;
            writer.write_all(req_str.as_bytes()).await?;
        }

        let mut line = String::new();
        {
            let mut reader = self.reader.lock().await;
            let bytes_read = reader.read_line(&mut line).await?;
            if bytes_read == 0 {
                return Err(TransportError::ConnectionClosed);
            }
        }

        let response: Value = serde_json::from_str(&line)?;

        if let Some(err) = response.get("error") {
            let code = err.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            return Err(TransportError::Rejected { code, message });
        }

        Ok(response.get("result").cloned().unwrap_or(Value::Null))
    }
}

fn registry() -> &'static Mutex<HashMap<String, Arc<ServiceHandle>>> {
    static HANDLES: OnceLock<Mutex<HashMap<String, Arc<ServiceHandle>>>> = OnceLock::new();
    HANDLES.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Resolve a named service to its process-wide handle.
///
/// The first call connects and publishes the handle; every later call for
/// the same name returns the identical handle, even if the underlying
/// connection has since broken. Failed resolution publishes nothing, so a
/// later caller may succeed once the service is up.
pub async fn resolve(service: &str) -> ClientResult<Arc<ServiceHandle>> {
    resolve_at(service, &service_socket_path(service)).await
}

/// Resolve a named service against an explicit socket path.
///
/// Same caching contract as [`resolve`]; the path only matters for the
/// call that actually performs the connection. The registry lock is held
/// across check-connect-publish, so concurrent first callers serialize
/// and exactly one resolution outcome is published.
pub async fn resolve_at(service: &str, socket: &Path) -> ClientResult<Arc<ServiceHandle>> {
    let mut handles = registry().lock().await;
    if let Some(handle) = handles.get(service) {
        return Ok(Arc::clone(handle));
    }

    match ServiceHandle::connect(service, socket).await {
        Ok(handle) => {
            let handle = Arc::new(handle);
            handles.insert(service.to_string(), Arc::clone(&handle));
            Ok(handle)
        }
        Err(e) => {
            error!(
                "unable to resolve service '{}' at {:?}: {}. The service either crashed, \
                 was not started, or was resolved too early in session startup",
                service, socket, e
            );
            Err(ClientError::ServiceUnavailable {
                service: service.to_string(),
                reason: e.to_string(),
            })
        }
    }
}
