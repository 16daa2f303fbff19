//! In-process stub of the power-actions service for integration tests.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Stub power-actions service listening on a socket in a tempdir.
///
/// Keeps the ordered action configuration in memory and answers the same
/// methods the real session daemon serves.
pub struct StubService {
    _temp_dir: TempDir,
    pub socket_path: PathBuf,
    pub state: Arc<Mutex<Vec<(String, bool)>>>,
    accept_handle: JoinHandle<()>,
    conn_handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl StubService {
    pub async fn start() -> Result<Self> {
        Self::start_with(Vec::new()).await
    }

    pub async fn start_with(initial: Vec<(&str, bool)>) -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let socket_path = temp_dir.path().join("power-actions.sock");
        let listener = UnixListener::bind(&socket_path)?;

        let state = Arc::new(Mutex::new(
            initial
                .into_iter()
                .map(|(name, enabled)| (name.to_string(), enabled))
                .collect::<Vec<_>>(),
        ));
        let conn_handles: Arc<Mutex<Vec<JoinHandle<()>>>> = Arc::new(Mutex::new(Vec::new()));

        let accept_state = Arc::clone(&state);
        let accept_conns = Arc::clone(&conn_handles);
        let accept_handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let conn_state = Arc::clone(&accept_state);
                let handle = tokio::spawn(async move {
                    let _ = serve_connection(stream, conn_state).await;
                });
                accept_conns.lock().await.push(handle);
            }
        });

        Ok(Self {
            _temp_dir: temp_dir,
            socket_path,
            state,
            accept_handle,
            conn_handles,
        })
    }

    /// Kill the service, severing every live connection.
    pub async fn shutdown(self) {
        self.accept_handle.abort();
        for handle in self.conn_handles.lock().await.drain(..) {
            handle.abort();
        }
        // Give the aborted tasks a moment to drop their sockets.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
}

async fn serve_connection(stream: UnixStream, state: Arc<Mutex<Vec<(String, bool)>>>) -> Result<()> {
    let (read, mut write) = stream.into_split();
    let mut reader = BufReader::new(read);
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }

        let request: Value = serde_json::from_str(&line)?;
        let id = request.get("id").cloned().unwrap_or(Value::Null);
        let method = request.get("method").and_then(Value::as_str).unwrap_or("");
        let params = request.get("params").cloned().unwrap_or(Value::Null);

        let response = match method {
            "ping" => json!({ "jsonrpc": "2.0", "id": id, "result": "pong" }),
            "actions.set" => {
                let name = params["name"].as_str().unwrap_or("").to_string();
                let enabled = params["enabled"].as_bool().unwrap_or(false);

                let mut actions = state.lock().await;
                match actions.iter_mut().find(|(n, _)| *n == name) {
                    Some(entry) => entry.1 = enabled,
                    None => actions.push((name, enabled)),
                }
                json!({ "jsonrpc": "2.0", "id": id, "result": null })
            }
            "actions.list" => {
                let actions = state.lock().await;
                let rows: Vec<Value> = actions
                    .iter()
                    .map(|(name, enabled)| json!({ "name": name, "enabled": enabled }))
                    .collect();
                json!({ "jsonrpc": "2.0", "id": id, "result": rows })
            }
            "actions.enabled" => {
                let actions = state.lock().await;
                let names: Vec<&str> = actions
                    .iter()
                    .filter(|(_, enabled)| *enabled)
                    .map(|(name, _)| name.as_str())
                    .collect();
                json!({ "jsonrpc": "2.0", "id": id, "result": names })
            }
            "actions.contains" => {
                let name = params["name"].as_str().unwrap_or("");
                let actions = state.lock().await;
                let contained = actions.iter().any(|(n, enabled)| n == name && *enabled);
                json!({ "jsonrpc": "2.0", "id": id, "result": contained })
            }
            other => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": -32601, "message": format!("Unknown method: {other}") },
            }),
        };

        let mut out = serde_json::to_string(&response)?;
        out.push('\n');
        write.write_all(out.as_bytes()).await?;
    }
}
