//! Error types for daemon service clients.

use thiserror::Error;

/// Failure originating below the application-level call contract.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("i/o failure on service socket: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed wire payload: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("connection closed by service")]
    ConnectionClosed,

    #[error("call rejected by service: {message} (code {code})")]
    Rejected { code: i64, message: String },

    #[error("unexpected reply shape: {0}")]
    UnexpectedReply(String),
}

/// Errors surfaced by daemon service clients.
///
/// Neither variant is retried or swallowed inside the client; both
/// propagate to the immediate caller, which decides how to degrade. The
/// client never substitutes a default value on failure.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The named service could not be resolved to a live handle. The
    /// service either crashed, was never started, or was resolved too
    /// early in session startup.
    #[error("service '{service}' is unavailable: {reason}")]
    ServiceUnavailable { service: String, reason: String },

    /// A forwarded call failed after a handle was obtained; carries the
    /// originating transport cause for diagnostics.
    #[error("remote call '{method}' failed: {source}")]
    RemoteCallFailed {
        method: String,
        #[source]
        source: TransportError,
    },
}

impl ClientError {
    pub(crate) fn call_failed(method: &str, source: TransportError) -> Self {
        Self::RemoteCallFailed {
            method: method.to_string(),
            source,
        }
    }

    /// True when the service was never reachable, as opposed to a call
    /// failing on a handle that did resolve.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable { .. })
    }
}

/// Result type for daemon service client operations.
pub type ClientResult<T> = Result<T, ClientError>;
