//! CDP error types.

use std::time::Duration;

use thiserror::Error;

/// Errors raised by target discovery and the protocol client.
#[derive(Debug, Error)]
pub enum CdpError {
    /// The debugging endpoint could not be reached.
    #[error("Connection failed on port {port}: {message}. Is the remote instance running?")]
    Connection { port: u16, message: String },

    /// The debugging endpoint answered with a non-success status.
    #[error("Debugging endpoint on port {port} returned HTTP {status}")]
    HttpStatus { port: u16, status: u16 },

    /// A call did not complete within its budget. The connection stays usable.
    #[error("Timeout: {method} did not complete within {}ms", .after.as_millis())]
    Timeout { method: String, after: Duration },

    /// The remote script threw.
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// CDP protocol error returned by the remote side.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    /// Navigation was refused before any call was made.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The remote side reported a navigation failure.
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// No target with this id is exposed.
    #[error("Target not found: {0}")]
    TargetNotFound(String),

    /// The client has been disconnected.
    #[error("Client is not connected")]
    NotConnected,

    /// The connection closed while a call was in flight.
    #[error("Session closed")]
    SessionClosed,

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Invalid response.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CdpError {
    /// True for per-call timeouts.
    pub fn is_timeout(&self) -> bool {
        matches!(self, CdpError::Timeout { .. })
    }

    /// True when the remote endpoint is unreachable or the link is gone.
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            CdpError::Connection { .. }
                | CdpError::HttpStatus { .. }
                | CdpError::NotConnected
                | CdpError::SessionClosed
                | CdpError::WebSocket(_)
        )
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}
