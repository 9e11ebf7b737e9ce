use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by discovery, sessions and the command facade.
#[derive(Debug, Clone, Error)]
pub enum TetherError {
    /// The discovery endpoint could not be reached (nothing listening on the control port).
    #[error("discovery endpoint {endpoint} unavailable: {reason}")]
    DiscoveryUnavailable { endpoint: String, reason: String },

    /// No page target looks like the editor window.
    #[error("no editor target found")]
    NoEditorTarget,

    /// The selected target does not advertise a control channel address.
    #[error("target {target_id} has no control address")]
    NoControlAddress { target_id: String },

    /// The WebSocket transport could not be established.
    #[error("failed to connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// The remote process answered a request with an explicit protocol error.
    #[error("remote error {code}: {message}")]
    Remote { code: i64, message: String },

    #[error("request '{method}' timed out after {duration:?}")]
    Timeout { method: String, duration: Duration },

    /// The session closed (or the transport dropped) before a response arrived.
    #[error("session closed before a response arrived")]
    SessionClosed,

    /// An inspection snippet threw inside the page.
    #[error("script exception: {message}")]
    ScriptException { message: String },

    #[error("protocol error: {detail}")]
    Protocol { detail: String },
}

impl TetherError {
    pub fn protocol(detail: impl Into<String>) -> Self {
        Self::Protocol {
            detail: detail.into(),
        }
    }
}

impl From<serde_json::Error> for TetherError {
    fn from(err: serde_json::Error) -> Self {
        Self::protocol(format!("json: {}", err))
    }
}
