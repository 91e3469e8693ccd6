//! Error types for the HTTP boundary.
//!
//! ERROR HANDLING
//! ==============
//! Only faults live here. Expected negatives (`401`, `400`) are modeled as
//! `Rejection` values in `gateway` so callers never have to re-inspect status
//! codes to tell "not logged in" apart from "server broke".

/// Failure of the transport itself, before any status code was observed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request could not be built: {0}")]
    Request(String),
    #[error("network failure: {0}")]
    Network(String),
    #[error("response body could not be read: {0}")]
    Body(String),
    #[error("http transport not available on server")]
    Unavailable,
}

/// A fault reported by the session gateway.
///
/// Every variant except `Cancelled` drives the session verdict to `Errored`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("server error: {status}")]
    Server { status: u16 },
    #[error("unexpected status {status} from {path}")]
    UnexpectedStatus { status: u16, path: &'static str },
    #[error("response from {path} did not match schema: {detail}")]
    Schema { path: &'static str, detail: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("request cancelled")]
    Cancelled,
}

impl GatewayError {
    /// Cancelled requests are dropped silently rather than reported.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
