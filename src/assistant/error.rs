//! Transport-level errors

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single HTTP exchange with the remote assistant API.
///
/// Carries the upstream status and raw error payload when available. This
/// layer never retries; retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {path} failed: {source}")]
    Network {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("upstream returned {status} for {path}: {body}")]
    Status {
        path: String,
        status: StatusCode,
        body: String,
    },

    #[error("invalid response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl TransportError {
    /// Upstream HTTP status, when the exchange got that far.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
