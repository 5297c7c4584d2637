//! Engine error taxonomy
//!
//! Every variant is produced at the failure site; user-facing copy is
//! derived from the variant at the presentation boundary, never by matching
//! on message strings.

use crate::assistant::{RunStatus, TransportError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Network/HTTP-level failure talking to the remote assistant.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Run creation answered without a run identifier.
    #[error("assistant did not return a run identifier")]
    RunCreation,

    /// The run never settled within the poll attempt ceiling.
    #[error("run did not settle after {attempts} status checks")]
    PollTimeout { attempts: u32 },

    /// The tool-output submission call itself failed.
    #[error("failed to submit tool outputs")]
    ToolSubmission {
        #[source]
        source: TransportError,
    },

    /// The run ended in a terminal non-success status.
    #[error("run ended with status {status}{}", .detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    RunFailed {
        status: RunStatus,
        detail: Option<String>,
    },
}
