//! Store error types.

use thiserror::Error;

use crate::gateway::GatewayError;

/// Errors surfaced by the sync controllers.
///
/// `Clone` so a controller can keep the last failure for display while also
/// returning it to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Failed to read from remote store: {0}")]
    RemoteRead(String),

    #[error("Failed to write to remote store: {0}")]
    RemoteWrite(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Raised by input checks outside the controllers, never by the
    /// controllers themselves.
    #[error("Invalid input: {0}")]
    Validation(String),
}

impl StoreError {
    pub(crate) fn read(err: GatewayError) -> Self {
        StoreError::RemoteRead(err.to_string())
    }

    pub(crate) fn write(err: GatewayError) -> Self {
        StoreError::RemoteWrite(err.to_string())
    }
}
