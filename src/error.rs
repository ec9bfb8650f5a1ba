//! Error type shared by the store and the HTTP layer.
//!
//! Store internals keep using `anyhow` with context; anything that is not a
//! validation failure or a missing row ends up as `AppError::Internal`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input (empty content, bad id, bad JSON).
    #[error("{0}")]
    Validation(String),

    /// The targeted QR code does not exist.
    #[error("qr code {0} not found")]
    NotFound(i64),

    /// Storage or codec failure. Logged, never shown to clients.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
