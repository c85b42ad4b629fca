use thiserror::Error;

/// Failures of the listener itself. Per-request failures become responses.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server task failed: {0}")]
    Join(String),
}
