//! Cross-cutting error types for dyel.
//!
//! Storage errors (`DatabaseError`, `RepoError`) live in `dyel-db`. A unified
//! error is deferred to the adapters, where all crate errors converge.

use thiserror::Error;

/// Errors that can be raised by any dyel crate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Input failed validation before reaching storage.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl CoreError {
    /// Shorthand for a `Validation` error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
