//! Database and repository error types for dyel-db.

use std::fmt;

use dyel_core::CoreError;
use thiserror::Error;

/// Errors from opening, migrating, or reading the database.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A row could not be converted into an entity.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// The database was migrated by a newer binary.
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: i64,
        latest_supported: i64,
    },

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),
}

/// Why an operation stopped before finishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The caller's cancellation token fired.
    Canceled,
    /// The caller's deadline elapsed.
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Canceled => "canceled by caller",
            Self::DeadlineExceeded => "deadline exceeded",
        })
    }
}

/// Error kinds of the repository contract. Adapters map these to transport
/// status codes; the repository never formats user-facing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Storage,
    Canceled,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Storage => "storage",
            Self::Canceled => "canceled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by `ProgramRepository` operations.
#[derive(Debug, Error)]
pub enum RepoError {
    /// Input was rejected before any storage interaction.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No program with this id exists.
    #[error("Program not found: {id}")]
    NotFound { id: String },

    /// An identifier collided or a constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The storage engine failed.
    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),

    /// The caller aborted or the deadline elapsed.
    #[error("Operation {0}")]
    Canceled(CancelReason),
}

impl RepoError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Canceled(_) => ErrorKind::Canceled,
        }
    }

    /// Reclassify a constraint failure from the engine as `Conflict`.
    #[must_use]
    pub fn classify_write(self) -> Self {
        match self {
            Self::Storage(DatabaseError::LibSql(ref e)) if is_constraint_violation(e) => {
                Self::Conflict(e.to_string())
            }
            other => other,
        }
    }
}

impl From<libsql::Error> for RepoError {
    fn from(e: libsql::Error) -> Self {
        Self::Storage(DatabaseError::LibSql(e))
    }
}

impl From<CoreError> for RepoError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Validation(message) => Self::Validation(message),
            CoreError::NotFound { id, .. } => Self::NotFound { id },
        }
    }
}

/// Detect `SQLITE_CONSTRAINT` (primary key, unique, foreign key, check, trigger).
///
/// Extended result codes keep the primary code in the low byte.
pub fn is_constraint_violation(e: &libsql::Error) -> bool {
    match e {
        libsql::Error::SqliteFailure(code, _) => (code & 0xff) == 19,
        other => other.to_string().contains("constraint failed"),
    }
}
