//! # dyel-db
//!
//! libSQL persistence for the dyel Program aggregate.
//!
//! Owns the relational state (`programs`, `days`, `exercises`), the versioned
//! schema migrations applied at startup, and the [`repos::ProgramRepository`]
//! capability with its libSQL-backed and in-memory implementations.
//!
//! Uses the `libsql` crate (C `SQLite` fork) for both local files and remote
//! Turso databases.

pub mod context;
pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;

#[cfg(test)]
mod test_support;

pub use context::CallContext;
pub use error::{CancelReason, DatabaseError, ErrorKind, RepoError};
pub use repos::ProgramRepository;
pub use repos::memory::MemoryProgramRepo;
pub use repos::program::SqlProgramRepo;

use libsql::Builder;
use tokio::sync::{Mutex, MutexGuard};

/// Central database handle.
///
/// Holds one connection behind an async mutex: a repository operation keeps
/// the connection for its whole unit of work, so statements of concurrent
/// calls never interleave inside one transaction.
pub struct ProgramDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: Mutex<libsql::Connection>,
    remote: bool,
}

impl ProgramDb {
    /// Open a local database at the given path (or `":memory:"`).
    ///
    /// Runs migrations on open, before any repository is built on top.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let program_db = Self {
            db,
            conn: Mutex::new(conn),
            remote: false,
        };
        program_db.run_migrations().await?;
        tracing::debug!(path, "opened local database");
        Ok(program_db)
    }

    /// Open a remote libSQL database (e.g., Turso) over HTTP.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the connection or migrations fail.
    pub async fn open_remote(url: &str, auth_token: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_remote(url.to_string(), auth_token.to_string())
            .build()
            .await?;
        let conn = db.connect()?;

        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let program_db = Self {
            db,
            conn: Mutex::new(conn),
            remote: true,
        };
        program_db.run_migrations().await?;
        tracing::debug!(url, "opened remote database");
        Ok(program_db)
    }

    /// Returns whether this handle talks to a remote database.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        self.remote
    }

    /// Exclusive access to the connection for direct queries.
    pub async fn conn(&self) -> MutexGuard<'_, libsql::Connection> {
        self.conn.lock().await
    }

    /// Acquire the connection for one unit of work.
    ///
    /// Waiting is cancellable. A transaction left open by a caller that
    /// dropped its future mid-operation is rolled back before handing out
    /// the connection.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Canceled` if the context fires while waiting, or
    /// `RepoError::Storage` if the stale transaction cannot be rolled back.
    pub async fn acquire(
        &self,
        ctx: &CallContext,
    ) -> Result<MutexGuard<'_, libsql::Connection>, RepoError> {
        let conn = ctx.run(self.conn.lock()).await?;
        if !conn.is_autocommit() {
            tracing::warn!("rolling back transaction abandoned by a dropped call");
            conn.execute("ROLLBACK", ()).await?;
        }
        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to create an in-memory database for testing.
    async fn test_db() -> ProgramDb {
        ProgramDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;
        let conn = db.conn().await;

        for table in ["programs", "days", "exercises"] {
            let mut rows = conn
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn foreign_keys_are_enabled() {
        let db = test_db().await;
        let conn = db.conn().await;
        let mut rows = conn.query("PRAGMA foreign_keys", ()).await.unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 1);
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        // Second run is a no-op
        db.run_migrations().await.unwrap();
        assert_eq!(
            db.schema_version().await.unwrap(),
            migrations::latest_version()
        );
    }

    #[tokio::test]
    async fn deleting_a_day_cascades_to_its_exercises() {
        let db = test_db().await;
        let conn = db.conn().await;

        conn.execute_batch(
            "INSERT INTO programs (id, name, shared_by) VALUES ('p1', 'P', 'a');
             INSERT INTO days (id, program_id, position, name) VALUES ('d1', 'p1', 0, 'Mon');
             INSERT INTO days (id, program_id, position, name) VALUES ('d2', 'p1', 1, 'Tue');
             INSERT INTO exercises (id, day_id, position, name) VALUES ('e1', 'd1', 0, 'Squat');
             INSERT INTO exercises (id, day_id, position, name) VALUES ('e2', 'd2', 0, 'Bench');",
        )
        .await
        .unwrap();

        conn.execute("DELETE FROM days WHERE id = 'd1'", ())
            .await
            .unwrap();

        let mut rows = conn
            .query("SELECT id FROM exercises ORDER BY id", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<String>(0).unwrap(), "e2");
        assert!(rows.next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn orphan_day_is_rejected() {
        let db = test_db().await;
        let conn = db.conn().await;
        let result = conn
            .execute(
                "INSERT INTO days (id, program_id, position, name) VALUES ('d1', 'missing', 0, 'Mon')",
                (),
            )
            .await;
        assert!(result.is_err(), "FK should reject a day without a program");
    }

    #[tokio::test]
    async fn acquire_rolls_back_abandoned_transaction() {
        let db = test_db().await;
        {
            let conn = db.conn().await;
            conn.execute("BEGIN", ()).await.unwrap();
            conn.execute(
                "INSERT INTO programs (id, name, shared_by) VALUES ('p1', 'P', 'a')",
                (),
            )
            .await
            .unwrap();
        }

        let conn = db.acquire(&CallContext::new()).await.unwrap();
        assert!(conn.is_autocommit());
        let mut rows = conn.query("SELECT COUNT(*) FROM programs", ()).await.unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 0);
    }

    #[tokio::test]
    async fn acquire_honours_cancellation() {
        let db = test_db().await;
        let ctx = CallContext::new();
        ctx.cancel();
        assert!(db.acquire(&ctx).await.is_err());
    }
}
