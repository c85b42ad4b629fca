//! Versioned schema migrations.
//!
//! SQL files are embedded at compile time and applied in order inside one
//! transaction. The applied version is mirrored to `PRAGMA user_version`; a
//! database migrated by a newer binary is refused.

use crate::ProgramDb;
use crate::error::DatabaseError;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "001_programs",
        sql: include_str!("../migrations/001_programs.sql"),
    },
    Migration {
        version: 2,
        name: "002_child_indexes",
        sql: include_str!("../migrations/002_child_indexes.sql"),
    },
];

/// Latest schema version known by this binary.
pub fn latest_version() -> i64 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

impl ProgramDb {
    /// Apply all pending migrations.
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        let current = self.schema_version().await?;
        let latest = latest_version();

        if current > latest {
            return Err(DatabaseError::UnsupportedSchemaVersion {
                db_version: current,
                latest_supported: latest,
            });
        }
        if current == latest {
            return Ok(());
        }

        let conn = self.conn().await;
        let tx = conn.transaction().await?;
        for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
            tx.execute_batch(migration.sql)
                .await
                .map_err(|e| DatabaseError::Migration(format!("{}: {e}", migration.name)))?;
            tx.execute(&format!("PRAGMA user_version = {}", migration.version), ())
                .await
                .map_err(|e| DatabaseError::Migration(format!("{}: {e}", migration.name)))?;
            tracing::info!(version = migration.version, name = migration.name, "applied migration");
        }
        tx.commit().await?;
        Ok(())
    }

    /// Read the applied schema version.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the pragma cannot be read.
    pub async fn schema_version(&self) -> Result<i64, DatabaseError> {
        let conn = self.conn().await;
        let mut rows = conn.query("PRAGMA user_version", ()).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<i64>(0)?)
    }
}
