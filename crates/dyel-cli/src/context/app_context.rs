use std::sync::Arc;

use anyhow::Context;
use dyel_config::DyelConfig;
use dyel_db::{CallContext, ProgramDb, SqlProgramRepo};
use tokio_util::sync::CancellationToken;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub repo: Arc<SqlProgramRepo>,
    pub config: DyelConfig,
    pub shutdown: CancellationToken,
}

impl AppContext {
    /// Open (and migrate) the configured database.
    pub async fn init(config: DyelConfig, shutdown: CancellationToken) -> anyhow::Result<Self> {
        let db = if config.database.is_remote() {
            ProgramDb::open_remote(&config.database.url, &config.database.auth_token)
                .await
                .with_context(|| format!("failed to open remote database {}", config.database.url))?
        } else {
            ProgramDb::open_local(&config.database.path)
                .await
                .with_context(|| format!("failed to open database at {}", config.database.path))?
        };

        Ok(Self {
            repo: Arc::new(SqlProgramRepo::new(db)),
            config,
            shutdown,
        })
    }

    /// Context for one repository call: Ctrl-C plus the configured deadline.
    #[must_use]
    pub fn call_context(&self) -> CallContext {
        CallContext::with_token(self.shutdown.child_token())
            .with_timeout(self.config.requests.timeout())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn local_config(dir: &TempDir) -> DyelConfig {
        let mut config = DyelConfig::default();
        config.database.path = dir.path().join("dyel.db").to_string_lossy().into_owned();
        config
    }

    #[tokio::test]
    async fn init_opens_local_database() {
        let dir = TempDir::new().unwrap();
        let ctx = AppContext::init(local_config(&dir), CancellationToken::new())
            .await
            .unwrap();

        assert!(!ctx.repo.db().is_remote());
        assert!(dir.path().join("dyel.db").exists());
    }

    #[tokio::test]
    async fn shutdown_cancels_call_contexts() {
        let dir = TempDir::new().unwrap();
        let shutdown = CancellationToken::new();
        let ctx = AppContext::init(local_config(&dir), shutdown.clone())
            .await
            .unwrap();

        let call = ctx.call_context();
        assert!(call.check().is_ok());
        shutdown.cancel();
        assert!(call.check().is_err());
    }
}
