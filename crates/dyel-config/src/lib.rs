//! # dyel-config
//!
//! Layered configuration loading for dyel using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`DYEL_*` prefix, `__` as separator)
//! 2. Legacy variables `PORT` and `DATABASE_URL`
//! 3. Project-level `.dyel/config.toml`
//! 4. User-level `~/.config/dyel/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `DYEL_DATABASE__PATH` -> `database.path`, `DYEL_SERVER__PORT` -> `server.port`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use dyel_config::DyelConfig;
//!
//! let config = DyelConfig::load_with_dotenv().expect("config");
//! println!("listening on {}", config.server.bind_addr());
//! ```

mod database;
mod error;
mod requests;
mod server;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use requests::RequestsConfig;
pub use server::ServerConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DyelConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub requests: RequestsConfig,
}

impl DyelConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need `.env` file loading.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support from the current directory.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".dyel/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Legacy deployment variables
        figment = figment.merge(Self::legacy_env());

        // Layer 4: Environment variables (highest priority)
        figment = figment.merge(Env::prefixed("DYEL_").split("__"));

        figment
    }

    /// Reject values that would make the adapters misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.database.is_configured() {
            return Err(ConfigError::NotConfigured {
                section: "database".into(),
            });
        }
        if !self.database.url.is_empty() && self.database.auth_token.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.auth_token".into(),
                reason: "required when database.url is set".into(),
            });
        }
        if self.requests.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "requests.timeout_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// `PORT` and `DATABASE_URL`, as read by earlier deployments.
    fn legacy_env() -> Env {
        Env::raw()
            .only(&["PORT", "DATABASE_URL"])
            .map(|key| {
                if key == "port" {
                    "server.port".into()
                } else {
                    "database.url".into()
                }
            })
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dyel").join("config.toml"))
    }
}
