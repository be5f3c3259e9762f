//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod realtime;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::auth::AuthConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::realtime::RealtimeConfig;

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "AQUAHUB";

/// Root application configuration.
///
/// Top-level deserialization target for the merged TOML configuration
/// files (default.toml + environment overlay + `AQUAHUB__*` variables).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Token signing settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Notification relay settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default` with the `config/{env}` overlay and
    /// environment variables prefixed with `AQUAHUB__` (double underscore
    /// separates sections, e.g. `AQUAHUB__DATABASE__URL`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("realtime.channels")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
            .map_err(AppError::from)
    }
}
