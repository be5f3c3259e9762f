//! Logging configuration.

use serde::{Deserialize, Serialize};

/// Logging and tracing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive, e.g. `"info"` or
    /// `"info,aquahub::database=debug"`.
    #[serde(default = "default_level")]
    pub level: String,
    /// Log format: `"json"` or `"pretty"`.
    #[serde(default = "default_format")]
    pub format: String,
    /// Directory for the daily rotating log files. Console only when unset.
    #[serde(default)]
    pub directory: Option<String>,
    /// Rotated files kept per log kind.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
            directory: None,
            max_files: default_max_files(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}

fn default_max_files() -> usize {
    14
}
