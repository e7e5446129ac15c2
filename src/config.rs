//! Logger configuration

use crate::appenders::{broadcast, RotatingFileWriter, RotationPolicy};
use crate::core::error::Result;
use crate::core::log_level::LogLevel;
use crate::core::output::Output;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Settings for building a [`Logger`](crate::Logger)
///
/// Field names follow the camelCase JSON form:
///
/// ```
/// use rust_leveled_logger::{Config, LogLevel};
///
/// let config = Config::from_json_str(
///     r#"{"level":"debug","path":"log/app.log","maxSize":100,"maxAge":7}"#,
/// ).unwrap();
/// assert_eq!(config.log_level(), LogLevel::Debug);
/// assert_eq!(config.max_size, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Minimum level name; unrecognised names mean info
    pub level: String,
    /// Log file path; empty logs to stdout only
    pub path: String,
    /// Rotation size in megabytes
    pub max_size: u64,
    /// Days to keep rotated files; zero keeps them all
    pub max_age: u64,
    /// Number of rotated files to keep; zero keeps them all
    pub max_backups: usize,
    /// Gzip rotated files
    pub compress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: LogLevel::Info.as_value().to_string(),
            path: String::new(),
            max_size: 0,
            max_age: 0,
            max_backups: 0,
            compress: false,
        }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from its JSON form
    ///
    /// # Errors
    ///
    /// Returns error if `json` is not a valid configuration object
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, megabytes: u64) -> Self {
        self.max_size = megabytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age(mut self, days: u64) -> Self {
        self.max_age = days;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    /// Minimum level, falling back to info for unknown names
    pub fn log_level(&self) -> LogLevel {
        LogLevel::parse(&self.level)
    }

    pub fn rotation_policy(&self) -> RotationPolicy {
        RotationPolicy::new()
            .with_max_size_mb(self.max_size)
            .with_max_age_days(self.max_age)
            .with_max_backups(self.max_backups)
            .with_compression(self.compress)
    }

    /// Open the destination described by this configuration.
    ///
    /// Without a path this is stdout. With one it is the rotating file
    /// followed by stdout.
    ///
    /// # Errors
    ///
    /// Returns error if the log file cannot be opened
    pub fn open_output(&self) -> Result<Output> {
        if self.path.is_empty() {
            return Ok(Output::stdout());
        }
        let file = RotatingFileWriter::with_policy(&self.path, self.rotation_policy())?;
        Ok(Output::new(broadcast(vec![
            Box::new(file) as Box<dyn Write + Send>,
            Box::new(io::stdout()),
        ])))
    }
}
