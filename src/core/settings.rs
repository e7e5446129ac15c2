//! Encoder-wide formatting options
//!
//! Field names, marshal functions, the clock and the write-error callback are
//! shared by every logger that does not carry its own settings. Registration
//! replaces the whole set atomically, so registering the same settings twice
//! has no further effect.

use super::error::LoggerError;
use super::log_level::LogLevel;
use super::timestamp::{system_clock, TimestampFn, TimestampFormat};
use arc_swap::ArcSwap;
use serde_json::Value;
use std::error::Error as StdError;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, LazyLock};

pub type LevelMarshalFn = Arc<dyn Fn(LogLevel) -> String + Send + Sync>;
pub type CallerMarshalFn = Arc<dyn Fn(&str, u32) -> String + Send + Sync>;
pub type ErrorMarshalFn = Arc<dyn Fn(&(dyn StdError + 'static)) -> Value + Send + Sync>;
/// Returns `None` when the error carries no stack worth encoding
pub type ErrorStackMarshalFn =
    Arc<dyn Fn(&(dyn StdError + 'static)) -> Option<Value> + Send + Sync>;
pub type ErrorHandler = Arc<dyn Fn(&LoggerError) + Send + Sync>;

static GLOBAL_SETTINGS: LazyLock<ArcSwap<EncoderSettings>> =
    LazyLock::new(|| ArcSwap::from_pointee(EncoderSettings::default()));

/// Register `settings` as the process-wide encoder settings
pub fn set_encoder_settings(settings: EncoderSettings) {
    GLOBAL_SETTINGS.store(Arc::new(settings));
}

/// Snapshot of the current process-wide encoder settings
pub fn encoder_settings() -> Arc<EncoderSettings> {
    GLOBAL_SETTINGS.load_full()
}

/// Restore the built-in defaults
pub fn reset_encoder_settings() {
    set_encoder_settings(EncoderSettings::default());
}

/// Formatting options consumed by the JSON encoder.
///
/// # Example
///
/// ```
/// use rust_leveled_logger::core::EncoderSettings;
/// use chrono::{TimeZone, Utc};
/// use std::sync::Arc;
///
/// let settings = EncoderSettings::default()
///     .with_message_field_name("message")
///     .with_timestamp_fn(Arc::new(|| Utc.with_ymd_and_hms(2001, 2, 3, 4, 5, 6).unwrap()));
/// assert_eq!(settings.message_field_name, "message");
/// ```
#[derive(Clone)]
pub struct EncoderSettings {
    pub timestamp_field_name: String,
    pub level_field_name: String,
    pub message_field_name: String,
    pub error_field_name: String,
    pub caller_field_name: String,
    pub error_stack_field_name: String,
    pub time_format: TimestampFormat,
    pub timestamp_fn: TimestampFn,
    pub level_marshal: LevelMarshalFn,
    pub caller_marshal: CallerMarshalFn,
    pub error_marshal: ErrorMarshalFn,
    pub error_stack_marshal: ErrorStackMarshalFn,
    pub error_handler: ErrorHandler,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            timestamp_field_name: "ts".to_string(),
            level_field_name: "level".to_string(),
            message_field_name: "msg".to_string(),
            error_field_name: "error".to_string(),
            caller_field_name: "caller".to_string(),
            error_stack_field_name: "stack".to_string(),
            time_format: TimestampFormat::default(),
            timestamp_fn: system_clock(),
            level_marshal: Arc::new(level_value),
            caller_marshal: Arc::new(short_caller),
            error_marshal: Arc::new(error_text),
            error_stack_marshal: Arc::new(source_chain),
            error_handler: Arc::new(report_to_stderr),
        }
    }
}

impl EncoderSettings {
    #[must_use]
    pub fn with_timestamp_field_name(mut self, name: impl Into<String>) -> Self {
        self.timestamp_field_name = name.into();
        self
    }

    #[must_use]
    pub fn with_level_field_name(mut self, name: impl Into<String>) -> Self {
        self.level_field_name = name.into();
        self
    }

    #[must_use]
    pub fn with_message_field_name(mut self, name: impl Into<String>) -> Self {
        self.message_field_name = name.into();
        self
    }

    #[must_use]
    pub fn with_error_field_name(mut self, name: impl Into<String>) -> Self {
        self.error_field_name = name.into();
        self
    }

    #[must_use]
    pub fn with_caller_field_name(mut self, name: impl Into<String>) -> Self {
        self.caller_field_name = name.into();
        self
    }

    #[must_use]
    pub fn with_error_stack_field_name(mut self, name: impl Into<String>) -> Self {
        self.error_stack_field_name = name.into();
        self
    }

    #[must_use]
    pub fn with_time_format(mut self, format: TimestampFormat) -> Self {
        self.time_format = format;
        self
    }

    #[must_use]
    pub fn with_timestamp_fn(mut self, f: TimestampFn) -> Self {
        self.timestamp_fn = f;
        self
    }

    #[must_use]
    pub fn with_level_marshal(mut self, f: LevelMarshalFn) -> Self {
        self.level_marshal = f;
        self
    }

    #[must_use]
    pub fn with_caller_marshal(mut self, f: CallerMarshalFn) -> Self {
        self.caller_marshal = f;
        self
    }

    #[must_use]
    pub fn with_error_marshal(mut self, f: ErrorMarshalFn) -> Self {
        self.error_marshal = f;
        self
    }

    #[must_use]
    pub fn with_error_stack_marshal(mut self, f: ErrorStackMarshalFn) -> Self {
        self.error_stack_marshal = f;
        self
    }

    #[must_use]
    pub fn with_error_handler(mut self, f: ErrorHandler) -> Self {
        self.error_handler = f;
        self
    }

    /// Wrap these settings in an Arc for sharing across loggers
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl fmt::Debug for EncoderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncoderSettings")
            .field("timestamp_field_name", &self.timestamp_field_name)
            .field("level_field_name", &self.level_field_name)
            .field("message_field_name", &self.message_field_name)
            .field("error_field_name", &self.error_field_name)
            .field("caller_field_name", &self.caller_field_name)
            .field("error_stack_field_name", &self.error_stack_field_name)
            .field("time_format", &self.time_format)
            .finish_non_exhaustive()
    }
}

/// `src/handlers/user.rs`, 42 -> `user.rs:42`
pub fn short_caller(file: &str, line: u32) -> String {
    let short = Path::new(file)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file);
    format!("{}:{}", short, line)
}

/// Encode the `source()` chain of an error, outermost cause first
pub fn source_chain(err: &(dyn StdError + 'static)) -> Option<Value> {
    let mut chain = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push(Value::String(cause.to_string()));
        source = cause.source();
    }
    if chain.is_empty() {
        None
    } else {
        Some(Value::Array(chain))
    }
}

fn level_value(level: LogLevel) -> String {
    level.as_value().to_string()
}

fn error_text(err: &(dyn StdError + 'static)) -> Value {
    Value::String(err.to_string())
}

fn report_to_stderr(err: &LoggerError) {
    eprintln!("[LOGGER ERROR] {}", err);
}
