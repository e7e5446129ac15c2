//! Leveled logging facade
//!
//! [`Logger`] is the handle applications log through. It wraps a
//! [`LoggerCore`] and adds one method per level, both positional
//! (`info(args![...])`) and formatted (`infof(format_args!(...))`).
//!
//! Decoration methods change the logger in place and return it for chaining.
//! [`Logger::fork`] is the only way to get an independent logger; the handle
//! itself is not `Clone`, share it through an `Arc` instead.

use crate::config::Config;
use crate::core::error::Result;
use crate::core::logger::{KvLogger, LoggerBuilder, LoggerCore};
use crate::core::{LogLevel, LogValue, LoggerMetrics, Output};
use std::fmt;
use std::io::Write;

/// Leveled, structured logger
///
/// # Examples
///
/// ```
/// use rust_leveled_logger::prelude::*;
/// use rust_leveled_logger::args;
///
/// let logger = Logger::new(Output::stderr(), LogLevel::Info);
/// logger.with_timestamp().with_fields(args!["service", "billing"]);
///
/// logger.info(args!["charge accepted", "amount", 1250]);
/// logger.infof(format_args!("{} retries left", 3));
///
/// let request_logger = logger.fork();
/// request_logger.with_fields(args!["request_id", "a1b2"]);
/// assert_eq!(logger.bound_fields(), vec!["service"]);
/// ```
pub struct Logger {
    core: LoggerCore,
}

impl Logger {
    /// Create a logger writing to `output` at minimum `level`
    #[must_use]
    pub fn new(output: Output, level: LogLevel) -> Self {
        Self::from(LoggerCore::new(output, level))
    }

    /// Create a logger writing to any writer
    #[must_use]
    pub fn with_writer<W: Write + Send + 'static>(writer: W, level: LogLevel) -> Self {
        Self::new(Output::new(writer), level)
    }

    /// Start building a logger core; finish with `.build().into()`
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerCore::builder()
    }

    /// Build a logger from configuration.
    ///
    /// The destination is stdout, or the configured rotating file followed
    /// by stdout when a path is set.
    ///
    /// # Errors
    ///
    /// Returns error if the log file cannot be opened
    pub fn from_config(config: &Config) -> Result<Self> {
        let output = config.open_output()?;
        Ok(Self::new(output, config.log_level()))
    }

    /// The underlying core
    pub fn core(&self) -> &LoggerCore {
        &self.core
    }

    /// Log positional values at `level`
    #[track_caller]
    pub fn log<I>(&self, level: LogLevel, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        self.core.log(level, values);
    }

    #[track_caller]
    fn log_fmt(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        self.core
            .log(level, std::iter::once_with(|| LogValue::Str(fmt::format(args))));
    }

    #[track_caller]
    pub fn debug<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        self.core.log(LogLevel::Debug, values);
    }

    #[track_caller]
    pub fn info<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        self.core.log(LogLevel::Info, values);
    }

    /// Alias of [`Logger::info`]
    #[track_caller]
    pub fn print<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        self.core.log(LogLevel::Info, values);
    }

    #[track_caller]
    pub fn warn<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        self.core.log(LogLevel::Warn, values);
    }

    #[track_caller]
    pub fn error<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        self.core.log(LogLevel::Error, values);
    }

    /// Log at fatal level, then run the fatal handler (process exit by
    /// default). Nothing happens when `values` is empty.
    #[track_caller]
    pub fn fatal<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        self.core.log(LogLevel::Fatal, values);
    }

    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(LogLevel::Debug, args);
    }

    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(LogLevel::Info, args);
    }

    /// Alias of [`Logger::infof`]
    #[track_caller]
    pub fn printf(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(LogLevel::Info, args);
    }

    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(LogLevel::Warn, args);
    }

    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(LogLevel::Error, args);
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(LogLevel::Fatal, args);
    }

    pub fn level(&self) -> LogLevel {
        self.core.level()
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        self.core.enabled(level)
    }

    pub fn set_level(&self, level: LogLevel) -> &Self {
        self.core.set_level(level);
        self
    }

    pub fn set_output<W: Write + Send + 'static>(&self, writer: W) -> &Self {
        self.core.set_output(writer);
        self
    }

    /// Write to an existing shared destination
    pub fn set_shared_output(&self, output: Output) -> &Self {
        self.core.set_shared_output(output);
        self
    }

    pub fn with_timestamp(&self) -> &Self {
        self.core.with_timestamp();
        self
    }

    pub fn with_caller(&self) -> &Self {
        self.core.with_caller();
        self
    }

    pub fn with_caller_with_skip_frame_count(&self, skip: usize) -> &Self {
        self.core.with_caller_with_skip_frame_count(skip);
        self
    }

    pub fn with_stack(&self) -> &Self {
        self.core.with_stack();
        self
    }

    pub fn with_fields<I>(&self, fields: I) -> &Self
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        self.core.with_fields(fields);
        self
    }

    pub fn bound_fields(&self) -> Vec<String> {
        self.core.bound_fields()
    }

    /// Independent copy of this logger's current level, output and decorations
    #[must_use]
    pub fn fork(&self) -> Self {
        Self::from(self.core.fork())
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        self.core.metrics()
    }

    /// Flush the destination
    ///
    /// # Errors
    ///
    /// Returns error if the destination fails to flush
    pub fn flush(&self) -> Result<()> {
        self.core.output().flush()?;
        Ok(())
    }
}

impl From<LoggerCore> for Logger {
    fn from(core: LoggerCore) -> Self {
        Self { core }
    }
}

impl KvLogger for Logger {
    #[track_caller]
    fn log_kv(&self, level: LogLevel, values: Vec<LogValue>) {
        self.core.log(level, values);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("core", &self.core).finish()
    }
}
