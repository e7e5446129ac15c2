//! Process-wide default logger
//!
//! The default starts as a stdout logger at info level. [`init`] and
//! [`set_default`] replace it with a single atomic pointer swap: handles
//! obtained earlier through [`default_logger`] keep pointing at the old
//! logger, and every free function called afterwards uses the new one.
//!
//! ```
//! use rust_leveled_logger::{args, global, Config};
//!
//! let logger = global::init(&Config::new().with_level("debug")).unwrap();
//! logger.with_fields(args!["app", "demo"]);
//!
//! global::debug(args!["ready"]);
//! global::infof(format_args!("listening on {}", 8080));
//! ```

use crate::config::Config;
use crate::core::error::Result;
use crate::core::{LogLevel, LogValue, Output};
use crate::facade::Logger;
use arc_swap::ArcSwap;
use std::fmt;
use std::io::Write;
use std::sync::{Arc, LazyLock};

static DEFAULT: LazyLock<ArcSwap<Logger>> =
    LazyLock::new(|| ArcSwap::from_pointee(initial_logger()));

fn initial_logger() -> Logger {
    Logger::new(Output::stdout(), LogLevel::Info)
}

/// Replace the default with a logger built from `config` and return it
///
/// # Errors
///
/// Returns error if the configured log file cannot be opened; the current
/// default stays in place.
pub fn init(config: &Config) -> Result<Arc<Logger>> {
    let logger = Logger::from_config(config)?;
    Ok(set_default(logger))
}

/// Install `logger` as the default and return the shared handle
pub fn set_default(logger: Logger) -> Arc<Logger> {
    let logger = Arc::new(logger);
    set_default_shared(Arc::clone(&logger));
    logger
}

pub fn set_default_shared(logger: Arc<Logger>) {
    DEFAULT.store(logger);
}

/// Restore the initial stdout logger at info level
pub fn reset() -> Arc<Logger> {
    set_default(initial_logger())
}

/// The current default logger
pub fn default_logger() -> Arc<Logger> {
    DEFAULT.load_full()
}

/// Independent copy of the default logger
pub fn fork() -> Logger {
    DEFAULT.load().fork()
}

pub fn set_level(level: LogLevel) -> Arc<Logger> {
    let logger = default_logger();
    logger.set_level(level);
    logger
}

pub fn set_output<W: Write + Send + 'static>(writer: W) -> Arc<Logger> {
    let logger = default_logger();
    logger.set_output(writer);
    logger
}

pub fn with_timestamp() -> Arc<Logger> {
    let logger = default_logger();
    logger.with_timestamp();
    logger
}

pub fn with_caller() -> Arc<Logger> {
    let logger = default_logger();
    logger.with_caller();
    logger
}

pub fn with_caller_with_skip_frame_count(skip: usize) -> Arc<Logger> {
    let logger = default_logger();
    logger.with_caller_with_skip_frame_count(skip);
    logger
}

pub fn with_stack() -> Arc<Logger> {
    let logger = default_logger();
    logger.with_stack();
    logger
}

pub fn with_fields<I>(fields: I) -> Arc<Logger>
where
    I: IntoIterator,
    I::Item: Into<LogValue>,
{
    let logger = default_logger();
    logger.with_fields(fields);
    logger
}

#[track_caller]
pub fn log<I>(level: LogLevel, values: I)
where
    I: IntoIterator,
    I::Item: Into<LogValue>,
{
    DEFAULT.load().log(level, values);
}

#[track_caller]
pub fn debug<I>(values: I)
where
    I: IntoIterator,
    I::Item: Into<LogValue>,
{
    DEFAULT.load().debug(values);
}

#[track_caller]
pub fn info<I>(values: I)
where
    I: IntoIterator,
    I::Item: Into<LogValue>,
{
    DEFAULT.load().info(values);
}

/// Alias of [`info`]
#[track_caller]
pub fn print<I>(values: I)
where
    I: IntoIterator,
    I::Item: Into<LogValue>,
{
    DEFAULT.load().print(values);
}

#[track_caller]
pub fn warn<I>(values: I)
where
    I: IntoIterator,
    I::Item: Into<LogValue>,
{
    DEFAULT.load().warn(values);
}

#[track_caller]
pub fn error<I>(values: I)
where
    I: IntoIterator,
    I::Item: Into<LogValue>,
{
    DEFAULT.load().error(values);
}

#[track_caller]
pub fn fatal<I>(values: I)
where
    I: IntoIterator,
    I::Item: Into<LogValue>,
{
    DEFAULT.load().fatal(values);
}

#[track_caller]
pub fn debugf(args: fmt::Arguments<'_>) {
    DEFAULT.load().debugf(args);
}

#[track_caller]
pub fn infof(args: fmt::Arguments<'_>) {
    DEFAULT.load().infof(args);
}

/// Alias of [`infof`]
#[track_caller]
pub fn printf(args: fmt::Arguments<'_>) {
    DEFAULT.load().printf(args);
}

#[track_caller]
pub fn warnf(args: fmt::Arguments<'_>) {
    DEFAULT.load().warnf(args);
}

#[track_caller]
pub fn errorf(args: fmt::Arguments<'_>) {
    DEFAULT.load().errorf(args);
}

#[track_caller]
pub fn fatalf(args: fmt::Arguments<'_>) {
    DEFAULT.load().fatalf(args);
}
