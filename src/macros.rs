//! Logging macros for positional and formatted log calls.
//!
//! Positional macros take any mix of values convertible into
//! [`LogValue`](crate::core::LogValue); the event pipeline decides which one
//! is the message, which are fields and which is the error. The `…f!` macros
//! format their arguments into a single message, lazily: nothing is formatted
//! when the level is disabled.
//!
//! # Examples
//!
//! ```
//! use rust_leveled_logger::prelude::*;
//! use rust_leveled_logger::{info, infof};
//!
//! let logger = Logger::new(Output::stderr(), LogLevel::Info);
//!
//! // Message only
//! info!(logger, "Server started");
//!
//! // Message plus fields
//! info!(logger, "Server listening", "port", 8080);
//!
//! // Formatted message
//! let port = 8080;
//! infof!(logger, "Server listening on port {}", port);
//! ```

/// Collect positional values into a `Vec<LogValue>`.
///
/// ```
/// use rust_leveled_logger::{args, core::LogValue};
///
/// let values = args!["user", 42, "admin", true];
/// assert_eq!(values.len(), 4);
/// assert!(matches!(values[1], LogValue::Int(42)));
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::core::LogValue>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::core::LogValue::from($value)),+]
    };
}

/// Log positional values at an explicit level.
///
/// ```
/// # use rust_leveled_logger::prelude::*;
/// # let logger = Logger::new(Output::stderr(), LogLevel::Info);
/// use rust_leveled_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "request failed", "status", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr $(, $value:expr)* $(,)?) => {
        $logger.log($level, $crate::args![$($value),*])
    };
}

/// Log positional values at debug level.
#[macro_export]
macro_rules! debug {
    ($logger:expr $(, $value:expr)* $(,)?) => {
        $crate::log!($logger, $crate::core::LogLevel::Debug $(, $value)*)
    };
}

/// Log positional values at info level.
///
/// ```
/// # use rust_leveled_logger::prelude::*;
/// # let logger = Logger::new(Output::stderr(), LogLevel::Info);
/// use rust_leveled_logger::info;
/// info!(logger, "Application started");
/// info!(logger, "items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr $(, $value:expr)* $(,)?) => {
        $crate::log!($logger, $crate::core::LogLevel::Info $(, $value)*)
    };
}

/// Log positional values at warn level.
#[macro_export]
macro_rules! warn {
    ($logger:expr $(, $value:expr)* $(,)?) => {
        $crate::log!($logger, $crate::core::LogLevel::Warn $(, $value)*)
    };
}

/// Log positional values at error level.
///
/// The first error value among them becomes the event's error field.
///
/// ```
/// # use rust_leveled_logger::prelude::*;
/// # let logger = Logger::new(Output::stderr(), LogLevel::Info);
/// use rust_leveled_logger::error;
/// let err = std::io::Error::other("connection refused");
/// error!(logger, "Failed to connect to database", err, "attempt", 3);
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr $(, $value:expr)* $(,)?) => {
        $crate::log!($logger, $crate::core::LogLevel::Error $(, $value)*)
    };
}

/// Log positional values at fatal level, then run the logger's fatal handler.
#[macro_export]
macro_rules! fatal {
    ($logger:expr $(, $value:expr)* $(,)?) => {
        $crate::log!($logger, $crate::core::LogLevel::Fatal $(, $value)*)
    };
}

/// Log a formatted message at debug level.
#[macro_export]
macro_rules! debugf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debugf(::std::format_args!($($arg)+))
    };
}

/// Log a formatted message at info level.
///
/// ```
/// # use rust_leveled_logger::prelude::*;
/// # let logger = Logger::new(Output::stderr(), LogLevel::Info);
/// use rust_leveled_logger::infof;
/// infof!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! infof {
    ($logger:expr, $($arg:tt)+) => {
        $logger.infof(::std::format_args!($($arg)+))
    };
}

/// Log a formatted message at warn level.
#[macro_export]
macro_rules! warnf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warnf(::std::format_args!($($arg)+))
    };
}

/// Log a formatted message at error level.
#[macro_export]
macro_rules! errorf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.errorf(::std::format_args!($($arg)+))
    };
}

/// Log a formatted message at fatal level, then run the logger's fatal handler.
#[macro_export]
macro_rules! fatalf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatalf(::std::format_args!($($arg)+))
    };
}
