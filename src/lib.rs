//! # Rust Leveled Logger
//!
//! A leveled, structured logging facade writing one JSON object per event.
//!
//! ## Features
//!
//! - **Positional arguments**: a call's values become a message, key/value
//!   fields and an optional error, depending on their count and types
//! - **Decorations**: timestamp, caller, error stack and bound fields,
//!   attached in place or on an independent [`Logger::fork`]
//! - **Destinations**: any `Write`, a size-rotated file, or several at once
//! - **Process-wide default**: free functions in [`global`], swapped
//!   atomically on re-initialization
//!
//! ## Example
//!
//! ```
//! use rust_leveled_logger::prelude::*;
//! use rust_leveled_logger::{args, info};
//!
//! let logger = Logger::new(Output::stderr(), LogLevel::Info);
//! logger.with_timestamp().with_caller();
//!
//! info!(logger, "user signed in", "user_id", 42);
//! logger.error(args![std::io::Error::other("disk full"), "path", "/var/data"]);
//! ```

pub mod appenders;
pub mod config;
pub mod context;
pub mod core;
pub mod facade;
pub mod global;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{broadcast, BroadcastWriter, RotatingFileWriter, RotationPolicy};
    pub use crate::config::Config;
    pub use crate::context::{from_context, with_logger, Context};
    pub use crate::core::{
        EncoderSettings, KvLogger, LogLevel, LogValue, LoggerCore, LoggerError, LoggerMetrics,
        Output, Result, TimestampFormat,
    };
    pub use crate::facade::Logger;
}

pub use crate::config::Config;
pub use crate::core::{
    EncoderSettings, KvLogger, LogLevel, LogValue, LoggerCore, LoggerError, LoggerMetrics, Output,
    Result, TimestampFormat,
};
pub use crate::facade::Logger;
