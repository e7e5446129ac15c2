//! Core logger types and traits

pub mod encoder;
pub mod error;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod output;
pub mod record;
pub mod settings;
pub mod timestamp;
pub mod value;

pub use encoder::{resolve_caller, Decorations, Event, EventEncoder, JsonEncoder};
pub use error::{LoggerError, Result};
pub use log_level::LogLevel;
pub use logger::{exit_process, FatalHandler, KvLogger, LoggerBuilder, LoggerCore, FATAL_EXIT_CODE};
pub use metrics::LoggerMetrics;
pub use output::Output;
pub use record::Record;
pub use settings::{
    encoder_settings, reset_encoder_settings, set_encoder_settings, short_caller, source_chain,
    CallerMarshalFn, EncoderSettings, ErrorHandler, ErrorMarshalFn, ErrorStackMarshalFn,
    LevelMarshalFn,
};
pub use timestamp::{system_clock, TimestampFn, TimestampFormat};
pub use value::{LogValue, SharedError};
