//! Logger core: level gate, event construction and emission
//!
//! A [`LoggerCore`] owns an encoder, the bound [`Decorations`], a minimum
//! level and an [`Output`]. All four live behind one lock. The lock is held
//! only to read or replace them; encoding and writing happen after it is
//! released, on a snapshot taken for the call.

use super::{
    encoder::{Decorations, Event, EventEncoder, JsonEncoder},
    error::LoggerError,
    log_level::LogLevel,
    metrics::LoggerMetrics,
    output::Output,
    record::Record,
    settings::{encoder_settings, EncoderSettings},
    value::LogValue,
};
use parking_lot::Mutex;
use std::fmt;
use std::io::Write;
use std::panic::Location;
use std::sync::Arc;

/// Called after a fatal event has been written. Receives the exit code.
pub type FatalHandler = Arc<dyn Fn(i32) + Send + Sync>;

/// Exit code passed to the fatal handler
pub const FATAL_EXIT_CODE: i32 = 1;

/// Default fatal handler: terminate the process
pub fn exit_process() -> FatalHandler {
    Arc::new(|code| std::process::exit(code))
}

/// Anything that accepts leveled positional values.
pub trait KvLogger: Send + Sync {
    #[track_caller]
    fn log_kv(&self, level: LogLevel, values: Vec<LogValue>);
}

struct CoreState {
    encoder: Arc<dyn EventEncoder>,
    decorations: Arc<Decorations>,
    level: LogLevel,
    output: Output,
}

pub struct LoggerCore {
    state: Mutex<CoreState>,
    /// Per-logger settings; the process-wide settings are used when unset
    settings: Option<Arc<EncoderSettings>>,
    on_fatal: FatalHandler,
    metrics: Arc<LoggerMetrics>,
}

impl LoggerCore {
    /// Create a core writing JSON events to `output` at minimum `level`
    #[must_use]
    pub fn new(output: Output, level: LogLevel) -> Self {
        Self::builder().output(output).min_level(level).build()
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Run the event pipeline for one call.
    ///
    /// Returns without touching `values` when `level` is below the minimum,
    /// and without emitting anything when `values` is empty. Write failures
    /// are handed to the settings' error handler, never to the caller. After a
    /// `Fatal` event is written the fatal handler runs.
    #[track_caller]
    pub fn log<I>(&self, level: LogLevel, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        let (encoder, decorations, output) = {
            let state = self.state.lock();
            if level < state.level {
                return;
            }
            (
                Arc::clone(&state.encoder),
                Arc::clone(&state.decorations),
                state.output.clone(),
            )
        };

        let values: Vec<LogValue> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return;
        }

        let location = Location::caller();
        let settings = self.settings();
        let record = Record::from_values(level, values, &settings.message_field_name);
        let event = Event {
            record: &record,
            decorations: &decorations,
            location,
        };
        self.emit(encoder.as_ref(), &event, &output, &settings);

        if level == LogLevel::Fatal {
            (self.on_fatal)(FATAL_EXIT_CODE);
        }
    }

    fn emit(
        &self,
        encoder: &dyn EventEncoder,
        event: &Event<'_>,
        output: &Output,
        settings: &EncoderSettings,
    ) {
        let mut buf = Vec::with_capacity(256);
        let result = encoder.encode(event, settings, &mut buf).and_then(|()| {
            output
                .write_event(&buf)
                .map_err(|e| LoggerError::write_failed(event.record.level.as_value(), e))
        });

        match result {
            Ok(()) => {
                self.metrics.record_logged();
            }
            Err(e) => {
                self.metrics.record_dropped();
                (settings.error_handler)(&e);
            }
        }
    }

    /// Settings used for the next event
    pub fn settings(&self) -> Arc<EncoderSettings> {
        match &self.settings {
            Some(settings) => Arc::clone(settings),
            None => encoder_settings(),
        }
    }

    pub fn level(&self) -> LogLevel {
        self.state.lock().level
    }

    /// Whether an event at `level` would pass the gate
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.state.lock().level
    }

    pub fn set_level(&self, level: LogLevel) -> &Self {
        self.state.lock().level = level;
        self
    }

    pub fn set_output<W: Write + Send + 'static>(&self, writer: W) -> &Self {
        self.set_shared_output(Output::new(writer))
    }

    pub fn set_shared_output(&self, output: Output) -> &Self {
        self.state.lock().output = output;
        self
    }

    pub fn output(&self) -> Output {
        self.state.lock().output.clone()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn with_timestamp(&self) -> &Self {
        self.decorate(Decorations::with_timestamp)
    }

    /// Annotate events with the call site of the public log call
    pub fn with_caller(&self) -> &Self {
        self.with_caller_with_skip_frame_count(0)
    }

    /// Annotate events with the frame `skip` levels above the call site.
    ///
    /// Use this from logging helpers that are not themselves
    /// `#[track_caller]`, so the caller points past the helper.
    pub fn with_caller_with_skip_frame_count(&self, skip: usize) -> &Self {
        self.decorate(|d| d.with_caller(skip))
    }

    pub fn with_stack(&self) -> &Self {
        self.decorate(Decorations::with_stack)
    }

    /// Bind key/value pairs to every future event of this core
    pub fn with_fields<I>(&self, fields: I) -> &Self
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        let settings = self.settings();
        let fields: Vec<LogValue> = fields.into_iter().map(Into::into).collect();
        self.decorate(|d| d.with_fields(fields, &settings))
    }

    /// Keys of the bound fields, in binding order
    pub fn bound_fields(&self) -> Vec<String> {
        let decorations = Arc::clone(&self.state.lock().decorations);
        decorations.fields().iter().map(|(k, _)| k.clone()).collect()
    }

    fn decorate(&self, f: impl FnOnce(Decorations) -> Decorations) -> &Self {
        let mut state = self.state.lock();
        let next = f(Decorations::clone(&state.decorations));
        state.decorations = Arc::new(next);
        self
    }

    /// Create an independent core seeded from this one's current state.
    ///
    /// Level, output, encoder and decorations are read in one critical
    /// section. Later changes to either core do not affect the other, apart
    /// from the output sink itself, which both keep writing to.
    #[must_use]
    pub fn fork(&self) -> Self {
        let state = self.state.lock();
        Self {
            state: Mutex::new(CoreState {
                encoder: Arc::clone(&state.encoder),
                decorations: Arc::clone(&state.decorations),
                level: state.level,
                output: state.output.clone(),
            }),
            settings: self.settings.clone(),
            on_fatal: Arc::clone(&self.on_fatal),
            metrics: Arc::new(LoggerMetrics::new()),
        }
    }
}

impl KvLogger for LoggerCore {
    #[track_caller]
    fn log_kv(&self, level: LogLevel, values: Vec<LogValue>) {
        self.log(level, values);
    }
}

impl fmt::Debug for LoggerCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("LoggerCore")
            .field("level", &state.level)
            .field("encoder", &state.encoder)
            .field("decorations", &state.decorations)
            .field("output", &state.output)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing a [`LoggerCore`] with a fluent API
///
/// # Example
/// ```
/// use rust_leveled_logger::core::{LoggerCore, LogLevel, Output};
/// use std::sync::Arc;
///
/// let core = LoggerCore::builder()
///     .min_level(LogLevel::Debug)
///     .output(Output::stderr())
///     .on_fatal(Arc::new(|code| eprintln!("would exit with {}", code)))
///     .build();
/// assert_eq!(core.level(), LogLevel::Debug);
/// ```
pub struct LoggerBuilder {
    min_level: LogLevel,
    output: Option<Output>,
    encoder: Arc<dyn EventEncoder>,
    decorations: Decorations,
    settings: Option<Arc<EncoderSettings>>,
    on_fatal: Option<FatalHandler>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Info,
            output: None,
            encoder: Arc::new(JsonEncoder::new()),
            decorations: Decorations::new(),
            settings: None,
            on_fatal: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Set the destination. Defaults to stdout.
    #[must_use = "builder methods return a new value"]
    pub fn output(mut self, output: Output) -> Self {
        self.output = Some(output);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn writer<W: std::io::Write + Send + 'static>(self, writer: W) -> Self {
        self.output(Output::new(writer))
    }

    #[must_use = "builder methods return a new value"]
    pub fn encoder<E: EventEncoder + 'static>(mut self, encoder: E) -> Self {
        self.encoder = Arc::new(encoder);
        self
    }

    /// Start from pre-built decorations
    #[must_use = "builder methods return a new value"]
    pub fn decorations(mut self, decorations: Decorations) -> Self {
        self.decorations = decorations;
        self
    }

    /// Use these settings instead of the process-wide ones
    #[must_use = "builder methods return a new value"]
    pub fn settings(mut self, settings: Arc<EncoderSettings>) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Replace process termination on fatal events
    #[must_use = "builder methods return a new value"]
    pub fn on_fatal(mut self, handler: FatalHandler) -> Self {
        self.on_fatal = Some(handler);
        self
    }

    pub fn build(self) -> LoggerCore {
        LoggerCore {
            state: Mutex::new(CoreState {
                encoder: self.encoder,
                decorations: Arc::new(self.decorations),
                level: self.min_level,
                output: self.output.unwrap_or_default(),
            }),
            settings: self.settings,
            on_fatal: self.on_fatal.unwrap_or_else(exit_process),
            metrics: Arc::new(LoggerMetrics::new()),
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
