//! Event encoding
//!
//! An [`EventEncoder`] turns one [`Record`] plus the logger's bound
//! [`Decorations`] into the bytes of a single event. [`JsonEncoder`] writes one
//! JSON object per line.

use super::error::Result;
use super::record::{pairs, Record};
use super::settings::EncoderSettings;
use super::value::LogValue;
use serde_json::Value;
use std::fmt;
use std::panic::Location;
use std::path::Path;

/// Persistent modifiers applied to every event of a logger.
///
/// Decorations are immutable once built: binding a new one produces a new
/// value, so a snapshot taken by an in-flight emit is never altered.
#[derive(Debug, Clone, Default)]
pub struct Decorations {
    fields: Vec<(String, Value)>,
    timestamp: bool,
    caller_skip: Option<usize>,
    stack: bool,
}

impl Decorations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timestamp(mut self) -> Self {
        self.timestamp = true;
        self
    }

    /// Annotate events with their call site, `skip` frames beyond it
    #[must_use]
    pub fn with_caller(mut self, skip: usize) -> Self {
        self.caller_skip = Some(skip);
        self
    }

    #[must_use]
    pub fn with_stack(mut self) -> Self {
        self.stack = true;
        self
    }

    /// Bind key/value pairs. Values are encoded now, not at emit time.
    #[must_use]
    pub fn with_fields<I>(mut self, values: I, settings: &EncoderSettings) -> Self
    where
        I: IntoIterator<Item = LogValue>,
    {
        self.fields.extend(
            pairs(values).map(|(key, value)| (key, value_to_json(&value, settings))),
        );
        self
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn has_timestamp(&self) -> bool {
        self.timestamp
    }

    pub fn caller_skip(&self) -> Option<usize> {
        self.caller_skip
    }

    pub fn has_stack(&self) -> bool {
        self.stack
    }
}

/// One event ready for encoding
#[derive(Debug)]
pub struct Event<'a> {
    pub record: &'a Record,
    pub decorations: &'a Decorations,
    /// Call site of the public log call
    pub location: &'static Location<'static>,
}

/// Serializes events into bytes
pub trait EventEncoder: Send + Sync + fmt::Debug {
    /// Append the encoded event, including any trailing delimiter, to `buf`
    fn encode(&self, event: &Event<'_>, settings: &EncoderSettings, buf: &mut Vec<u8>)
        -> Result<()>;
}

/// Encodes each event as a single-line JSON object.
///
/// Field order: level, bound fields, stack, error, message, call fields,
/// timestamp, caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl JsonEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl EventEncoder for JsonEncoder {
    fn encode(
        &self,
        event: &Event<'_>,
        settings: &EncoderSettings,
        buf: &mut Vec<u8>,
    ) -> Result<()> {
        let record = event.record;
        let decorations = event.decorations;
        let mut obj = JsonObject::begin(buf);

        obj.field_str(
            &settings.level_field_name,
            &(settings.level_marshal)(record.level),
        )?;

        for (key, value) in decorations.fields() {
            obj.field(key, value)?;
        }

        if let Some(err) = &record.error {
            let err: &(dyn std::error::Error + 'static) = &**err;
            if decorations.has_stack() {
                if let Some(stack) = (settings.error_stack_marshal)(err) {
                    obj.field(&settings.error_stack_field_name, &stack)?;
                }
            }
            obj.field(&settings.error_field_name, &(settings.error_marshal)(err))?;
        }

        if let Some(message) = &record.message {
            obj.field_str(&settings.message_field_name, message)?;
        }

        for (key, value) in &record.fields {
            obj.field(key, &value_to_json(value, settings))?;
        }

        if decorations.has_timestamp() {
            let now = (settings.timestamp_fn)();
            obj.field(
                &settings.timestamp_field_name,
                &settings.time_format.to_json_value(&now),
            )?;
        }

        if let Some(skip) = decorations.caller_skip() {
            let (file, line) = resolve_caller(event.location, skip);
            obj.field_str(&settings.caller_field_name, &(settings.caller_marshal)(&file, line))?;
        }

        obj.end();
        Ok(())
    }
}

fn value_to_json(value: &LogValue, settings: &EncoderSettings) -> Value {
    match value {
        LogValue::Error(err) => {
            let err: &(dyn std::error::Error + 'static) = &**err;
            (settings.error_marshal)(err)
        }
        other => other.to_json_value(),
    }
}

struct JsonObject<'a> {
    buf: &'a mut Vec<u8>,
    empty: bool,
}

impl<'a> JsonObject<'a> {
    fn begin(buf: &'a mut Vec<u8>) -> Self {
        buf.push(b'{');
        Self { buf, empty: true }
    }

    fn key(&mut self, key: &str) -> Result<()> {
        if !self.empty {
            self.buf.push(b',');
        }
        self.empty = false;
        serde_json::to_writer(&mut *self.buf, key)?;
        self.buf.push(b':');
        Ok(())
    }

    fn field(&mut self, key: &str, value: &Value) -> Result<()> {
        self.key(key)?;
        serde_json::to_writer(&mut *self.buf, value)?;
        Ok(())
    }

    fn field_str(&mut self, key: &str, value: &str) -> Result<()> {
        self.key(key)?;
        serde_json::to_writer(&mut *self.buf, value)?;
        Ok(())
    }

    fn end(self) {
        self.buf.extend_from_slice(b"}\n");
    }
}

/// Resolve the caller `skip` frames beyond the tracked call site.
///
/// `location` is the public call site captured through `#[track_caller]`, so
/// no frames internal to the logger ever need skipping. Extra frames are
/// located by walking a captured backtrace outward from that call site; when
/// symbols are unavailable the tracked call site is used.
pub fn resolve_caller(location: &'static Location<'static>, skip: usize) -> (String, u32) {
    let tracked = (location.file().to_string(), location.line());
    if skip == 0 {
        return tracked;
    }

    let trace = backtrace::Backtrace::new();
    let frames: Vec<(&Path, u32)> = trace
        .frames()
        .iter()
        .flat_map(|frame| frame.symbols())
        .filter_map(|symbol| Some((symbol.filename()?, symbol.lineno()?)))
        .collect();

    frames
        .iter()
        .position(|(file, line)| *line == location.line() && file.ends_with(location.file()))
        .and_then(|idx| idx.checked_add(skip))
        .and_then(|idx| frames.get(idx))
        .map(|(file, line)| (file.display().to_string(), *line))
        .unwrap_or(tracked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::core::log_level::LogLevel;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn fixed_settings() -> EncoderSettings {
        EncoderSettings::default().with_timestamp_fn(Arc::new(|| {
            Utc.with_ymd_and_hms(2001, 2, 3, 4, 5, 6)
                .single()
                .expect("valid datetime")
        }))
    }

    fn encode(record: &Record, decorations: &Decorations, settings: &EncoderSettings) -> String {
        let event = Event {
            record,
            decorations,
            location: Location::caller(),
        };
        let mut buf = Vec::new();
        JsonEncoder
            .encode(&event, settings, &mut buf)
            .expect("encoding succeeds");
        String::from_utf8(buf).expect("utf8 output")
    }

    fn location_of_returned_call() -> &'static Location<'static> {
        Location::caller()
    }

    #[test]
    fn test_resolve_caller_falls_back_when_site_not_on_stack() {
        let location = location_of_returned_call();
        let tracked = (location.file().to_string(), location.line());
        assert_eq!(resolve_caller(location, 1), tracked);
    }

    #[test]
    fn test_resolve_caller_falls_back_past_stack_depth() {
        let (file, line) = resolve_caller(Location::caller(), usize::MAX);
        assert_eq!(line, line!() - 1);
        assert!(file.ends_with("encoder.rs"));
    }

    #[test]
    fn test_message_only() {
        let settings = fixed_settings();
        let record = Record::from_values(LogLevel::Info, args!["hello"], "msg");
        let out = encode(&record, &Decorations::new(), &settings);
        assert_eq!(out, "{\"level\":\"info\",\"msg\":\"hello\"}\n");
    }

    #[test]
    fn test_complex_values() {
        let settings = fixed_settings();
        let record = Record::from_values(
            LogLevel::Info,
            args!["string", "num", 1, "bool", true, "nil", ()],
            "msg",
        );
        let out = encode(&record, &Decorations::new(), &settings);
        assert_eq!(
            out,
            "{\"level\":\"info\",\"msg\":\"string\",\"num\":1,\"bool\":true,\"nil\":null}\n"
        );
    }

    #[test]
    fn test_field_order_with_decorations() {
        let settings = fixed_settings();
        let decorations = Decorations::new()
            .with_fields(args!["foo", "bar"], &settings)
            .with_timestamp();
        let record = Record::from_values(LogLevel::Warn, args!["hello world", "k", 2], "msg");
        let out = encode(&record, &decorations, &settings);
        assert_eq!(
            out,
            "{\"level\":\"warn\",\"foo\":\"bar\",\"msg\":\"hello world\",\"k\":2,\"ts\":\"2001-02-03T04:05:06Z\"}\n"
        );
    }

    #[derive(Debug, thiserror::Error)]
    #[error("seems we have an error here")]
    struct Wrapped(#[source] std::io::Error);

    #[test]
    fn test_error_with_stack() {
        let settings = fixed_settings();
        let err = Wrapped(std::io::Error::other("inner cause"));
        let record = Record::from_values(LogLevel::Error, args![LogValue::error(err)], "msg");
        let out = encode(&record, &Decorations::new().with_stack(), &settings);
        assert_eq!(
            out,
            "{\"level\":\"error\",\"stack\":[\"inner cause\"],\"error\":\"seems we have an error here\"}\n"
        );

        let out = encode(&record, &Decorations::new(), &settings);
        assert_eq!(out, "{\"level\":\"error\",\"error\":\"seems we have an error here\"}\n");
    }

    #[test]
    fn test_caller_uses_call_site() {
        let settings = fixed_settings();
        let record = Record::from_values(LogLevel::Info, args!["here"], "msg");
        let out = encode(&record, &Decorations::new().with_caller(0), &settings);
        let parsed: Value = serde_json::from_str(&out).expect("valid json");
        let caller = parsed["caller"].as_str().expect("caller field");
        assert!(caller.starts_with("encoder.rs:"), "caller was {}", caller);
    }

    #[test]
    fn test_custom_field_names() {
        let settings = fixed_settings()
            .with_level_field_name("severity")
            .with_message_field_name("message");
        let record = Record::from_values(LogLevel::Debug, args!["renamed"], "message");
        let out = encode(&record, &Decorations::new(), &settings);
        assert_eq!(out, "{\"severity\":\"debug\",\"message\":\"renamed\"}\n");
    }

    #[test]
    fn test_bound_error_value_is_marshaled() {
        let settings = fixed_settings();
        let decorations =
            Decorations::new().with_fields(args!["cause", std::io::Error::other("bad")], &settings);
        assert_eq!(decorations.fields()[0].1, serde_json::json!("bad"));
    }

    #[test]
    fn test_resolve_caller_without_skip_is_tracked_location() {
        let location = Location::caller();
        let (file, line) = resolve_caller(location, 0);
        assert_eq!(file, location.file());
        assert_eq!(line, location.line());
    }
}
