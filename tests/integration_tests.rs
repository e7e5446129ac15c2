//! Integration tests for rust_leveled_logger
//!
//! These tests drive the public API end to end and check the exact bytes
//! written to the destination.

use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use rust_leveled_logger::appenders::{broadcast, RotatingFileWriter, RotationPolicy};
use rust_leveled_logger::core::{EncoderSettings, LoggerCore, TimestampFormat};
use rust_leveled_logger::prelude::*;
use rust_leveled_logger::{args, error, info, infof, warn};
use serde_json::Value;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

#[derive(Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Buffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().clone()).expect("utf8 output")
    }

    fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    fn events(&self) -> Vec<Value> {
        self.lines()
            .iter()
            .map(|l| serde_json::from_str(l).expect("valid json line"))
            .collect()
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn fixed_settings() -> EncoderSettings {
    EncoderSettings::default().with_timestamp_fn(Arc::new(|| {
        Utc.with_ymd_and_hms(2001, 2, 3, 4, 5, 6)
            .single()
            .expect("valid datetime")
    }))
}

fn test_logger(level: LogLevel) -> (Logger, Buffer) {
    test_logger_with(level, fixed_settings())
}

fn test_logger_with(level: LogLevel, settings: EncoderSettings) -> (Logger, Buffer) {
    let buffer = Buffer::default();
    let core = LoggerCore::builder()
        .writer(buffer.clone())
        .min_level(level)
        .settings(settings.shared())
        .on_fatal(Arc::new(|_| {}))
        .build();
    (Logger::from(core), buffer)
}

#[derive(Debug, thiserror::Error)]
#[error("seems we have an error here")]
struct Outer(#[source] Middle);

#[derive(Debug, thiserror::Error)]
#[error("middle failed")]
struct Middle(#[source] io::Error);

fn failing_call() -> std::result::Result<(), Outer> {
    Err(Outer(Middle(io::Error::other("inner cause"))))
}

// ============================================================================
// Level gate
// ============================================================================

#[test]
fn test_disabled_levels_write_nothing() {
    for (min_idx, min) in LogLevel::ALL.iter().enumerate() {
        let (logger, buffer) = test_logger(*min);
        for below in &LogLevel::ALL[..min_idx] {
            logger.log(*below, args!["should not appear", "k", "v"]);
            logger.log(*below, args![io::Error::other("nor this")]);
        }
        assert!(
            buffer.contents().is_empty(),
            "level {} leaked output: {}",
            min,
            buffer.contents()
        );
    }
}

#[test]
fn test_enabled_levels_write_one_line_each() {
    let (logger, buffer) = test_logger(LogLevel::Warn);
    for level in LogLevel::ALL {
        logger.log(level, args!["hello world"]);
    }
    let levels: Vec<Value> = buffer.events().iter().map(|e| e["level"].clone()).collect();
    assert_eq!(levels, vec!["warn", "error", "fatal"]);
}

// ============================================================================
// Record shape
// ============================================================================

#[test]
fn test_log_shapes() {
    let cases: Vec<(Vec<LogValue>, &str)> = vec![
        (args![], ""),
        (args!["hello"], "{\"level\":\"info\",\"msg\":\"hello\"}\n"),
        (args!["foo", "bar"], "{\"level\":\"info\",\"foo\":\"bar\"}\n"),
        (
            args!["foo", "bar", "baz"],
            "{\"level\":\"info\",\"msg\":\"foo\",\"bar\":\"baz\"}\n",
        ),
        (
            args!["string", "num", 1, "bool", true, "nil", ()],
            "{\"level\":\"info\",\"msg\":\"string\",\"num\":1,\"bool\":true,\"nil\":null}\n",
        ),
    ];

    for (values, want) in cases {
        let (logger, buffer) = test_logger(LogLevel::Info);
        logger.info(values);
        assert_eq!(buffer.contents(), want);
    }
}

#[test]
fn test_zero_values_emit_nothing() {
    let (logger, buffer) = test_logger(LogLevel::Debug);
    logger.with_timestamp().with_caller().with_fields(args!["bound", 1]);

    logger.info(args![]);
    logger.info(Vec::<LogValue>::new());
    info!(logger);
    info!(logger,);

    assert!(buffer.contents().is_empty());
    assert_eq!(logger.metrics().total_logged(), 0);
}

#[test]
fn test_error_promoted_when_first() {
    let (logger, buffer) = test_logger(LogLevel::Info);
    logger.error(args![io::Error::other("boom"), "k", "v"]);
    assert_eq!(
        buffer.contents(),
        "{\"level\":\"error\",\"error\":\"boom\",\"k\":\"v\"}\n"
    );
}

#[test]
fn test_error_promoted_from_middle() {
    let (logger, buffer) = test_logger(LogLevel::Info);
    error!(logger, "request failed", io::Error::other("timeout"), "attempt", 3);
    assert_eq!(
        buffer.contents(),
        "{\"level\":\"error\",\"error\":\"timeout\",\"msg\":\"request failed\",\"attempt\":3}\n"
    );
}

#[test]
fn test_lone_error_with_stack() {
    let (logger, buffer) = test_logger(LogLevel::Info);
    logger.with_stack();
    let err = failing_call().unwrap_err();
    logger.error(args![LogValue::error(err)]);

    assert_eq!(
        buffer.contents(),
        "{\"level\":\"error\",\"stack\":[\"middle failed\",\"inner cause\"],\"error\":\"seems we have an error here\"}\n"
    );
}

#[test]
fn test_non_textual_first_value_goes_under_message_key() {
    let (logger, buffer) = test_logger(LogLevel::Info);
    logger.info(args![404, "path", "/missing"]);
    assert_eq!(
        buffer.contents(),
        "{\"level\":\"info\",\"msg\":404,\"path\":\"/missing\"}\n"
    );
}

#[test]
fn test_serializable_values() {
    #[derive(serde::Serialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    let (logger, buffer) = test_logger(LogLevel::Info);
    logger.info(args!["moved", "to", LogValue::json(&Point { x: 1, y: 2 }), "ratio", f64::NAN]);
    assert_eq!(
        buffer.contents(),
        "{\"level\":\"info\",\"msg\":\"moved\",\"to\":{\"x\":1,\"y\":2},\"ratio\":null}\n"
    );
}

// ============================================================================
// Decorations
// ============================================================================

#[test]
fn test_wire_field_order() {
    let (logger, buffer) = test_logger(LogLevel::Info);
    logger
        .with_fields(args!["service", "billing"])
        .with_timestamp()
        .with_caller()
        .with_stack();

    let err = failing_call().unwrap_err();
    logger.warn(args!["charge failed", LogValue::error(err), "amount", 1250]);
    let line = line!() - 1;

    let want = format!(
        "{{\"level\":\"warn\",\"service\":\"billing\",\"stack\":[\"middle failed\",\"inner cause\"],\"error\":\"seems we have an error here\",\"msg\":\"charge failed\",\"amount\":1250,\"ts\":\"2001-02-03T04:05:06Z\",\"caller\":\"integration_tests.rs:{}\"}}\n",
        line
    );
    assert_eq!(buffer.contents(), want);
}

#[test]
fn test_caller_through_macros_and_format_calls() {
    let (logger, buffer) = test_logger(LogLevel::Info);
    logger.with_caller();

    warn!(logger, "from macro");
    let macro_line = line!() - 1;
    infof!(logger, "from {}", "format macro");
    let format_line = line!() - 1;

    let events = buffer.events();
    assert_eq!(events[0]["caller"], format!("integration_tests.rs:{}", macro_line));
    assert_eq!(events[1]["caller"], format!("integration_tests.rs:{}", format_line));
}

/// Logs from a plain function; returns the line of the log call.
#[inline(never)]
fn log_through_helper(logger: &Logger) -> u32 {
    let line = line!() + 1;
    logger.info(args!["from helper"]);
    line
}

#[test]
fn test_caller_skip_names_helper_call_site() {
    let (logger, buffer) = test_logger(LogLevel::Info);
    logger.with_caller_with_skip_frame_count(1);

    log_through_helper(&logger);
    let call_line = line!() - 1;

    let events = buffer.events();
    assert_eq!(events[0]["caller"], format!("integration_tests.rs:{}", call_line));
}

#[test]
fn test_caller_skip_past_stack_falls_back_to_call_site() {
    let (logger, buffer) = test_logger(LogLevel::Info);
    logger.with_caller_with_skip_frame_count(100_000);

    let helper_line = log_through_helper(&logger);

    let events = buffer.events();
    assert_eq!(events[0]["caller"], format!("integration_tests.rs:{}", helper_line));
}

#[test]
fn test_with_fields_accumulates() {
    let (logger, buffer) = test_logger(LogLevel::Info);
    logger.with_fields(args!["a", 1]).with_fields(args!["b", 2, "dangling"]);
    logger.info(args!["hi"]);

    assert_eq!(logger.bound_fields(), vec!["a", "b", "dangling"]);
    assert_eq!(
        buffer.contents(),
        "{\"level\":\"info\",\"a\":1,\"b\":2,\"dangling\":\"[MISSING]\",\"msg\":\"hi\"}\n"
    );
}

#[test]
fn test_fork_isolation() {
    let (logger, buffer) = test_logger(LogLevel::Info);
    logger.with_fields(args!["shared", true]);

    let fork = logger.fork();
    fork.with_fields(args!["foo", "bar"]);
    fork.info(args!["hello world"]);
    logger.info(args!["hello world"]);

    assert_eq!(logger.bound_fields(), vec!["shared"]);
    assert_eq!(fork.bound_fields(), vec!["shared", "foo"]);
    assert_eq!(
        buffer.lines(),
        vec![
            "{\"level\":\"info\",\"shared\":true,\"foo\":\"bar\",\"msg\":\"hello world\"}",
            "{\"level\":\"info\",\"shared\":true,\"msg\":\"hello world\"}",
        ]
    );
}

#[test]
fn test_fork_has_independent_level_and_output() {
    let (logger, first) = test_logger(LogLevel::Info);
    let fork = logger.fork();
    let second = Buffer::default();
    fork.set_level(LogLevel::Error).set_output(second.clone());

    logger.warn(args!["original"]);
    fork.warn(args!["gated"]);
    fork.error(args!["forked"]);

    assert_eq!(first.lines(), vec!["{\"level\":\"warn\",\"msg\":\"original\"}"]);
    assert_eq!(second.lines(), vec!["{\"level\":\"error\",\"msg\":\"forked\"}"]);
}

// ============================================================================
// Encoder settings
// ============================================================================

#[test]
fn test_custom_settings() {
    let settings = fixed_settings()
        .with_level_field_name("severity")
        .with_message_field_name("message")
        .with_timestamp_field_name("time")
        .with_time_format(TimestampFormat::Unix)
        .with_level_marshal(Arc::new(|level: LogLevel| level.to_str().to_string()))
        .with_caller_marshal(Arc::new(|_file: &str, line: u32| format!("line {}", line)));
    let (logger, buffer) = test_logger_with(LogLevel::Info, settings);
    logger.with_timestamp().with_caller();

    logger.info(args!["renamed"]);
    let line = line!() - 1;

    assert_eq!(
        buffer.contents(),
        format!(
            "{{\"severity\":\"INFO\",\"message\":\"renamed\",\"time\":981173106,\"caller\":\"line {}\"}}\n",
            line
        )
    );
}

#[test]
fn test_write_errors_reach_error_handler_not_caller() {
    struct Closed;
    impl Write for Closed {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let failures = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&failures);
    let settings = fixed_settings().with_error_handler(Arc::new(move |err: &LoggerError| {
        assert!(matches!(err, LoggerError::WriteFailed { .. }));
        seen.fetch_add(1, Ordering::SeqCst);
    }));
    let (logger, _buffer) = test_logger_with(LogLevel::Info, settings);
    logger.set_output(Closed);

    logger.info(args!["lost"]);
    logger.error(args!["also lost"]);

    assert_eq!(failures.load(Ordering::SeqCst), 2);
    assert_eq!(logger.metrics().dropped_count(), 2);
    assert_eq!(logger.metrics().drop_rate(), 100.0);
}

#[test]
fn test_fatal_calls_handler_once_per_event() {
    let exits = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&exits);
    let buffer = Buffer::default();
    let logger = Logger::from(
        Logger::builder()
            .writer(buffer.clone())
            .settings(fixed_settings().shared())
            .on_fatal(Arc::new(move |code| {
                assert_eq!(code, 1);
                seen.fetch_add(1, Ordering::SeqCst);
            }))
            .build(),
    );

    logger.fatal(args!["shutting down"]);
    logger.fatalf(format_args!("exit {}", 1));
    logger.fatal(args![]);

    assert_eq!(exits.load(Ordering::SeqCst), 2);
    assert_eq!(buffer.lines().len(), 2);
}

// ============================================================================
// Destinations
// ============================================================================

#[test]
fn test_broadcast_destination() {
    let a = Buffer::default();
    let b = Buffer::default();
    let (logger, _unused) = test_logger(LogLevel::Info);
    logger.set_output(broadcast(vec![
        Box::new(a.clone()) as Box<dyn Write + Send>,
        Box::new(b.clone()),
    ]));

    logger.info(args!["everywhere"]);

    assert_eq!(a.contents(), "{\"level\":\"info\",\"msg\":\"everywhere\"}\n");
    assert_eq!(a.contents(), b.contents());
}

#[test]
fn test_rotating_file_destination() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("app.log");
    let writer = RotatingFileWriter::with_policy(&path, RotationPolicy::new().with_max_bytes(200))
        .expect("Failed to open log file");

    let (logger, _unused) = test_logger(LogLevel::Info);
    logger.set_output(writer);
    for i in 0..20 {
        logger.info(args!["rotating", "i", i]);
    }
    logger.flush().expect("flush");

    let mut files: Vec<_> = std::fs::read_dir(temp_dir.path())
        .expect("read dir")
        .map(|e| e.expect("dir entry").path())
        .collect();
    files.sort();
    assert!(files.len() > 1, "expected rotation, found {:?}", files);

    let total_lines: usize = files
        .iter()
        .map(|p| std::fs::read_to_string(p).expect("read log").lines().count())
        .sum();
    assert_eq!(total_lines, 20);
}

#[test]
fn test_logger_from_config_writes_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("log/app.log");
    let config = Config::new()
        .with_level("warn")
        .with_path(path.to_str().expect("utf8 path"))
        .with_max_size(1)
        .with_max_age(7);

    let logger = Logger::from_config(&config).expect("logger from config");
    logger.info(args!["filtered"]);
    logger.warn(args!["kept"]);

    let content = std::fs::read_to_string(&path).expect("read log");
    assert!(!content.contains("filtered"));
    assert!(content.contains("\"msg\":\"kept\""));
}

// ============================================================================
// Context
// ============================================================================

#[test]
fn test_context_carries_logger_across_threads() {
    let (logger, buffer) = test_logger(LogLevel::Info);
    logger.with_fields(args!["request_id", "r-1"]);
    let ctx = with_logger(&Context::background(), Arc::new(logger));

    let child = ctx.with_value("handler");
    std::thread::spawn(move || {
        from_context(&child).info(args!["handled"]);
    })
    .join()
    .expect("thread finished");

    assert_eq!(
        buffer.contents(),
        "{\"level\":\"info\",\"request_id\":\"r-1\",\"msg\":\"handled\"}\n"
    );
}

#[test]
fn test_kv_logger_seam() {
    fn audit(sink: &dyn KvLogger) {
        sink.log_kv(LogLevel::Info, args!["audit", "action", "login"]);
    }

    let (logger, buffer) = test_logger(LogLevel::Info);
    audit(&logger);
    audit(logger.core());

    assert_eq!(buffer.lines().len(), 2);
    assert_eq!(buffer.events()[0]["action"], "login");
}
