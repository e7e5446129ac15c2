//! Basic usage of the leveled logger

use rust_leveled_logger::prelude::*;
use rust_leveled_logger::{args, error, info, infof, warn};

#[derive(Debug, thiserror::Error)]
#[error("seems we have an error here")]
struct QueryError(#[source] std::io::Error);

fn run_query() -> std::result::Result<(), QueryError> {
    Err(QueryError(std::io::Error::other("connection reset")))
}

fn main() {
    println!("=== Rust Leveled Logger - Basic Usage ===\n");

    let logger = Logger::new(Output::stdout(), LogLevel::Debug);
    logger.with_timestamp().with_caller().with_stack();

    println!("--- Positional values ---");
    logger.debug(args!["hello world"]);
    logger.info(args!["user", "alice"]);
    logger.info(args!["login", "user", "alice", "attempt", 2]);
    info!(logger, "cache warmed", "entries", 1024);

    println!("\n--- Formatted messages ---");
    logger.warnf(format_args!("disk {}% full", 91));
    infof!(logger, "served {} requests in {}ms", 120, 35);

    println!("\n--- Errors ---");
    if let Err(err) = run_query() {
        logger.error(args![LogValue::error(err), "table", "orders"]);
    }
    error!(logger, "upload failed", std::io::Error::other("quota exceeded"));

    println!("\n--- Forked logger ---");
    let request_logger = logger.fork();
    request_logger.with_fields(args!["request_id", "7f3a"]);
    request_logger.info(args!["request started"]);
    logger.info(args!["parent logger has no request_id"]);

    println!("\n--- Level changes ---");
    logger.set_level(LogLevel::Warn);
    logger.info(args!["not shown"]);
    warn!(logger, "shown");

    println!("\n--- Process-wide default ---");
    rust_leveled_logger::global::info(args!["from the default logger"]);

    println!("\n=== Example completed ===");
}
