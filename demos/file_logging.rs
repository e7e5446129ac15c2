//! Logging to a size-rotated file through the process-wide default

use rust_leveled_logger::prelude::*;
use rust_leveled_logger::{args, global};

fn main() -> rust_leveled_logger::Result<()> {
    println!("=== Rust Leveled Logger - File Logging ===\n");

    let config = Config::new()
        .with_level("info")
        .with_path("logs/app.log")
        .with_max_size(1)
        .with_max_age(7)
        .with_max_backups(3)
        .with_compression(true);

    global::init(&config)?
        .with_timestamp()
        .with_caller()
        .with_fields(args!["app", "file_logging"]);

    for i in 0..10 {
        global::info(args!["processing batch", "batch", i]);
    }
    global::debugf(format_args!("hidden at level {}", config.level));
    global::error(args![std::io::Error::other("batch 7 checksum mismatch"), "batch", 7]);

    global::default_logger().flush()?;
    println!("\nLogs written to logs/app.log and stdout");

    println!("\n=== Example completed ===");
    Ok(())
}
