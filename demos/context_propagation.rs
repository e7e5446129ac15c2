//! Passing a request-scoped logger through a context value

use rust_leveled_logger::prelude::*;
use rust_leveled_logger::args;
use std::sync::Arc;
use std::thread;

fn handle(ctx: &Context, item: u32) {
    let logger = from_context(ctx);
    logger.info(args!["handling item", "item", item]);
}

fn main() {
    println!("=== Rust Leveled Logger - Context Propagation ===\n");

    let base = Logger::new(Output::stdout(), LogLevel::Info);
    base.with_timestamp();

    let workers: Vec<_> = (0..3)
        .map(|worker| {
            let request_logger = base.fork();
            request_logger.with_fields(args!["worker", worker]);
            let ctx = with_logger(&Context::background(), Arc::new(request_logger));
            thread::spawn(move || {
                for item in 0..2 {
                    handle(&ctx, item);
                }
            })
        })
        .collect();

    for worker in workers {
        let _ = worker.join();
    }

    println!("\n--- Without a bound logger the default is used ---");
    handle(&Context::background(), 99);

    println!("\n=== Example completed ===");
}
