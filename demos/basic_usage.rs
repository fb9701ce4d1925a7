//! Basic logger usage example
//!
//! Demonstrates console delivery, level gating, structured context and redaction.
//!
//! Run with: cargo run --example basic_usage

use rust_client_logger::prelude::*;
use rust_client_logger::{info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    println!("=== Rust Client Logger - Basic Usage Example ===\n");

    let logger = Logger::builder()
        .level(LogLevel::Trace)
        .transport(ConsoleTransport::new())
        .redactor(KeyRedactor::new())
        .batch(10, 500)
        .build()?;

    // Log messages at different levels
    println!("1. Logging at different levels:");
    logger.trace("This is a trace message");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warn("This is a warning message");
    logger.error("This is an error message");
    logger.fatal("This is a fatal message");
    logger.flush().await?;

    println!("\n2. Logging with different minimum levels:");
    logger.set_level(LogLevel::Info);
    println!("   Minimum level set to INFO - trace and debug won't show:");
    logger.trace("Trace message (hidden)");
    logger.debug("Debug message (hidden)");
    logger.info("Info message (visible)");
    warn!(logger, "Retry {} of {} (visible)", 1, 3);
    logger.flush().await?;

    println!("\n3. Structured context with redaction:");
    logger.info_with_context(
        "User signed in",
        LogContext::new()
            .with_field("userId", 42)
            .with_field("password", "hunter2")
            .with_field("sessionId", "abc123"),
    );
    logger.set_correlation_id("req-7f3a");
    info!(logger, "Handled request in {}ms", 12);
    logger.flush().await?;

    println!("\n4. Metrics:");
    let metrics = logger.metrics();
    println!(
        "   accepted={} delivered={} batches={}",
        metrics.accepted(),
        metrics.records_delivered(),
        metrics.batches_flushed()
    );

    logger.dispose().await?;
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
