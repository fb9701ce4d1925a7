//! File logging example
//!
//! Demonstrates delivering batches to both console and an NDJSON file.
//!
//! Run with: cargo run --example file_logging

use rust_client_logger::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Rust Client Logger - File Logging Example ===\n");

    let file = JsonFileTransport::new("logs/application.ndjson").await?;
    let path = file.path().to_path_buf();

    let logger = Logger::builder()
        .level(LogLevel::Debug)
        .namespace("demo")
        .transport(ConsoleTransport::new())
        .transport(file)
        .device(LogContext::new().with_field("os", std::env::consts::OS))
        .batch(8, 250)
        .build()?;

    println!("1. Logging to both console and file:");
    logger.info("Application started");
    logger.debug("Loading configuration...");
    logger.info("Configuration loaded successfully");
    logger.warn("Using default settings for some options");
    logger.error("Failed to load optional plugin");

    println!("\n2. Performing some operations:");
    let worker = logger.child("worker")?;
    for i in 1..=5 {
        worker.info_with_context(
            format!("Processing item {}/5", i),
            LogContext::new().with_field("item", i),
        );
        if i == 3 {
            worker.warn("Item 3 took longer than expected");
        }
    }

    worker.dispose().await?;
    logger.dispose().await?;

    println!("\n3. File contents ({}):", path.display());
    let contents = tokio::fs::read_to_string(&path).await?;
    for line in contents.lines().take(5) {
        let record = LogRecord::from_json(line)?;
        println!("   [{}] {:?} {}", record.level, record.namespace, record.message);
    }

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
