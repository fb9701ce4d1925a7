//! Namespaced loggers example
//!
//! Demonstrates the global registry, child loggers, sampling and rate limiting.
//!
//! Run with: cargo run --example namespaced_loggers

use rust_client_logger::prelude::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Rust Client Logger - Namespaced Loggers Example ===\n");

    let settings = LoggerSettings::from_json(
        r#"{
            "level": "debug",
            "namespace": "app",
            "sampling": { "rate": 0.25 },
            "rateLimit": { "maxPerMin": 50 },
            "batch": { "size": 5, "intervalMs": 200 }
        }"#,
    )?;
    let config = settings.into_config(vec![Arc::new(ConsoleTransport::new()) as Arc<dyn Transport>])?;
    let root = rust_client_logger::initialize(config)?;

    println!("1. Child loggers share the root's transports:");
    let db = rust_client_logger::get_logger(Some("db"))?;
    let auth = rust_client_logger::get_logger(Some("auth"))?;
    let pool = db.child("pool")?;

    root.info("Application started");
    db.info("Connected to database");
    auth.warn("Token close to expiry");
    pool.error("Pool exhausted");
    println!("   namespaces: {:?} {:?} {:?}", db.namespace(), auth.namespace(), pool.namespace());
    root.flush().await?;
    db.flush().await?;
    auth.flush().await?;
    pool.flush().await?;

    println!("\n2. Sampling keeps ~25% of debug records, all errors:");
    for i in 0..20 {
        db.debug(format!("Query {} executed", i));
    }
    db.error("Query failed");
    db.flush().await?;
    println!("   sampled out: {}", db.metrics().sampled_out());

    println!("\n3. Rate limiting caps a burst at 50 per minute:");
    for i in 0..100 {
        auth.info(format!("Login attempt {}", i));
    }
    auth.flush().await?;
    println!(
        "   accepted: {} rate limited: {}",
        auth.metrics().accepted(),
        auth.metrics().rate_limited()
    );

    for logger in [&db, &auth, &pool] {
        logger.dispose().await?;
    }
    rust_client_logger::shutdown().await?;
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
