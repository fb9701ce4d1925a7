//! # Rust Client Logger
//!
//! Client-side structured logging: records are enriched, filtered by
//! policy, batched and delivered to pluggable transports.
//!
//! ## Features
//!
//! - **Policy pipeline**: level gate, redaction, rate limiting and sampling
//! - **Batched delivery**: size- and time-triggered flushes, one at a time
//! - **Namespaced loggers**: `child("db")` derives independent instances
//! - **Pluggable transports**: console, in-memory and NDJSON file included
//!
//! ## Example
//!
//! ```
//! use rust_client_logger::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> rust_client_logger::Result<()> {
//! let memory = MemoryTransport::new();
//! let logger = Logger::builder()
//!     .level(LogLevel::Debug)
//!     .transport(memory.clone())
//!     .build()?;
//!
//! logger.child("auth")?.info_with_context(
//!     "signed in",
//!     LogContext::new().with_field("userId", 1).with_field("password", "hunter2"),
//! );
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod macros;
pub mod transports;

pub mod prelude {
    #[cfg(feature = "file")]
    pub use crate::transports::JsonFileTransport;
    pub use crate::transports::{ConsoleTransport, MemoryTransport};
    pub use crate::core::{
        BatchConfig, FieldValue, KeyRedactor, LogContext, LogLevel, LogRecord, Logger,
        LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics, LoggerRegistry, LoggerSettings,
        RateLimitConfig, Redact, Result, SamplingConfig, Transport, TransportCapabilities,
    };
}

#[cfg(feature = "file")]
pub use crate::transports::JsonFileTransport;
pub use crate::transports::{ConsoleTransport, MemoryTransport};
pub use crate::core::{
    get_logger, initialize, should_sample, shutdown, BatchConfig, FieldValue, KeyRedactor,
    LogContext, LogLevel, LogRecord, Logger, LoggerBuilder, LoggerConfig, LoggerError,
    LoggerMetrics, LoggerRegistry, LoggerSettings, RateLimitConfig, Redact, Result,
    SamplingConfig, Transport, TransportCapabilities, REDACTION_MARKER,
};
