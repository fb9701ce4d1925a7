//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`. The message is
//! only formatted when the level passes the logger's threshold.
//!
//! # Examples
//!
//! ```
//! use rust_client_logger::prelude::*;
//! use rust_client_logger::info;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> rust_client_logger::Result<()> {
//! let logger = Logger::builder().build()?;
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! # Ok(())
//! # }
//! ```

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use rust_client_logger::prelude::*;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> rust_client_logger::Result<()> {
/// # let logger = Logger::builder().build()?;
/// use rust_client_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let level = $level;
        let logger = &$logger;
        if logger.enabled(level) {
            logger.log(level, format!($($arg)+));
        }
    }};
}

/// Log a trace-level message.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use rust_client_logger::prelude::*;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> rust_client_logger::Result<()> {
/// # let logger = Logger::builder().build()?;
/// use rust_client_logger::warn;
/// warn!(logger, "Retry attempt {} of {}", 3, 5);
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{LogLevel, Logger};
    use crate::transports::MemoryTransport;

    fn capture() -> (Logger, MemoryTransport) {
        let memory = MemoryTransport::new();
        let logger = Logger::builder()
            .level(LogLevel::Trace)
            .transport(memory.clone())
            .build()
            .unwrap();
        (logger, memory)
    }

    #[tokio::test]
    async fn test_level_macros_format_messages() {
        let (logger, memory) = capture();

        trace!(logger, "Value: {}", 10);
        debug!(logger, "Count: {}", 5);
        info!(logger, "Items: {}", 100);
        warn!(logger, "Retry {} of {}", 1, 3);
        error!(logger, "Code: {}", 500);
        fatal!(logger, "Critical failure: {}", "system");
        logger.flush().await.unwrap();

        let messages: Vec<String> = memory.records().into_iter().map(|r| r.message).collect();
        assert_eq!(
            messages,
            vec![
                "Value: 10",
                "Count: 5",
                "Items: 100",
                "Retry 1 of 3",
                "Code: 500",
                "Critical failure: system"
            ]
        );
    }

    #[tokio::test]
    async fn test_log_macro_skips_formatting_below_threshold() {
        struct Loud;
        impl std::fmt::Display for Loud {
            fn fmt(&self, _f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                panic!("formatted a gated message");
            }
        }

        let (logger, memory) = capture();
        logger.set_level(LogLevel::Error);
        log!(logger, LogLevel::Info, "{}", Loud);
        logger.flush().await.unwrap();
        assert!(memory.records().is_empty());
    }
}
