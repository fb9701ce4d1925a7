//! Fluent construction of log calls with structured fields

use super::log_context::{FieldValue, LogContext};
use super::log_level::LogLevel;
use super::logger::Logger;

/// Builder for one structured log call
///
/// Nothing is evaluated against the logger's policies until [`log`]
/// is called.
///
/// # Example
///
/// ```
/// use rust_client_logger::prelude::*;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> rust_client_logger::Result<()> {
/// let logger = Logger::builder().build()?;
///
/// logger.info_builder()
///     .message("Request processed")
///     .field("userId", 12345)
///     .field("latencyMs", 42.5)
///     .field("status", 200)
///     .log();
/// # Ok(())
/// # }
/// ```
///
/// [`log`]: RecordBuilder::log
pub struct RecordBuilder<'a> {
    logger: &'a Logger,
    level: LogLevel,
    message: String,
    context: LogContext,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(logger: &'a Logger, level: LogLevel) -> Self {
        Self {
            logger,
            level,
            message: String::new(),
            context: LogContext::new(),
        }
    }

    /// Set the log message
    #[must_use]
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        self.message = msg.into();
        self
    }

    /// Add a structured field
    #[must_use]
    pub fn field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.context.add_field(key, value);
        self
    }

    /// Merge every field of `context`, overwriting duplicates
    #[must_use]
    pub fn fields(mut self, context: LogContext) -> Self {
        for (key, value) in context.into_fields() {
            self.context.add_field(key, value);
        }
        self
    }

    /// Record the call site under `file`, `line` and `module`
    #[must_use]
    pub fn location(self, file: &'static str, line: u32, module_path: &'static str) -> Self {
        self.field("file", file)
            .field("line", line)
            .field("module", module_path)
    }

    /// Hand the call to the logger
    ///
    /// An empty context is sent as no context at all.
    pub fn log(self) {
        if self.context.is_empty() {
            self.logger.log(self.level, self.message);
        } else {
            self.logger
                .log_with_context(self.level, self.message, self.context);
        }
    }
}

impl Logger {
    pub fn builder_at(&self, level: LogLevel) -> RecordBuilder<'_> {
        RecordBuilder::new(self, level)
    }

    pub fn trace_builder(&self) -> RecordBuilder<'_> {
        RecordBuilder::new(self, LogLevel::Trace)
    }

    pub fn debug_builder(&self) -> RecordBuilder<'_> {
        RecordBuilder::new(self, LogLevel::Debug)
    }

    pub fn info_builder(&self) -> RecordBuilder<'_> {
        RecordBuilder::new(self, LogLevel::Info)
    }

    pub fn warn_builder(&self) -> RecordBuilder<'_> {
        RecordBuilder::new(self, LogLevel::Warn)
    }

    pub fn error_builder(&self) -> RecordBuilder<'_> {
        RecordBuilder::new(self, LogLevel::Error)
    }

    pub fn fatal_builder(&self) -> RecordBuilder<'_> {
        RecordBuilder::new(self, LogLevel::Fatal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
    async fn test_builder_fields() {
        let (logger, memory) = capture();

        logger
            .warn_builder()
            .message("slow query")
            .field("ms", 1200)
            .fields(LogContext::new().with_field("table", "users"))
            .log();
        logger.flush().await.unwrap();

        let record = &memory.records()[0];
        assert_eq!(record.level, LogLevel::Warn);
        assert_eq!(record.message, "slow query");
        assert_eq!(record.field("ms"), Some(&FieldValue::Int(1200)));
        assert_eq!(record.field("table").and_then(FieldValue::as_str), Some("users"));
    }

    #[tokio::test]
    async fn test_empty_context_is_omitted() {
        let (logger, memory) = capture();
        logger.trace_builder().message("bare").log();
        logger.flush().await.unwrap();

        assert!(memory.records()[0].context.is_none());
    }

    #[tokio::test]
    async fn test_location_fields() {
        let (logger, memory) = capture();
        logger
            .builder_at(LogLevel::Error)
            .message("here")
            .location("src/main.rs", 7, "app")
            .log();
        logger.flush().await.unwrap();

        let record = &memory.records()[0];
        assert_eq!(record.field("line"), Some(&FieldValue::Int(7)));
        assert_eq!(record.field("module").and_then(FieldValue::as_str), Some("app"));
    }
}
