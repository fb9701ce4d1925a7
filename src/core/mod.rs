//! Core logger types and traits

pub mod batch_queue;
pub mod config;
pub mod console_bridge;
pub mod error;
pub mod log_context;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod metrics;
pub mod rate_limit;
pub mod record_builder;
pub mod redaction;
pub mod registry;
pub mod sampling;
pub mod transport;

pub use batch_queue::{
    BatchConfig, BatchQueue, FlushCallback, DEFAULT_BATCH_INTERVAL_MS, DEFAULT_BATCH_SIZE,
};
pub use config::{LoggerConfig, LoggerSettings};
pub use console_bridge::{ConsoleBridge, ConsoleHost, LogFacadeHost};
pub use error::{LoggerError, Result};
pub use log_context::{FieldValue, LogContext};
pub use log_level::LogLevel;
pub use log_record::LogRecord;
pub use logger::{Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use rate_limit::{RateLimitConfig, RateLimiter, RATE_LIMIT_WINDOW};
pub use record_builder::RecordBuilder;
pub use redaction::{KeyRedactor, Redact, DEFAULT_SENSITIVE_KEYS, REDACTION_MARKER};
pub use registry::{get_logger, global, initialize, shutdown, LoggerRegistry};
pub use sampling::{
    random_source, should_sample, should_sample_with, LogSampler, RandomSource, SamplingConfig,
};
pub use transport::{Transport, TransportCapabilities};
