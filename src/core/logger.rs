//! Main logger implementation
//!
//! A [`Logger`] runs every accepted call through a fixed pipeline:
//!
//! 1. level gate (nothing is built for calls below the threshold)
//! 2. record construction with namespace, correlation id and device
//! 3. redaction
//! 4. rate limiting
//! 5. sampling
//! 6. push onto the batch queue
//!
//! The queue delivers batches to every transport concurrently. Emitting
//! never blocks on I/O; suspension only happens inside transports.

use super::{
    batch_queue::{BatchConfig, BatchQueue, FlushCallback},
    config::LoggerConfig,
    console_bridge::{ConsoleBridge, ConsoleHost, LogFacadeHost},
    error::{LoggerError, Result},
    log_context::LogContext,
    log_level::LogLevel,
    log_record::LogRecord,
    metrics::LoggerMetrics,
    rate_limit::{RateLimitConfig, RateLimiter},
    redaction::{KeyRedactor, Redact},
    sampling::{random_source, LogSampler, RandomSource, SamplingConfig},
    transport::{fan_out, Transport, TransportOp},
};
use futures::FutureExt;
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Handle to a logger instance
///
/// Cloning is cheap and yields another handle to the same instance. Use
/// [`Logger::child`] for a distinct, namespaced instance.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

struct LoggerInner {
    /// Construction-time options; `level` and `correlation_id` live below
    config: LoggerConfig,
    level: RwLock<LogLevel>,
    correlation_id: RwLock<Option<String>>,
    rate_limiter: Option<RateLimiter>,
    sampler: Option<LogSampler>,
    queue: BatchQueue<LogRecord>,
    metrics: Arc<LoggerMetrics>,
    disposed: AtomicBool,
}

impl Drop for LoggerInner {
    fn drop(&mut self) {
        // Best effort: nobody is left to await the result
        if !self.disposed.load(Ordering::Acquire) && !self.queue.is_empty() {
            self.queue.flush_in_background();
        }
    }
}

impl Logger {
    /// Build a logger on the current tokio runtime
    ///
    /// # Errors
    ///
    /// - [`LoggerError::NoRuntime`] outside a runtime
    /// - [`LoggerError::InvalidConfiguration`] for a malformed namespace
    /// - [`LoggerError::ConsoleBridge`] when `patch_console` is set and the
    ///   `log` facade already belongs to another logger
    pub fn new(config: LoggerConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| LoggerError::NoRuntime(e.to_string()))?;
        Self::with_handle(config, runtime)
    }

    /// Build a logger whose timers and background flushes run on `runtime`
    pub fn with_handle(config: LoggerConfig, runtime: Handle) -> Result<Self> {
        Self::with_console_host(config, runtime, &LogFacadeHost)
    }

    /// Like [`Logger::with_handle`], installing the console bridge through
    /// `host` instead of the `log` facade
    pub fn with_console_host(
        config: LoggerConfig,
        runtime: Handle,
        host: &dyn ConsoleHost,
    ) -> Result<Self> {
        config.validate()?;
        let logger = Self::assemble(config, runtime);
        if logger.inner.config.patch_console {
            host.install(ConsoleBridge::new(logger.clone()))?;
        }
        Ok(logger)
    }

    fn assemble(mut config: LoggerConfig, runtime: Handle) -> Self {
        if config.sampling.is_some() && config.sampling_source.is_none() {
            config.sampling_source = Some(random_source(StdRng::from_entropy()));
        }

        let metrics = Arc::new(LoggerMetrics::new());
        let queue = BatchQueue::with_handle(
            config.batch,
            Self::write_callback(Arc::clone(&config.transports), Arc::clone(&metrics)),
            runtime,
        );
        let rate_limiter = config.rate_limit.map(RateLimiter::new);
        let sampler = match (config.sampling, &config.sampling_source) {
            (Some(sampling), Some(source)) => {
                Some(LogSampler::with_source(sampling, Arc::clone(source)))
            }
            _ => None,
        };

        Self {
            inner: Arc::new(LoggerInner {
                level: RwLock::new(config.level),
                correlation_id: RwLock::new(config.correlation_id.clone()),
                config,
                rate_limiter,
                sampler,
                queue,
                metrics,
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// Flush callback writing each batch to every transport
    fn write_callback(
        transports: Arc<Vec<Arc<dyn Transport>>>,
        metrics: Arc<LoggerMetrics>,
    ) -> FlushCallback<LogRecord> {
        Arc::new(move |batch: Vec<LogRecord>| {
            let transports = Arc::clone(&transports);
            let metrics = Arc::clone(&metrics);
            async move {
                metrics.record_batch(batch.len());
                let errors = fan_out(&transports, TransportOp::Write, &batch).await;
                metrics.record_transport_failures(errors.len());
                LoggerError::aggregate(TransportOp::Write.as_str(), errors)
            }
            .boxed()
        })
    }

    /// Whether a call at `level` passes the current threshold
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level.passes(*self.inner.level.read())
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        if !self.enabled(level) {
            return;
        }
        self.emit(level, message.into(), None);
    }

    /// Log with structured context fields
    pub fn log_with_context(&self, level: LogLevel, message: impl Into<String>, context: LogContext) {
        if !self.enabled(level) {
            return;
        }
        self.emit(level, message.into(), Some(context));
    }

    fn emit(&self, level: LogLevel, message: String, context: Option<LogContext>) {
        let inner = &*self.inner;
        if inner.disposed.load(Ordering::Acquire) {
            inner.metrics.record_dropped_after_dispose();
            return;
        }

        let mut record = LogRecord::new(level, message)
            .with_namespace(inner.config.namespace.clone())
            .with_correlation_id(inner.correlation_id.read().clone())
            .with_device(inner.config.device.clone());
        if let Some(context) = context {
            record = record.with_context(context);
        }

        if let Some(redactor) = &inner.config.redactor {
            record = redactor.redact(record);
        }

        if let Some(limiter) = &inner.rate_limiter {
            if !limiter.check() {
                inner.metrics.record_rate_limited();
                return;
            }
        }

        if let Some(sampler) = &inner.sampler {
            if !sampler.should_sample(record.level) {
                inner.metrics.record_sampled_out();
                return;
            }
        }

        inner.metrics.record_accepted();
        inner.queue.push(record);
    }

    #[inline]
    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn fatal(&self, message: impl Into<String>) {
        self.log(LogLevel::Fatal, message);
    }

    pub fn trace_with_context(&self, message: impl Into<String>, context: LogContext) {
        self.log_with_context(LogLevel::Trace, message, context);
    }

    pub fn debug_with_context(&self, message: impl Into<String>, context: LogContext) {
        self.log_with_context(LogLevel::Debug, message, context);
    }

    pub fn info_with_context(&self, message: impl Into<String>, context: LogContext) {
        self.log_with_context(LogLevel::Info, message, context);
    }

    pub fn warn_with_context(&self, message: impl Into<String>, context: LogContext) {
        self.log_with_context(LogLevel::Warn, message, context);
    }

    pub fn error_with_context(&self, message: impl Into<String>, context: LogContext) {
        self.log_with_context(LogLevel::Error, message, context);
    }

    pub fn fatal_with_context(&self, message: impl Into<String>, context: LogContext) {
        self.log_with_context(LogLevel::Fatal, message, context);
    }

    pub fn level(&self) -> LogLevel {
        *self.inner.level.read()
    }

    /// Change the threshold of this instance only
    pub fn set_level(&self, level: LogLevel) {
        *self.inner.level.write() = level;
    }

    pub fn correlation_id(&self) -> Option<String> {
        self.inner.correlation_id.read().clone()
    }

    /// Set the correlation id stamped on records built from now on
    pub fn set_correlation_id(&self, correlation_id: impl Into<String>) {
        *self.inner.correlation_id.write() = Some(correlation_id.into());
    }

    pub fn clear_correlation_id(&self) {
        *self.inner.correlation_id.write() = None;
    }

    pub fn namespace(&self) -> Option<&str> {
        self.inner.config.namespace.as_deref()
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> LoggerConfig {
        LoggerConfig {
            level: self.level(),
            correlation_id: self.correlation_id(),
            ..self.inner.config.clone()
        }
    }

    /// Get the logger metrics for detailed observability
    ///
    /// # Example
    ///
    /// ```
    /// use rust_client_logger::Logger;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> rust_client_logger::Result<()> {
    /// let logger = Logger::builder().build()?;
    ///
    /// logger.info("started");
    /// let metrics = logger.metrics();
    /// println!("Accepted: {}", metrics.accepted());
    /// println!("Drop rate: {:.2}%", metrics.drop_rate());
    /// # Ok(())
    /// # }
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.inner.metrics
    }

    pub fn transports(&self) -> &[Arc<dyn Transport>] {
        &self.inner.config.transports
    }

    /// Records waiting in the batch queue
    pub fn pending(&self) -> usize {
        self.inner.queue.len()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    pub fn runtime(&self) -> &Handle {
        self.inner.queue.runtime()
    }

    /// Derive a namespaced logger.
    ///
    /// The child gets a copy of the current configuration, its own queue,
    /// rate limiter and metrics. It shares the transports and the sampling
    /// random source with this logger. The console bridge is not
    /// installed again.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::InvalidConfiguration`] when `namespace` is
    /// empty or contains an empty `:` segment.
    pub fn child(&self, namespace: &str) -> Result<Logger> {
        let mut config = self.config();
        config.namespace = Some(self.inner.config.child_namespace(namespace));
        config.validate()?;
        Ok(Self::assemble(config, self.runtime().clone()))
    }

    /// Start delivering buffered records without waiting for them
    pub fn flush_in_background(&self) {
        self.inner.queue.flush_in_background();
    }

    /// Deliver all buffered records, then flush every transport that
    /// supports it.
    ///
    /// Waits for a flush already in flight. Records logged while this runs
    /// are left for the next trigger. Errors from writing and from
    /// transport flushes are returned together.
    pub async fn flush(&self) -> Result<()> {
        let mut errors = match self.inner.queue.drain().await {
            Ok(()) => Vec::new(),
            Err(e) => e.into_failures(),
        };

        let flush_errors = fan_out(self.transports(), TransportOp::Flush, &[]).await;
        self.inner
            .metrics
            .record_transport_failures(flush_errors.len());
        errors.extend(flush_errors);

        LoggerError::aggregate(TransportOp::Flush.as_str(), errors)
    }

    /// Flush, then dispose every transport that supports it.
    ///
    /// Later log calls on any handle to this instance are dropped and
    /// counted. Calling `dispose` again is a no-op.
    ///
    /// Transports are shared with children, so disposing a parent disposes
    /// them for the whole family.
    pub async fn dispose(&self) -> Result<()> {
        if self.inner.disposed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let mut errors = match self.flush().await {
            Ok(()) => Vec::new(),
            Err(e) => e.into_failures(),
        };

        let dispose_errors = fan_out(self.transports(), TransportOp::Dispose, &[]).await;
        self.inner
            .metrics
            .record_transport_failures(dispose_errors.len());
        errors.extend(dispose_errors);

        LoggerError::aggregate(TransportOp::Dispose.as_str(), errors)
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use rust_client_logger::prelude::*;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> rust_client_logger::Result<()> {
    /// let logger = Logger::builder()
    ///     .level(LogLevel::Debug)
    ///     .transport(MemoryTransport::new())
    ///     .batch(10, 500)
    ///     .build()?;
    /// # logger.dispose().await
    /// # }
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("namespace", &self.namespace())
            .field("level", &self.level())
            .field("pending", &self.pending())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_client_logger::prelude::*;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> rust_client_logger::Result<()> {
/// let logger = Logger::builder()
///     .level(LogLevel::Debug)
///     .namespace("checkout")
///     .transport(MemoryTransport::new())
///     .redact_keys(["email"])
///     .sampling(0.5)
///     .rate_limit(600)
///     .build()?;
///
/// assert_eq!(logger.namespace(), Some("checkout"));
/// # Ok(())
/// # }
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    transports: Vec<Arc<dyn Transport>>,
    runtime: Option<Handle>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::from_config(LoggerConfig::default())
    }

    /// Start from an existing configuration, keeping its transports
    pub fn from_config(config: LoggerConfig) -> Self {
        let transports = config.transports.iter().cloned().collect();
        Self {
            config,
            transports,
            runtime: None,
        }
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    /// Add a transport
    #[must_use = "builder methods return a new value"]
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transports.push(Arc::new(transport));
        self
    }

    /// Add a transport that is also held elsewhere
    #[must_use = "builder methods return a new value"]
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transports.push(transport);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = Some(namespace.into());
        self
    }

    /// Use a custom redactor
    #[must_use = "builder methods return a new value"]
    pub fn redactor<R: Redact + 'static>(mut self, redactor: R) -> Self {
        self.config.redactor = Some(Arc::new(redactor));
        self
    }

    /// Use the key redactor with `keys` added to the default set
    #[must_use = "builder methods return a new value"]
    pub fn redact_keys<I, S>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.redactor(KeyRedactor::with_extra_keys(keys))
    }

    /// Keep trace/debug/info records with probability `rate`
    #[must_use = "builder methods return a new value"]
    pub fn sampling(mut self, rate: f64) -> Self {
        self.config.sampling = Some(SamplingConfig::new(rate));
        self
    }

    /// Draw sampling decisions from `source`
    #[must_use = "builder methods return a new value"]
    pub fn sampling_source(mut self, source: RandomSource) -> Self {
        self.config.sampling_source = Some(source);
        self
    }

    /// Accept at most `max_per_min` records per minute
    #[must_use = "builder methods return a new value"]
    pub fn rate_limit(mut self, max_per_min: u32) -> Self {
        self.config.rate_limit = Some(RateLimitConfig::new(max_per_min));
        self
    }

    /// Flush after `size` records or `interval_ms`, whichever comes first
    #[must_use = "builder methods return a new value"]
    pub fn batch(mut self, size: usize, interval_ms: u64) -> Self {
        self.config.batch = BatchConfig::new(size, interval_ms);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn device(mut self, device: LogContext) -> Self {
        self.config.device = Some(device);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.config.correlation_id = Some(correlation_id.into());
        self
    }

    /// Redirect the `log` facade into the built logger
    #[must_use = "builder methods return a new value"]
    pub fn patch_console(mut self, patch: bool) -> Self {
        self.config.patch_console = patch;
        self
    }

    /// Run timers on `runtime` instead of the current one
    #[must_use = "builder methods return a new value"]
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// The configuration this builder would produce
    pub fn into_config(self) -> LoggerConfig {
        LoggerConfig {
            transports: Arc::new(self.transports),
            ..self.config
        }
    }

    /// Build the Logger
    pub fn build(self) -> Result<Logger> {
        let runtime = self.runtime.clone();
        let config = self.into_config();
        match runtime {
            Some(runtime) => Logger::with_handle(config, runtime),
            None => Logger::new(config),
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
