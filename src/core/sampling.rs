//! Log sampling for high-volume scenarios
//!
//! Sampling drops a share of low-severity records to reduce volume while
//! actionable records are never dropped:
//!
//! - `Warn`, `Error` and `Fatal` always pass
//! - `Trace`, `Debug` and `Info` pass with probability `rate`
//!
//! Each record gets an independent uniform draw. The random source is
//! injectable so tests can use a seeded generator.
//!
//! # Example
//!
//! ```
//! use rust_client_logger::{should_sample, LogLevel};
//!
//! assert!(should_sample(LogLevel::Error, 0.0));
//! assert!(!should_sample(LogLevel::Info, 0.0));
//! assert!(should_sample(LogLevel::Info, 1.0));
//! ```

use super::log_level::LogLevel;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared, lockable random number generator used for sampling draws
pub type RandomSource = Arc<Mutex<Box<dyn RngCore + Send>>>;

/// Wrap a generator as a [`RandomSource`]
pub fn random_source<R: RngCore + Send + 'static>(rng: R) -> RandomSource {
    Arc::new(Mutex::new(Box::new(rng)))
}

/// Configuration for log sampling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Sample rate between 0.0 and 1.0
    ///
    /// - 1.0 = no sampling (log everything)
    /// - 0.1 = keep 10% of trace/debug/info records
    /// - 0.0 = drop every trace/debug/info record
    #[serde(default = "default_rate")]
    pub rate: f64,
}

fn default_rate() -> f64 {
    1.0
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self { rate: default_rate() }
    }
}

impl SamplingConfig {
    /// Create a new sampling config with the specified rate, clamped to 0..=1
    pub fn new(rate: f64) -> Self {
        Self {
            rate: clamp_rate(rate),
        }
    }
}

fn clamp_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        1.0
    } else {
        rate.clamp(0.0, 1.0)
    }
}

/// Decide whether a record at `level` is kept, drawing from `rng`
pub fn should_sample_with<R: Rng + ?Sized>(level: LogLevel, rate: f64, rng: &mut R) -> bool {
    if level.is_actionable() {
        return true;
    }

    let rate = clamp_rate(rate);

    // Fast paths avoid consuming randomness
    if rate >= 1.0 {
        return true;
    }
    if rate <= 0.0 {
        return false;
    }

    rng.gen::<f64>() < rate
}

/// Decide whether a record at `level` is kept, using the thread-local RNG
pub fn should_sample(level: LogLevel, rate: f64) -> bool {
    should_sample_with(level, rate, &mut rand::thread_rng())
}

/// Per-logger sampler
///
/// Owns the configured rate and a shared random source. Loggers derived
/// with `child()` share the source but not the sampler.
pub struct LogSampler {
    config: SamplingConfig,
    source: RandomSource,
}

impl LogSampler {
    /// Sampler drawing from an entropy-seeded generator
    pub fn new(config: SamplingConfig) -> Self {
        Self::with_source(config, random_source(StdRng::from_entropy()))
    }

    /// Sampler drawing from an injected source
    pub fn with_source(config: SamplingConfig, source: RandomSource) -> Self {
        Self {
            config: SamplingConfig::new(config.rate),
            source,
        }
    }

    /// Determine if a record at `level` should be kept
    pub fn should_sample(&self, level: LogLevel) -> bool {
        let mut rng = self.source.lock();
        should_sample_with(level, self.config.rate, &mut **rng)
    }

    /// Get a reference to the sampling configuration
    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }

    pub fn source(&self) -> &RandomSource {
        &self.source
    }
}

impl std::fmt::Debug for LogSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSampler")
            .field("config", &self.config)
            .finish()
    }
}
