//! Logger configuration
//!
//! [`LoggerConfig`] is what a Logger owns at runtime. [`LoggerSettings`] is
//! its serializable subset, for loading options from JSON; transports and
//! custom redactors can only be supplied in code.

use super::batch_queue::BatchConfig;
use super::error::{LoggerError, Result};
use super::log_context::LogContext;
use super::log_level::LogLevel;
use super::rate_limit::RateLimitConfig;
use super::redaction::{KeyRedactor, Redact};
use super::sampling::{RandomSource, SamplingConfig};
use super::transport::Transport;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Configuration owned by one Logger instance
///
/// `child()` copies it. Only `transports`, `redactor` and `sampling_source`
/// are shared by reference between copies.
#[derive(Clone)]
pub struct LoggerConfig {
    /// Minimum severity accepted
    pub level: LogLevel,
    pub transports: Arc<Vec<Arc<dyn Transport>>>,
    /// Colon-delimited prefix for this logger's records
    pub namespace: Option<String>,
    pub redactor: Option<Arc<dyn Redact>>,
    pub sampling: Option<SamplingConfig>,
    /// Random source for sampling draws; entropy-seeded when `None`
    pub sampling_source: Option<RandomSource>,
    pub rate_limit: Option<RateLimitConfig>,
    pub batch: BatchConfig,
    /// Static metadata attached to every record
    pub device: Option<LogContext>,
    pub correlation_id: Option<String>,
    /// Redirect the `log` facade into the logger built from this config
    pub patch_console: bool,
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self {
            level: LogLevel::Info,
            transports: Arc::new(Vec::new()),
            namespace: None,
            redactor: None,
            sampling: None,
            sampling_source: None,
            rate_limit: None,
            batch: BatchConfig::default(),
            device: None,
            correlation_id: None,
            patch_console: false,
        }
    }

    /// Check the options that cannot be coerced into something sensible
    pub fn validate(&self) -> Result<()> {
        if let Some(namespace) = &self.namespace {
            if namespace.split(':').any(str::is_empty) {
                return Err(LoggerError::config(
                    "namespace",
                    format!("'{}' contains an empty segment", namespace),
                ));
            }
        }
        Ok(())
    }

    /// Namespace for a child created with `suffix`
    pub fn child_namespace(&self, suffix: &str) -> String {
        match &self.namespace {
            Some(parent) => format!("{}:{}", parent, suffix),
            None => suffix.to_string(),
        }
    }

    pub fn transport_names(&self) -> Vec<&str> {
        self.transports.iter().map(|t| t.name()).collect()
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerConfig")
            .field("level", &self.level)
            .field("transports", &self.transport_names())
            .field("namespace", &self.namespace)
            .field("redactor", &self.redactor.is_some())
            .field("sampling", &self.sampling)
            .field("rate_limit", &self.rate_limit)
            .field("batch", &self.batch)
            .field("device", &self.device)
            .field("correlation_id", &self.correlation_id)
            .field("patch_console", &self.patch_console)
            .finish()
    }
}

/// Serializable logger options
///
/// # Example
///
/// ```
/// use rust_client_logger::core::{LoggerSettings, LogLevel};
///
/// let settings = LoggerSettings::from_json(
///     r#"{"level": "debug", "namespace": "app", "batch": {"size": 5, "intervalMs": 250}}"#,
/// ).unwrap();
/// let config = settings.into_config(Vec::new()).unwrap();
///
/// assert_eq!(config.level, LogLevel::Debug);
/// assert_eq!(config.batch.size, 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggerSettings {
    /// Level name, case-insensitive; `info` when absent
    pub level: Option<String>,
    pub namespace: Option<String>,
    /// Extra sensitive keys. Present (even empty) enables the key redactor.
    pub redact_keys: Option<Vec<String>>,
    pub sampling: Option<SamplingConfig>,
    pub rate_limit: Option<RateLimitConfig>,
    pub batch: Option<BatchConfig>,
    pub device: Option<LogContext>,
    pub correlation_id: Option<String>,
    pub patch_console: bool,
}

impl LoggerSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a runtime config writing to `transports`
    pub fn into_config(self, transports: Vec<Arc<dyn Transport>>) -> Result<LoggerConfig> {
        let level = match self.level.as_deref() {
            Some(name) => name
                .parse::<LogLevel>()
                .map_err(|message| LoggerError::config("level", message))?,
            None => LogLevel::Info,
        };

        let redactor = self
            .redact_keys
            .map(|keys| Arc::new(KeyRedactor::with_extra_keys(keys)) as Arc<dyn Redact>);

        let config = LoggerConfig {
            level,
            transports: Arc::new(transports),
            namespace: self.namespace,
            redactor,
            sampling: self.sampling.map(|s| SamplingConfig::new(s.rate)),
            sampling_source: None,
            rate_limit: self.rate_limit,
            batch: self
                .batch
                .map(|b| BatchConfig::new(b.size, b.interval_ms))
                .unwrap_or_default(),
            device: self.device,
            correlation_id: self.correlation_id,
            patch_console: self.patch_console,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogRecord, REDACTION_MARKER};

    #[test]
    fn test_defaults() {
        let config = LoggerConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.batch.size, 20);
        assert_eq!(config.batch.interval_ms, 1000);
        assert!(config.transports.is_empty());
        assert!(!config.patch_console);
    }

    #[test]
    fn test_child_namespace() {
        let mut config = LoggerConfig::default();
        assert_eq!(config.child_namespace("a"), "a");

        config.namespace = Some("a".to_string());
        assert_eq!(config.child_namespace("b"), "a:b");
    }

    #[test]
    fn test_validate_rejects_empty_segments() {
        let mut config = LoggerConfig::default();
        config.namespace = Some("auth::login".to_string());
        assert!(matches!(
            config.validate(),
            Err(LoggerError::InvalidConfiguration { .. })
        ));

        config.namespace = Some("auth:login".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_settings_full() {
        let settings = LoggerSettings::from_json(
            r#"{
                "level": "WARN",
                "namespace": "app",
                "redactKeys": ["email"],
                "sampling": {"rate": 0.25},
                "rateLimit": {"maxPerMin": 100},
                "batch": {"size": 0},
                "device": {"platform": "ios"},
                "correlationId": "boot-1",
                "patchConsole": true
            }"#,
        )
        .unwrap();

        let config = settings.into_config(Vec::new()).unwrap();
        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.namespace.as_deref(), Some("app"));
        assert_eq!(config.sampling.map(|s| s.rate), Some(0.25));
        assert_eq!(config.rate_limit.map(|r| r.max_per_min), Some(100));
        assert_eq!(config.batch.size, 1);
        assert_eq!(config.batch.interval_ms, 1000);
        assert_eq!(config.correlation_id.as_deref(), Some("boot-1"));
        assert!(config.patch_console);

        let redactor = config.redactor.expect("redactor");
        let record = LogRecord::new(LogLevel::Info, "x")
            .with_context(LogContext::new().with_field("Email", "a@b.c"));
        let redacted = redactor.redact(record);
        assert_eq!(
            redacted.field("Email").and_then(|v| v.as_str()),
            Some(REDACTION_MARKER)
        );
    }

    #[test]
    fn test_settings_empty_object() {
        let config = LoggerSettings::from_json("{}")
            .unwrap()
            .into_config(Vec::new())
            .unwrap();
        assert_eq!(config.level, LogLevel::Info);
        assert!(config.redactor.is_none());
        assert!(config.sampling.is_none());
    }

    #[test]
    fn test_settings_bad_level() {
        let err = LoggerSettings::from_json(r#"{"level": "loud"}"#)
            .unwrap()
            .into_config(Vec::new())
            .unwrap_err();
        assert!(err.to_string().contains("level"));
    }

    #[test]
    fn test_settings_malformed_json() {
        assert!(matches!(
            LoggerSettings::from_json("{"),
            Err(LoggerError::JsonError(_))
        ));
    }
}
