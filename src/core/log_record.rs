//! Log record structure

use super::log_context::{FieldValue, LogContext};
use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};

/// One log call, as delivered to transports.
///
/// Records are built by the logger after the level gate and are not
/// mutated once queued. Redaction produces a replacement record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Milliseconds since the Unix epoch
    #[serde(rename = "ts")]
    pub timestamp: i64,
    pub level: LogLevel,
    #[serde(rename = "msg")]
    pub message: String,
    #[serde(rename = "ns", default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(rename = "ctx", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<LogContext>,
    #[serde(
        rename = "correlationId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<LogContext>,
}

impl LogRecord {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp_millis(),
            level,
            message: message.into(),
            namespace: None,
            context: None,
            correlation_id: None,
            device: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn with_context(mut self, context: LogContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: Option<String>) -> Self {
        self.correlation_id = correlation_id;
        self
    }

    pub fn with_device(mut self, device: Option<LogContext>) -> Self {
        self.device = device;
        self
    }

    /// Look up a top-level context field
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.context.as_ref().and_then(|ctx| ctx.get(key))
    }

    /// Serialize to a single JSON line
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
