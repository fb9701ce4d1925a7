//! Redaction of sensitive context values
//!
//! Redaction runs before any other policy and before a record is queued.
//! The built-in [`KeyRedactor`] masks the value of every map key whose
//! lower-cased name is in its sensitive-key set, recursing through nested
//! maps and lists. Keys are never removed.
//!
//! # Example
//!
//! ```
//! use rust_client_logger::core::{KeyRedactor, LogContext, LogLevel, LogRecord, Redact, REDACTION_MARKER};
//!
//! let redactor = KeyRedactor::new();
//! let record = LogRecord::new(LogLevel::Info, "login")
//!     .with_context(LogContext::new().with_field("Password", "hunter2").with_field("user", "ana"));
//!
//! let redacted = redactor.redact(record);
//! assert_eq!(redacted.field("Password").and_then(|v| v.as_str()), Some(REDACTION_MARKER));
//! assert_eq!(redacted.field("user").and_then(|v| v.as_str()), Some("ana"));
//! ```

use super::log_context::{FieldValue, LogContext};
use super::log_record::LogRecord;
use std::collections::{BTreeMap, HashSet};

/// Replacement written over sensitive values
pub const REDACTION_MARKER: &str = "[REDACTED]";

/// Keys masked by [`KeyRedactor::new`]
pub const DEFAULT_SENSITIVE_KEYS: &[&str] = &[
    "password",
    "pass",
    "token",
    "authorization",
    "secret",
    "otp",
    "pin",
    "creditcard",
    "sessionid",
];

/// A record transformation applied before rate limiting and sampling.
///
/// Implementations must not panic; a panic propagates to the log call site.
pub trait Redact: Send + Sync {
    fn redact(&self, record: LogRecord) -> LogRecord;
}

impl<F> Redact for F
where
    F: Fn(LogRecord) -> LogRecord + Send + Sync,
{
    fn redact(&self, record: LogRecord) -> LogRecord {
        self(record)
    }
}

/// Masks values stored under sensitive keys
#[derive(Debug, Clone)]
pub struct KeyRedactor {
    keys: HashSet<String>,
}

impl KeyRedactor {
    /// Redactor over [`DEFAULT_SENSITIVE_KEYS`]
    pub fn new() -> Self {
        Self::with_extra_keys(std::iter::empty::<&str>())
    }

    /// Redactor over the default keys plus `extra`.
    ///
    /// Extra keys are matched case-insensitively like the defaults.
    pub fn with_extra_keys<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys = DEFAULT_SENSITIVE_KEYS
            .iter()
            .map(|k| k.to_string())
            .chain(extra.into_iter().map(|k| k.as_ref().to_lowercase()))
            .collect();
        Self { keys }
    }

    pub fn is_sensitive(&self, key: &str) -> bool {
        self.keys.contains(&key.to_lowercase())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Deep-transform a context, masking sensitive values
    pub fn redact_context(&self, context: LogContext) -> LogContext {
        LogContext::from(self.redact_map(context.into_fields()))
    }

    fn redact_map(&self, map: BTreeMap<String, FieldValue>) -> BTreeMap<String, FieldValue> {
        map.into_iter()
            .map(|(key, value)| {
                let value = if self.is_sensitive(&key) {
                    FieldValue::String(REDACTION_MARKER.to_string())
                } else {
                    self.redact_value(value)
                };
                (key, value)
            })
            .collect()
    }

    /// Recurse into containers; scalars pass through unchanged
    pub fn redact_value(&self, value: FieldValue) -> FieldValue {
        match value {
            FieldValue::Map(map) => FieldValue::Map(self.redact_map(map)),
            FieldValue::List(items) => {
                FieldValue::List(items.into_iter().map(|v| self.redact_value(v)).collect())
            }
            scalar => scalar,
        }
    }
}

impl Default for KeyRedactor {
    fn default() -> Self {
        Self::new()
    }
}

impl Redact for KeyRedactor {
    fn redact(&self, record: LogRecord) -> LogRecord {
        LogRecord {
            context: record.context.map(|ctx| self.redact_context(ctx)),
            ..record
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;

    fn marker() -> FieldValue {
        FieldValue::String(REDACTION_MARKER.to_string())
    }

    fn sample_record() -> LogRecord {
        LogRecord::new(LogLevel::Info, "login").with_context(
            LogContext::new()
                .with_field("password", "x")
                .with_field("nested", LogContext::new().with_field("token", "y"))
                .with_field("safe", "z"),
        )
    }

    #[test]
    fn test_masks_top_level_and_nested() {
        let redacted = KeyRedactor::new().redact(sample_record());
        let ctx = redacted.context.unwrap();

        assert_eq!(ctx.get("password"), Some(&marker()));
        assert_eq!(ctx.get("safe"), Some(&FieldValue::String("z".into())));
        match ctx.get("nested") {
            Some(FieldValue::Map(inner)) => assert_eq!(inner.get("token"), Some(&marker())),
            other => panic!("expected nested map, got {:?}", other),
        }
    }

    #[test]
    fn test_idempotent() {
        let redactor = KeyRedactor::new();
        let once = redactor.redact(sample_record());
        let twice = redactor.redact(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_lists_and_case_insensitive_keys() {
        let ctx = LogContext::new().with_field(
            "items",
            FieldValue::List(vec![
                LogContext::new().with_field("SessionId", "abc").into(),
                FieldValue::Int(3),
            ]),
        );
        let redacted = KeyRedactor::new().redact_context(ctx);

        let expected = FieldValue::List(vec![
            LogContext::new().with_field("SessionId", REDACTION_MARKER).into(),
            FieldValue::Int(3),
        ]);
        assert_eq!(redacted.get("items"), Some(&expected));
    }

    #[test]
    fn test_sensitive_key_holding_container_is_masked_whole() {
        let ctx = LogContext::new().with_field("secret", LogContext::new().with_field("a", 1));
        let redacted = KeyRedactor::new().redact_context(ctx);
        assert_eq!(redacted.get("secret"), Some(&marker()));
        assert_eq!(redacted.len(), 1);
    }

    #[test]
    fn test_extra_keys() {
        let redactor = KeyRedactor::with_extra_keys(["Email"]);
        assert!(redactor.is_sensitive("email"));
        assert!(redactor.is_sensitive("EMAIL"));
        assert!(redactor.is_sensitive("pin"));
        assert!(!redactor.is_sensitive("username"));
    }

    #[test]
    fn test_record_without_context_untouched() {
        let record = LogRecord::new(LogLevel::Debug, "plain");
        let redacted = KeyRedactor::new().redact(record.clone());
        assert_eq!(record, redacted);
    }

    #[test]
    fn test_closure_redactor() {
        let upper = |mut record: LogRecord| {
            record.message = record.message.to_uppercase();
            record
        };
        let out = upper.redact(LogRecord::new(LogLevel::Info, "quiet"));
        assert_eq!(out.message, "QUIET");
    }
}
