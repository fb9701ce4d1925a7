//! Property-based tests for rust_client_logger using proptest

use proptest::prelude::*;
use rust_client_logger::core::{should_sample_with, RateLimiter, REDACTION_MARKER};
use rust_client_logger::prelude::*;
use std::collections::BTreeMap;
use std::time::Instant;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Trace),
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Error),
        Just(LogLevel::Fatal),
    ]
}

fn context_key() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("password".to_string()),
        Just("Token".to_string()),
        Just("SESSIONID".to_string()),
        "[a-z]{1,6}",
    ]
}

fn field_value() -> impl Strategy<Value = FieldValue> {
    let leaf = prop_oneof![
        Just(FieldValue::Null),
        any::<bool>().prop_map(FieldValue::Bool),
        any::<i64>().prop_map(FieldValue::Int),
        "[a-z ]{0,8}".prop_map(FieldValue::String),
    ];
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(FieldValue::List),
            prop::collection::btree_map(context_key(), inner, 0..4).prop_map(FieldValue::Map),
        ]
    })
}

fn log_context() -> impl Strategy<Value = LogContext> {
    prop::collection::btree_map(context_key(), field_value(), 0..6).prop_map(LogContext::from)
}

/// Every sensitive key anywhere in the tree holds the marker
fn fully_masked(map: &BTreeMap<String, FieldValue>, redactor: &KeyRedactor) -> bool {
    map.iter().all(|(key, value)| {
        if redactor.is_sensitive(key) {
            value.as_str() == Some(REDACTION_MARKER)
        } else {
            value_masked(value, redactor)
        }
    })
}

fn value_masked(value: &FieldValue, redactor: &KeyRedactor) -> bool {
    match value {
        FieldValue::Map(map) => fully_masked(map, redactor),
        FieldValue::List(items) => items.iter().all(|v| value_masked(v, redactor)),
        _ => true,
    }
}

proptest! {
    /// A call passes exactly when its rank is at least the threshold rank
    #[test]
    fn test_level_gate_matches_ordering(level in any_level(), threshold in any_level()) {
        prop_assert_eq!(level.passes(threshold), level.rank() >= threshold.rank());
        prop_assert_eq!(level.passes(threshold), level >= threshold);
    }

    /// Display and parse agree for every level
    #[test]
    fn test_level_display_parses_back(level in any_level()) {
        let parsed: LogLevel = level.to_string().parse().unwrap();
        prop_assert_eq!(parsed, level);
    }

    /// Redaction masks every sensitive key, keeps the key set and is idempotent
    #[test]
    fn test_redaction_masks_and_is_idempotent(context in log_context()) {
        let redactor = KeyRedactor::new();
        let keys: Vec<String> = context.fields().keys().cloned().collect();

        let once = redactor.redact_context(context);
        prop_assert!(fully_masked(once.fields(), &redactor));
        prop_assert_eq!(once.fields().keys().cloned().collect::<Vec<_>>(), keys);

        let twice = redactor.redact_context(once.clone());
        prop_assert_eq!(twice, once);
    }

    /// Actionable levels pass at any rate; rates at the bounds are deterministic
    #[test]
    fn test_sampling_floor(level in any_level(), rate in 0.0f64..=1.0, seed in any::<u64>()) {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

        if level.is_actionable() {
            prop_assert!(should_sample_with(level, rate, &mut rng));
        }
        prop_assert!(should_sample_with(level, 1.0, &mut rng));
        prop_assert_eq!(should_sample_with(level, 0.0, &mut rng), level.is_actionable());
    }

    /// Within one window exactly `min(calls, max)` calls are admitted, first come first served
    #[test]
    fn test_rate_limiter_admits_prefix(max in 0u32..50, calls in 0usize..120) {
        let now = Instant::now();
        let limiter = RateLimiter::starting_at(RateLimitConfig::new(max), now);

        let admitted: Vec<bool> = (0..calls).map(|_| limiter.check_at(now)).collect();
        let expected = calls.min(max as usize);

        prop_assert_eq!(admitted.iter().filter(|a| **a).count(), expected);
        prop_assert!(admitted.iter().take(expected).all(|a| *a));
        prop_assert_eq!(limiter.current_count(), calls as u64);
    }

    /// Child namespaces join with ':' in derivation order
    #[test]
    fn test_child_namespace_composition(parts in prop::collection::vec("[a-z]{1,6}", 1..5)) {
        let mut config = LoggerConfig::default();
        for part in &parts {
            config.namespace = Some(config.child_namespace(part));
        }
        prop_assert_eq!(config.namespace, Some(parts.join(":")));
    }

    /// Batch size is never below one
    #[test]
    fn test_batch_size_coerced(size in 0usize..100, interval in 0u64..10_000) {
        let config = BatchConfig::new(size, interval);
        prop_assert_eq!(config.size, size.max(1));
        prop_assert_eq!(config.interval_ms, interval);
    }

    /// Clamped rates always fall in 0..=1
    #[test]
    fn test_sampling_rate_clamped(rate in any::<f64>()) {
        let config = SamplingConfig::new(rate);
        prop_assert!((0.0..=1.0).contains(&config.rate));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Records reach the transport in acceptance order whatever the batch size
    #[test]
    fn test_delivery_preserves_order(count in 1usize..60, size in 1usize..10) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();

        let delivered = runtime.block_on(async {
            let memory = MemoryTransport::new();
            let logger = Logger::builder()
                .transport(memory.clone())
                .batch(size, 10)
                .build()
                .unwrap();

            for i in 0..count {
                logger.info(i.to_string());
            }
            logger.flush().await.unwrap();
            memory.records().into_iter().map(|r| r.message).collect::<Vec<_>>()
        });

        let expected: Vec<String> = (0..count).map(|i| i.to_string()).collect();
        prop_assert_eq!(delivered, expected);
    }
}
