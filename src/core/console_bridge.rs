//! Redirection of the `log` facade into a Logger
//!
//! When a logger is built with `patch_console`, records emitted through
//! `log::info!` and friends are forwarded to it. Facade levels map onto
//! logger severities as follows, with the facade target stored in the
//! record context under `target`:
//!
//! | `log` level     | severity |
//! |-----------------|----------|
//! | `Trace`/`Debug` | `debug`  |
//! | `Info`          | `info`   |
//! | `Warn`          | `warn`   |
//! | `Error`         | `error`  |
//!
//! The facade can only be claimed once per process. [`LogFacadeHost`]
//! claims it on first install and retargets it on every later install, so
//! the most recently patched logger receives facade records.

use super::error::{LoggerError, Result};
use super::log_context::LogContext;
use super::log_level::LogLevel;
use super::logger::Logger;
use parking_lot::RwLock;
use std::sync::OnceLock;

/// `log::Log` adapter forwarding into a [`Logger`]
#[derive(Clone, Debug)]
pub struct ConsoleBridge {
    logger: Logger,
}

impl ConsoleBridge {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Forward one facade record
    pub fn forward(&self, record: &log::Record<'_>) {
        let level = LogLevel::from(record.level());
        if !self.logger.enabled(level) {
            return;
        }
        let context = LogContext::new().with_field("target", record.target());
        self.logger
            .log_with_context(level, record.args().to_string(), context);
    }
}

impl log::Log for ConsoleBridge {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        self.logger.enabled(LogLevel::from(metadata.level()))
    }

    fn log(&self, record: &log::Record<'_>) {
        self.forward(record);
    }

    fn flush(&self) {
        self.logger.flush_in_background();
    }
}

/// Somewhere a [`ConsoleBridge`] can be installed
///
/// Production code uses [`LogFacadeHost`]; tests substitute a host that
/// keeps the bridge instead of touching process-wide state.
pub trait ConsoleHost: Send + Sync {
    fn install(&self, bridge: ConsoleBridge) -> Result<()>;
}

/// Host backed by the process-wide `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFacadeHost;

struct FacadeForwarder {
    target: RwLock<Option<ConsoleBridge>>,
}

impl log::Log for FacadeForwarder {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        self.target
            .read()
            .as_ref()
            .is_some_and(|bridge| log::Log::enabled(bridge, metadata))
    }

    fn log(&self, record: &log::Record<'_>) {
        // Clone out so a slow forward never holds the slot lock
        let bridge = self.target.read().clone();
        if let Some(bridge) = bridge {
            bridge.forward(record);
        }
    }

    fn flush(&self) {
        if let Some(bridge) = self.target.read().as_ref() {
            log::Log::flush(bridge);
        }
    }
}

static FORWARDER: FacadeForwarder = FacadeForwarder {
    target: parking_lot::const_rwlock(None),
};

/// Outcome of claiming the facade, decided once per process
static CLAIM: OnceLock<std::result::Result<(), String>> = OnceLock::new();

impl LogFacadeHost {
    /// Stop forwarding facade records; the facade stays claimed
    pub fn detach() -> Option<ConsoleBridge> {
        FORWARDER.target.write().take()
    }

    /// The bridge currently receiving facade records
    pub fn current() -> Option<ConsoleBridge> {
        FORWARDER.target.read().clone()
    }
}

impl ConsoleHost for LogFacadeHost {
    fn install(&self, bridge: ConsoleBridge) -> Result<()> {
        let claim = CLAIM.get_or_init(|| {
            log::set_logger(&FORWARDER)
                .map(|()| log::set_max_level(log::LevelFilter::Trace))
                .map_err(|e| e.to_string())
        });

        match claim {
            Ok(()) => {
                *FORWARDER.target.write() = Some(bridge);
                Ok(())
            }
            Err(message) => Err(LoggerError::ConsoleBridge(message.clone())),
        }
    }
}
