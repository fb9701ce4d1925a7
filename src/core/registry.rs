//! Root logger registry
//!
//! A [`LoggerRegistry`] holds at most one root logger. `initialize` builds
//! and stores a root, replacing any previous one without merging.
//! `get_logger` hands out the root or a namespaced child of it.
//!
//! The process-wide registry behind [`initialize`], [`get_logger`] and
//! [`shutdown`] is one instance of the same type; code that wants isolated
//! state creates its own registry.
//!
//! # Example
//!
//! ```
//! use rust_client_logger::core::{LoggerConfig, LoggerRegistry};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> rust_client_logger::Result<()> {
//! let registry = LoggerRegistry::new();
//! assert!(registry.get_logger(None).is_err());
//!
//! registry.initialize(LoggerConfig::default())?;
//! let auth = registry.get_logger(Some("auth"))?;
//! assert_eq!(auth.namespace(), Some("auth"));
//! # Ok(())
//! # }
//! ```

use super::config::LoggerConfig;
use super::error::{LoggerError, Result};
use super::logger::Logger;
use parking_lot::RwLock;

pub struct LoggerRegistry {
    root: RwLock<Option<Logger>>,
}

impl LoggerRegistry {
    pub const fn new() -> Self {
        Self {
            root: parking_lot::const_rwlock(None),
        }
    }

    /// Build a root logger from `config` and store it
    pub fn initialize(&self, config: LoggerConfig) -> Result<Logger> {
        let logger = Logger::new(config)?;
        self.install(logger.clone());
        Ok(logger)
    }

    /// Store `logger` as the root, returning the one it replaces
    ///
    /// The replaced logger is not disposed; it flushes when its last
    /// handle is dropped.
    pub fn install(&self, logger: Logger) -> Option<Logger> {
        self.root.write().replace(logger)
    }

    /// The root for `None`, otherwise `root.child(namespace)`
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::Uninitialized`] if no root is stored.
    pub fn get_logger(&self, namespace: Option<&str>) -> Result<Logger> {
        let root = self.root().ok_or(LoggerError::Uninitialized)?;
        Ok(match namespace {
            Some(namespace) => root.child(namespace)?,
            None => root,
        })
    }

    pub fn root(&self) -> Option<Logger> {
        self.root.read().clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.root.read().is_some()
    }

    /// Remove the root, leaving the registry uninitialized
    pub fn take(&self) -> Option<Logger> {
        self.root.write().take()
    }

    /// Remove the root and dispose it
    pub async fn shutdown(&self) -> Result<()> {
        match self.take() {
            Some(root) => root.dispose().await,
            None => Ok(()),
        }
    }
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerRegistry")
            .field("root", &*self.root.read())
            .finish()
    }
}

static GLOBAL: LoggerRegistry = LoggerRegistry::new();

/// The process-wide registry
pub fn global() -> &'static LoggerRegistry {
    &GLOBAL
}

/// Build the process-wide root logger; a later call replaces it
pub fn initialize(config: LoggerConfig) -> Result<Logger> {
    GLOBAL.initialize(config)
}

/// Root or namespaced logger from the process-wide registry
pub fn get_logger(namespace: Option<&str>) -> Result<Logger> {
    GLOBAL.get_logger(namespace)
}

/// Dispose and remove the process-wide root logger
pub async fn shutdown() -> Result<()> {
    GLOBAL.shutdown().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use crate::transports::MemoryTransport;
    use std::sync::Arc;

    fn config_with(memory: &MemoryTransport, level: LogLevel) -> LoggerConfig {
        LoggerConfig {
            level,
            transports: Arc::new(vec![Arc::new(memory.clone())]),
            ..LoggerConfig::default()
        }
    }

    #[test]
    fn test_uninitialized() {
        let registry = LoggerRegistry::new();
        assert!(!registry.is_initialized());
        assert!(matches!(
            registry.get_logger(None),
            Err(LoggerError::Uninitialized)
        ));
        assert!(matches!(
            registry.get_logger(Some("x")),
            Err(LoggerError::Uninitialized)
        ));
    }

    #[tokio::test]
    async fn test_last_initialize_wins() {
        let registry = LoggerRegistry::new();
        let first = MemoryTransport::new();
        let second = MemoryTransport::new();

        registry
            .initialize(config_with(&first, LogLevel::Debug))
            .unwrap();
        registry
            .initialize(config_with(&second, LogLevel::Error))
            .unwrap();

        let root = registry.get_logger(None).unwrap();
        assert_eq!(root.level(), LogLevel::Error);

        root.error("to second");
        root.flush().await.unwrap();
        assert!(first.records().is_empty());
        assert_eq!(second.records().len(), 1);
    }

    #[tokio::test]
    async fn test_namespaced_children_are_fresh_instances() {
        let registry = LoggerRegistry::new();
        let memory = MemoryTransport::new();
        registry
            .initialize(config_with(&memory, LogLevel::Info))
            .unwrap();

        let a = registry.get_logger(Some("a")).unwrap();
        let ab = a.child("b").unwrap();
        assert_eq!(ab.namespace(), Some("a:b"));

        a.set_level(LogLevel::Fatal);
        let again = registry.get_logger(Some("a")).unwrap();
        assert_eq!(again.level(), LogLevel::Info);
    }

    #[tokio::test]
    async fn test_get_logger_rejects_malformed_namespace() {
        let registry = LoggerRegistry::new();
        let memory = MemoryTransport::new();
        registry
            .initialize(config_with(&memory, LogLevel::Info))
            .unwrap();

        for bad in ["", "a:", ":a", "a::b"] {
            let err = registry.get_logger(Some(bad)).unwrap_err();
            assert!(
                matches!(err, LoggerError::InvalidConfiguration { .. }),
                "{:?} was accepted",
                bad
            );
        }
    }

    #[tokio::test]
    async fn test_shutdown_disposes_and_clears() {
        let registry = LoggerRegistry::new();
        let memory = MemoryTransport::new();
        let root = registry
            .initialize(config_with(&memory, LogLevel::Info))
            .unwrap();
        root.info("bye");

        registry.shutdown().await.unwrap();
        assert!(!registry.is_initialized());
        assert!(root.is_disposed());
        assert_eq!(memory.records().len(), 1);
        assert_eq!(memory.dispose_calls(), 1);

        // Second shutdown has nothing to do
        registry.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_install_returns_previous() {
        let registry = LoggerRegistry::new();
        let one = Logger::builder().namespace("one").build().unwrap();
        let two = Logger::builder().namespace("two").build().unwrap();

        assert!(registry.install(one).is_none());
        let previous = registry.install(two).unwrap();
        assert_eq!(previous.namespace(), Some("one"));
        assert_eq!(registry.root().unwrap().namespace(), Some("two"));
    }
}
