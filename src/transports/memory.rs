//! In-memory capturing transport
//!
//! Keeps every batch it receives. Clones share storage, so a test can keep
//! one handle and give another to the logger.

use crate::core::{LogRecord, Result, Transport, TransportCapabilities};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Captured {
    batches: Vec<Vec<LogRecord>>,
    flush_calls: usize,
    dispose_calls: usize,
}

/// Transport that records batches, flushes and disposals
///
/// # Example
///
/// ```
/// use rust_client_logger::prelude::*;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> rust_client_logger::Result<()> {
/// let memory = MemoryTransport::new();
/// let logger = Logger::builder().transport(memory.clone()).build()?;
///
/// logger.info("captured");
/// logger.flush().await?;
///
/// assert_eq!(memory.records()[0].message, "captured");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    captured: Arc<Mutex<Captured>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Batches in delivery order
    pub fn batches(&self) -> Vec<Vec<LogRecord>> {
        self.captured.lock().batches.clone()
    }

    /// All delivered records, flattened in delivery order
    pub fn records(&self) -> Vec<LogRecord> {
        self.captured
            .lock()
            .batches
            .iter()
            .flatten()
            .cloned()
            .collect()
    }

    pub fn flush_calls(&self) -> usize {
        self.captured.lock().flush_calls
    }

    pub fn dispose_calls(&self) -> usize {
        self.captured.lock().dispose_calls
    }

    /// Forget everything captured so far
    pub fn clear(&self) {
        *self.captured.lock() = Captured::default();
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    fn name(&self) -> &str {
        "memory"
    }

    fn capabilities(&self) -> TransportCapabilities {
        TransportCapabilities::ALL
    }

    async fn write(&self, batch: &[LogRecord]) -> Result<()> {
        self.captured.lock().batches.push(batch.to_vec());
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        self.captured.lock().flush_calls += 1;
        Ok(())
    }

    async fn dispose(&self) -> Result<()> {
        self.captured.lock().dispose_calls += 1;
        Ok(())
    }
}
