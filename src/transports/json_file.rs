//! NDJSON file transport
//!
//! Uses tokio::fs for fully asynchronous file I/O. Each record is written
//! as one JSON object per line, in the same shape `LogRecord` serializes to.

use crate::core::{LogRecord, LoggerError, Result, Transport, TransportCapabilities};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

/// Appends records as JSON lines to a file
///
/// Writes go through a buffer; the logger's `flush()` pushes it to the
/// file and `dispose()` also syncs it to disk. Data still buffered when the
/// transport is dropped without either is lost.
///
/// # Example
///
/// ```no_run
/// use rust_client_logger::prelude::*;
///
/// # async fn example() -> rust_client_logger::Result<()> {
/// let file = JsonFileTransport::new("logs/app.ndjson").await?;
/// let logger = Logger::builder().transport(file).build()?;
///
/// logger.info("written as one JSON line");
/// logger.dispose().await?;
/// # Ok(())
/// # }
/// ```
pub struct JsonFileTransport {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
    buffer_size: usize,
}

impl JsonFileTransport {
    /// Default buffer size (64 KB)
    pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

    /// Open `path` for appending, creating it and its parent directories
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_buffer_size(path, Self::DEFAULT_BUFFER_SIZE).await
    }

    pub async fn with_buffer_size(path: impl AsRef<Path>, buffer_size: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        Ok(Self {
            writer: Mutex::new(BufWriter::with_capacity(buffer_size, file)),
            path,
            buffer_size,
        })
    }

    /// Get the log file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }
}

#[async_trait]
impl Transport for JsonFileTransport {
    fn name(&self) -> &str {
        "json_file"
    }

    fn capabilities(&self) -> TransportCapabilities {
        TransportCapabilities::ALL
    }

    async fn write(&self, batch: &[LogRecord]) -> Result<()> {
        // Serialize up front so a bad record never leaves a partial batch
        let mut lines = String::new();
        for record in batch {
            lines.push_str(&record.to_json()?);
            lines.push('\n');
        }

        self.writer
            .lock()
            .await
            .write_all(lines.as_bytes())
            .await
            .map_err(LoggerError::from)
    }

    async fn flush(&self) -> Result<()> {
        self.writer.lock().await.flush().await?;
        Ok(())
    }

    async fn dispose(&self) -> Result<()> {
        let mut writer = self.writer.lock().await;
        writer.flush().await?;
        writer.get_ref().sync_all().await?;
        Ok(())
    }
}
