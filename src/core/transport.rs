//! Transport trait for log output destinations

use super::error::{LoggerError, Result};
use super::log_record::LogRecord;
use async_trait::async_trait;
use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Optional operations a transport supports
///
/// The logger only calls `flush` or `dispose` on transports that declare
/// the matching capability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportCapabilities {
    pub flush: bool,
    pub dispose: bool,
}

impl TransportCapabilities {
    pub const NONE: Self = Self {
        flush: false,
        dispose: false,
    };

    pub const ALL: Self = Self {
        flush: true,
        dispose: true,
    };

    pub const FLUSH: Self = Self {
        flush: true,
        dispose: false,
    };
}

/// A destination that receives batches of log records
///
/// Methods take `&self`; implementations handle their own interior
/// mutability and may be called concurrently.
///
/// # Example
///
/// ```no_run
/// use rust_client_logger::core::{LogRecord, Result, Transport};
/// use async_trait::async_trait;
///
/// struct StdoutLines;
///
/// #[async_trait]
/// impl Transport for StdoutLines {
///     fn name(&self) -> &str {
///         "stdout_lines"
///     }
///
///     async fn write(&self, batch: &[LogRecord]) -> Result<()> {
///         for record in batch {
///             println!("{}", record.to_json()?);
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Get the transport name
    fn name(&self) -> &str;

    fn capabilities(&self) -> TransportCapabilities {
        TransportCapabilities::NONE
    }

    /// Deliver one batch, in order
    async fn write(&self, batch: &[LogRecord]) -> Result<()>;

    /// Push out anything buffered internally
    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Release resources; no further calls follow
    async fn dispose(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransportOp {
    Write,
    Flush,
    Dispose,
}

impl TransportOp {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            TransportOp::Write => "write",
            TransportOp::Flush => "flush",
            TransportOp::Dispose => "dispose",
        }
    }

    fn applies_to(&self, capabilities: TransportCapabilities) -> bool {
        match self {
            TransportOp::Write => true,
            TransportOp::Flush => capabilities.flush,
            TransportOp::Dispose => capabilities.dispose,
        }
    }
}

/// Run `op` on every eligible transport concurrently and collect failures.
///
/// Each call is isolated: an error or panic in one transport never keeps
/// the others from being attempted, and every call is awaited.
pub(crate) async fn fan_out(
    transports: &[Arc<dyn Transport>],
    op: TransportOp,
    batch: &[LogRecord],
) -> Vec<LoggerError> {
    let calls = transports
        .iter()
        .filter(|transport| op.applies_to(transport.capabilities()))
        .map(|transport| async move {
            let call = match op {
                TransportOp::Write => transport.write(batch),
                TransportOp::Flush => transport.flush(),
                TransportOp::Dispose => transport.dispose(),
            };
            match AssertUnwindSafe(call).catch_unwind().await {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e),
                Err(panic) => Some(LoggerError::transport(
                    transport.name(),
                    op.as_str(),
                    format!("panicked: {}", panic_message(panic.as_ref())),
                )),
            }
        });

    join_all(calls).await.into_iter().flatten().collect()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
