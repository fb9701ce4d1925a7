//! Size- and time-triggered batching queue
//!
//! [`BatchQueue`] buffers items in push order and hands them to a flush
//! callback either when `size` items are buffered or `interval_ms` after
//! the first item arrived in an empty, timer-less queue, whichever comes
//! first.
//!
//! At most one flush is in flight. A `flush()` issued while another is
//! running returns immediately without queueing a second one; items pushed
//! meanwhile stay buffered for the next trigger and never join the
//! in-flight batch. [`BatchQueue::drain`] delivers what was buffered when it
//! was called and returns, however fast new items keep arriving.
//!
//! Timers and background flushes run on the tokio runtime captured when
//! the queue is built.

use super::error::{LoggerError, Result};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

pub const DEFAULT_BATCH_SIZE: usize = 20;
pub const DEFAULT_BATCH_INTERVAL_MS: u64 = 1000;

/// Flush triggers for a [`BatchQueue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchConfig {
    /// Buffered item count that triggers an immediate flush (at least 1)
    #[serde(default = "default_size")]
    pub size: usize,
    /// Delay before a timer-triggered flush
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_interval_ms() -> u64 {
    DEFAULT_BATCH_INTERVAL_MS
}

impl BatchConfig {
    pub fn new(size: usize, interval_ms: u64) -> Self {
        Self {
            size: size.max(1),
            interval_ms,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE, DEFAULT_BATCH_INTERVAL_MS)
    }
}

/// Receives each batch in push order
pub type FlushCallback<T> = Arc<dyn Fn(Vec<T>) -> BoxFuture<'static, Result<()>> + Send + Sync>;

struct PendingTimer {
    id: u64,
    handle: JoinHandle<()>,
}

struct QueueState<T> {
    buffer: Vec<T>,
    timer: Option<PendingTimer>,
    flushing: bool,
    next_timer_id: u64,
    /// Items handed to a flush so far
    taken: u64,
    /// Items whose flush has finished, successfully or not
    settled: u64,
}

struct QueueInner<T> {
    config: BatchConfig,
    on_flush: FlushCallback<T>,
    runtime: Handle,
    state: Mutex<QueueState<T>>,
    /// Signalled whenever an in-flight flush completes
    idle: Notify,
    background_failures: AtomicU64,
}

/// Clears the in-flight flag however the flush ends, including cancellation
struct InFlightGuard<T: Send + 'static> {
    inner: Arc<QueueInner<T>>,
    count: usize,
}

impl<T: Send + 'static> Drop for InFlightGuard<T> {
    fn drop(&mut self) {
        let mut state = self.inner.state.lock();
        state.flushing = false;
        state.settled += self.count as u64;

        // Items that arrived mid-flight get a trigger of their own
        if state.buffer.len() >= self.inner.config.size {
            if let Some(batch) = self.inner.begin_flush(&mut state) {
                self.inner
                    .runtime
                    .spawn(Arc::clone(&self.inner).run_flush_reporting(batch, "size"));
            }
        } else if !state.buffer.is_empty() && state.timer.is_none() {
            self.inner.arm_timer(&mut state);
        }
        drop(state);

        self.inner.idle.notify_waiters();
    }
}

impl<T: Send + 'static> QueueInner<T> {
    /// Cancel the timer and take the buffer, unless a flush is running or
    /// there is nothing to send.
    fn begin_flush(&self, state: &mut QueueState<T>) -> Option<Vec<T>> {
        self.begin_flush_upto(state, usize::MAX)
    }

    /// Like `begin_flush`, taking at most the oldest `limit` items
    fn begin_flush_upto(&self, state: &mut QueueState<T>, limit: usize) -> Option<Vec<T>> {
        if let Some(timer) = state.timer.take() {
            timer.handle.abort();
        }
        if state.flushing || state.buffer.is_empty() || limit == 0 {
            return None;
        }
        state.flushing = true;
        let batch = if limit >= state.buffer.len() {
            std::mem::take(&mut state.buffer)
        } else {
            state.buffer.drain(..limit).collect()
        };
        state.taken += batch.len() as u64;
        Some(batch)
    }

    fn arm_timer(self: &Arc<Self>, state: &mut QueueState<T>) {
        let id = state.next_timer_id;
        state.next_timer_id = state.next_timer_id.wrapping_add(1);

        let weak = Arc::downgrade(self);
        let interval = self.config.interval();
        let handle = self.runtime.spawn(async move {
            tokio::time::sleep(interval).await;
            if let Some(inner) = weak.upgrade() {
                inner.on_timer(id).await;
            }
        });
        state.timer = Some(PendingTimer { id, handle });
    }

    async fn on_timer(self: Arc<Self>, id: u64) {
        let batch = {
            let mut state = self.state.lock();
            match &state.timer {
                // Detach before flushing so begin_flush does not abort this task
                Some(timer) if timer.id == id => state.timer = None,
                _ => return,
            }
            self.begin_flush(&mut state)
        };
        if let Some(batch) = batch {
            self.run_flush_reporting(batch, "timer").await;
        }
    }

    async fn run_flush(self: Arc<Self>, batch: Vec<T>) -> Result<()> {
        let _guard = InFlightGuard {
            inner: Arc::clone(&self),
            count: batch.len(),
        };
        (self.on_flush)(batch).await
    }

    /// Run a flush nobody awaits; failures are reported on stderr
    async fn run_flush_reporting(self: Arc<Self>, batch: Vec<T>, trigger: &'static str) {
        let count = batch.len();
        if let Err(e) = Arc::clone(&self).run_flush(batch).await {
            self.background_failures.fetch_add(1, Ordering::Relaxed);
            eprintln!(
                "[LOGGER ERROR] {} triggered flush of {} item(s) failed: {}",
                trigger, count, e
            );
        }
    }
}

impl<T> Drop for QueueInner<T> {
    fn drop(&mut self) {
        if let Some(timer) = self.state.get_mut().timer.take() {
            timer.handle.abort();
        }
    }
}

/// Buffer that delivers items in batches
pub struct BatchQueue<T: Send + 'static> {
    inner: Arc<QueueInner<T>>,
}

impl<T: Send + 'static> BatchQueue<T> {
    /// Create a queue bound to the current tokio runtime
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::NoRuntime`] when called outside a runtime.
    pub fn new(config: BatchConfig, on_flush: FlushCallback<T>) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| LoggerError::NoRuntime(e.to_string()))?;
        Ok(Self::with_handle(config, on_flush, runtime))
    }

    /// Create a queue whose timers run on `runtime`
    pub fn with_handle(config: BatchConfig, on_flush: FlushCallback<T>, runtime: Handle) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                config: BatchConfig::new(config.size, config.interval_ms),
                on_flush,
                runtime,
                state: Mutex::new(QueueState {
                    buffer: Vec::new(),
                    timer: None,
                    flushing: false,
                    next_timer_id: 0,
                    taken: 0,
                    settled: 0,
                }),
                idle: Notify::new(),
                background_failures: AtomicU64::new(0),
            }),
        }
    }

    /// Append an item.
    ///
    /// Reaching `size` items starts a flush right away: the batch is taken
    /// before `push` returns and delivered on a background task. Otherwise
    /// a timer is armed if none is pending.
    pub fn push(&self, item: T) {
        let mut state = self.inner.state.lock();
        state.buffer.push(item);

        if state.buffer.len() >= self.inner.config.size {
            if let Some(batch) = self.inner.begin_flush(&mut state) {
                drop(state);
                self.inner
                    .runtime
                    .spawn(Arc::clone(&self.inner).run_flush_reporting(batch, "size"));
                return;
            }
        }

        if state.timer.is_none() {
            self.inner.arm_timer(&mut state);
        }
    }

    /// Deliver everything buffered now.
    ///
    /// Cancels the pending timer. A no-op when the buffer is empty or when
    /// another flush is already in flight (it is not waited for). Errors
    /// from the callback are returned to the caller.
    pub async fn flush(&self) -> Result<()> {
        let batch = {
            let mut state = self.inner.state.lock();
            self.inner.begin_flush(&mut state)
        };
        match batch {
            Some(batch) => Arc::clone(&self.inner).run_flush(batch).await,
            None => Ok(()),
        }
    }

    /// Deliver every item buffered or in flight at the time of the call.
    ///
    /// Waits for an in-flight flush, then flushes the items that were
    /// buffered on entry and returns. Items pushed afterwards stay for a
    /// later trigger. Failures of the flushes started here are collected
    /// and returned together.
    pub async fn drain(&self) -> Result<()> {
        let target = {
            let state = self.inner.state.lock();
            state.taken + state.buffer.len() as u64
        };

        let mut errors = Vec::new();
        loop {
            let idle = self.inner.idle.notified();
            let batch = {
                let mut state = self.inner.state.lock();
                if state.settled >= target {
                    if state.buffer.is_empty() {
                        if let Some(timer) = state.timer.take() {
                            timer.handle.abort();
                        }
                    }
                    break;
                }
                if state.flushing {
                    None
                } else {
                    let remaining = target.saturating_sub(state.taken) as usize;
                    self.inner.begin_flush_upto(&mut state, remaining)
                }
            };

            match batch {
                Some(batch) => {
                    if let Err(e) = Arc::clone(&self.inner).run_flush(batch).await {
                        errors.extend(e.into_failures());
                    }
                }
                None => idle.await,
            }
        }
        LoggerError::aggregate("flush", errors)
    }

    /// Start a flush on the runtime without waiting for it
    pub fn flush_in_background(&self) {
        let batch = {
            let mut state = self.inner.state.lock();
            self.inner.begin_flush(&mut state)
        };
        if let Some(batch) = batch {
            self.inner
                .runtime
                .spawn(Arc::clone(&self.inner).run_flush_reporting(batch, "background"));
        }
    }

    /// Number of buffered items
    pub fn len(&self) -> usize {
        self.inner.state.lock().buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_flushing(&self) -> bool {
        self.inner.state.lock().flushing
    }

    pub fn has_pending_timer(&self) -> bool {
        self.inner.state.lock().timer.is_some()
    }

    /// Number of size- or timer-triggered flushes that failed
    pub fn background_failures(&self) -> u64 {
        self.inner.background_failures.load(Ordering::Relaxed)
    }

    pub fn config(&self) -> &BatchConfig {
        &self.inner.config
    }

    pub fn runtime(&self) -> &Handle {
        &self.inner.runtime
    }
}

impl<T: Send + 'static> std::fmt::Debug for BatchQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("BatchQueue")
            .field("config", &self.inner.config)
            .field("buffered", &state.buffer.len())
            .field("flushing", &state.flushing)
            .field("timer_pending", &state.timer.is_some())
            .finish()
    }
}
