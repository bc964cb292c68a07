//! Fire-and-forget event transport.
//!
//! Events emitted in the same scheduling turn are coalesced into one batch.
//! Delivery never blocks the caller and delivery failures are logged and
//! dropped.
use crate::event::DecisionEvent;
use crate::sink::{EventSink, SinkError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Delay before a scheduled flush runs. Zero flushes on the next turn.
    pub flush_delay: Duration,
    /// Upper bound for one batch delivery.
    pub send_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            flush_delay: Duration::ZERO,
            send_timeout: Duration::from_secs(5),
        }
    }
}

struct Inner {
    sink: Arc<dyn EventSink>,
    config: TransportConfig,
    buffer: Mutex<Vec<DecisionEvent>>,
    flush_scheduled: AtomicBool,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

/// Buffers events and schedules batched delivery to a sink.
#[derive(Clone)]
pub struct EventTransport {
    inner: Arc<Inner>,
}

impl EventTransport {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self::with_config(sink, TransportConfig::default())
    }

    pub fn with_config(sink: Arc<dyn EventSink>, config: TransportConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                sink,
                config,
                buffer: Mutex::new(Vec::new()),
                flush_scheduled: AtomicBool::new(false),
                pending: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Buffers `event` and schedules a flush if none is pending.
    pub fn emit(&self, event: DecisionEvent) {
        self.inner
            .buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);

        if self.inner.flush_scheduled.swap(true, Ordering::AcqRel) {
            return;
        }

        match Handle::try_current() {
            Ok(handle) => {
                let inner = Arc::clone(&self.inner);
                let task = handle.spawn(async move {
                    if inner.config.flush_delay.is_zero() {
                        tokio::task::yield_now().await;
                    } else {
                        tokio::time::sleep(inner.config.flush_delay).await;
                    }
                    flush_inner(&inner).await;
                });
                let mut pending = self
                    .inner
                    .pending
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                pending.retain(|t| !t.is_finished());
                pending.push(task);
            }
            Err(_) => {
                // No runtime: events stay buffered until an explicit flush.
                self.inner.flush_scheduled.store(false, Ordering::Release);
            }
        }
    }

    /// Delivers everything buffered right now.
    pub async fn flush(&self) {
        flush_inner(&self.inner).await;
    }

    /// Waits for scheduled flushes, then delivers whatever is left.
    pub async fn drain(&self) {
        let tasks: Vec<JoinHandle<()>> = std::mem::take(
            &mut *self
                .inner
                .pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "event flush task aborted");
            }
        }
        self.flush().await;
    }

    /// Events buffered but not yet handed to the sink.
    pub fn pending_events(&self) -> usize {
        self.inner
            .buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

async fn flush_inner(inner: &Inner) {
    inner.flush_scheduled.store(false, Ordering::Release);
    let batch: Vec<DecisionEvent> = std::mem::take(
        &mut *inner.buffer.lock().unwrap_or_else(PoisonError::into_inner),
    );
    if batch.is_empty() {
        return;
    }

    let timeout = inner.config.send_timeout;
    let result = match tokio::time::timeout(timeout, inner.sink.send_batch(&batch)).await {
        Ok(result) => result,
        Err(_) => Err(SinkError::Timeout(timeout.as_millis() as u64)),
    };

    match result {
        Ok(()) => tracing::debug!(
            sink = inner.sink.name(),
            count = batch.len(),
            "decision events delivered"
        ),
        Err(e) => tracing::warn!(
            sink = inner.sink.name(),
            count = batch.len(),
            error = %e,
            "dropping decision events after delivery failure"
        ),
    }
}
