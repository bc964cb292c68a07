//! Event sinks: where flushed batches go.
use crate::event::DecisionEvent;
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Collector request failed: {0}")]
    Request(String),

    #[error("Collector rejected batch with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Sink timed out after {0} ms")]
    Timeout(u64),
}

/// Destination for batches of decision events.
#[async_trait]
pub trait EventSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send_batch(&self, events: &[DecisionEvent]) -> Result<(), SinkError>;
}

/// POSTs batches to `{base}/events/batch`.
pub struct HttpCollectorSink {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCollectorSink {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SinkError::Request(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl EventSink for HttpCollectorSink {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn send_batch(&self, events: &[DecisionEvent]) -> Result<(), SinkError> {
        let url = format!("{}/events/batch", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "events": events }))
            .send()
            .await
            .map_err(|e| SinkError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(SinkError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

/// Writes each event to the `decision_events` tracing target.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl EventSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send_batch(&self, events: &[DecisionEvent]) -> Result<(), SinkError> {
        for event in events {
            let payload = serde_json::to_string(event).unwrap_or_default();
            tracing::info!(
                target: "decision_events",
                request_id = event.request_id(),
                kind = event.kind_name(),
                event = %payload,
                "decision event"
            );
        }
        Ok(())
    }
}

/// Keeps every batch in memory. Used by tests and local runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<DecisionEvent>>,
    batches: Mutex<Vec<usize>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DecisionEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Size of each batch received, in arrival order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(|e| e.kind_name()).collect()
    }
}

#[async_trait]
impl EventSink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn send_batch(&self, events: &[DecisionEvent]) -> Result<(), SinkError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(events);
        self.batches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(events.len());
        Ok(())
    }
}

/// HTTP sink when a collector is configured, log sink otherwise.
pub fn sink_for(
    collector_url: Option<&str>,
    timeout: Duration,
) -> Result<Box<dyn EventSink>, SinkError> {
    match collector_url.map(str::trim).filter(|url| !url.is_empty()) {
        Some(url) => Ok(Box::new(HttpCollectorSink::new(url, timeout)?)),
        None => Ok(Box::new(LogSink)),
    }
}
