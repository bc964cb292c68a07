//! Direct client for the decision-event collector.
use crate::event::DecisionEvent;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Collector rejected event ({status}): {message}")]
    Validation { status: u16, message: String },

    #[error("Collector transport error: {0}")]
    Transport(String),

    #[error("Collector unhealthy: {0}")]
    Unhealthy(String),

    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

impl ClientError {
    /// Validation rejections are final; everything else may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Delay before attempt `n + 1` is `base_delay * n`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    status: HealthStatus,
}

pub struct DecisionClient {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl DecisionClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends one event, retrying transport failures with linear backoff.
    pub async fn send(&self, event: &DecisionEvent) -> Result<(), ClientError> {
        let attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.send_once(event).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_retryable() && attempt < attempts => {
                    tracing::debug!(attempt, error = %e, "retrying decision event");
                    tokio::time::sleep(self.retry.base_delay * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(&self, event: &DecisionEvent) -> Result<(), ClientError> {
        let url = format!("{}/events", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "event": event }))
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        if status.is_client_error() {
            Err(ClientError::Validation {
                status: status.as_u16(),
                message,
            })
        } else {
            Err(ClientError::Transport(format!("status {}: {}", status, message)))
        }
    }

    /// Reads `GET /health`. A body without a status counts as healthy when 2xx.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Ok(HealthStatus::Unhealthy);
        }
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(serde_json::from_str::<HealthBody>(&text)
            .map(|body| body.status)
            .unwrap_or(HealthStatus::Healthy))
    }

    /// Errors unless the collector reports healthy or degraded.
    pub async fn ensure_healthy(&self) -> Result<HealthStatus, ClientError> {
        match self.health().await? {
            HealthStatus::Unhealthy => Err(ClientError::Unhealthy(self.base_url.clone())),
            status => Ok(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryability() {
        assert!(ClientError::Transport("reset".into()).is_retryable());
        assert!(!ClientError::Validation {
            status: 422,
            message: "bad".into()
        }
        .is_retryable());
        assert!(!ClientError::Unhealthy("x".into()).is_retryable());
    }

    #[test]
    fn test_default_retry_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(200));
    }

    #[test]
    fn test_health_status_wire_names() {
        let status: HealthStatus = serde_json::from_str("\"degraded\"").unwrap();
        assert_eq!(status, HealthStatus::Degraded);
    }
}
