//! Prometheus registry for request counts and latency.
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Duration;

pub struct Metrics {
    registry: Registry,
    requests: IntCounterVec,
    duration: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let requests = IntCounterVec::new(
            Opts::new("sdkgen_requests_total", "Generation requests by response status"),
            &["status"],
        )?;
        let duration = Histogram::with_opts(
            HistogramOpts::new(
                "sdkgen_request_duration_seconds",
                "Wall-clock time spent handling a generation request",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        )?;
        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(duration.clone()))?;
        Ok(Self {
            registry,
            requests,
            duration,
        })
    }

    /// Records one handled generation request.
    pub fn observe(&self, status: u16, elapsed: Duration) {
        let status = status.to_string();
        self.requests.with_label_values(&[status.as_str()]).inc();
        self.duration.observe(elapsed.as_secs_f64());
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_counts_by_status() {
        let metrics = Metrics::new().unwrap();
        metrics.observe(200, Duration::from_millis(20));
        metrics.observe(200, Duration::from_millis(40));
        metrics.observe(400, Duration::from_millis(1));

        let text = metrics.encode().unwrap();
        assert!(text.contains("sdkgen_requests_total{status=\"200\"} 2"));
        assert!(text.contains("sdkgen_requests_total{status=\"400\"} 1"));
        assert!(text.contains("sdkgen_request_duration_seconds_count 3"));
    }
}
