//! Pipeline-level knobs.
use sdkgen_core::{AGENT_ID, AGENT_VERSION};
use sdkgen_events::TransportConfig;
use std::time::Duration;

/// Request size ceiling: 5 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Generation is never attempted with less budget than this left.
pub const DEFAULT_MIN_GENERATION_HEADROOM: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub max_body_bytes: usize,
    pub min_generation_headroom: Duration,
    pub agent_id: String,
    pub agent_version: String,
    /// Settings for the per-request event transport.
    pub transport: TransportConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            min_generation_headroom: DEFAULT_MIN_GENERATION_HEADROOM,
            agent_id: AGENT_ID.to_string(),
            agent_version: AGENT_VERSION.to_string(),
            transport: TransportConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// True when `remaining` leaves enough headroom to start generating.
    /// An unbounded invocation always has headroom.
    pub fn has_headroom(&self, remaining: Option<Duration>) -> bool {
        remaining.map_or(true, |r| r >= self.min_generation_headroom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_body_bytes, 5_242_880);
        assert_eq!(config.min_generation_headroom, Duration::from_secs(30));
        assert_eq!(config.agent_id, "sdk-generator");
    }

    #[test]
    fn test_headroom_floor_is_inclusive() {
        let config = PipelineConfig::default();
        assert!(config.has_headroom(None));
        assert!(config.has_headroom(Some(Duration::from_secs(30))));
        assert!(!config.has_headroom(Some(Duration::from_millis(29_999))));
    }
}
