//! Service configuration: defaults, optional YAML file, then environment.
//!
//! | Env | Default |
//! |---|---|
//! | `SDKGEN_ADDR` | `0.0.0.0:8787` |
//! | `SDKGEN_CONFIG` | unset (YAML file path) |
//! | `SDKGEN_COLLECTOR_URL` | unset (log sink) |
//! | `SDKGEN_COLLECTOR_TIMEOUT_MS` | `5000` |
//! | `SDKGEN_FLUSH_DELAY_MS` | `0` |
//! | `SDKGEN_MAX_BODY_BYTES` | `5242880` |
//! | `SDKGEN_EXECUTION_BUDGET_MS` | `300000` (`0` = unbounded) |
//! | `SDKGEN_LOG_FORMAT` | `pretty` |
use crate::logging::LogFormat;
use sdkgen_events::TransportConfig;
use sdkgen_pipeline::{PipelineConfig, DEFAULT_MAX_BODY_BYTES};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("CONFIG/read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CONFIG/parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("CONFIG/invalid {key}={value}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub addr: String,
    pub collector_url: Option<String>,
    pub collector_timeout_ms: u64,
    pub flush_delay_ms: u64,
    pub max_body_bytes: usize,
    pub execution_budget_ms: u64,
    pub log_format: LogFormat,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8787".to_string(),
            collector_url: None,
            collector_timeout_ms: 5_000,
            flush_delay_ms: 0,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            execution_budget_ms: 300_000,
            log_format: LogFormat::Pretty,
        }
    }
}

impl ServiceConfig {
    /// Loads from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads using `lookup` for environment values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup("SDKGEN_CONFIG") {
            Some(path) if !path.trim().is_empty() => Self::from_file(Path::new(path.trim()))?,
            _ => Self::default(),
        };
        config.apply_env(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    fn apply_env<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("SDKGEN_ADDR") {
            self.addr = addr;
        }
        if let Some(url) = lookup("SDKGEN_COLLECTOR_URL") {
            let url = url.trim();
            self.collector_url = (!url.is_empty()).then(|| url.to_string());
        }
        if let Some(v) = lookup("SDKGEN_COLLECTOR_TIMEOUT_MS") {
            self.collector_timeout_ms = parse("SDKGEN_COLLECTOR_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("SDKGEN_FLUSH_DELAY_MS") {
            self.flush_delay_ms = parse("SDKGEN_FLUSH_DELAY_MS", &v)?;
        }
        if let Some(v) = lookup("SDKGEN_MAX_BODY_BYTES") {
            self.max_body_bytes = parse("SDKGEN_MAX_BODY_BYTES", &v)?;
        }
        if let Some(v) = lookup("SDKGEN_EXECUTION_BUDGET_MS") {
            self.execution_budget_ms = parse("SDKGEN_EXECUTION_BUDGET_MS", &v)?;
        }
        if let Some(v) = lookup("SDKGEN_LOG_FORMAT") {
            self.log_format = parse("SDKGEN_LOG_FORMAT", &v)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Err(e) = self.addr.parse::<SocketAddr>() {
            return Err(invalid("addr", &self.addr, e.to_string()));
        }
        if self.max_body_bytes == 0 {
            return Err(invalid("max_body_bytes", "0", "must be positive"));
        }
        if self.collector_timeout_ms == 0 {
            return Err(invalid("collector_timeout_ms", "0", "must be positive"));
        }
        if let Some(url) = &self.collector_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(invalid("collector_url", url, "must be an http(s) URL"));
            }
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.addr
            .parse()
            .map_err(|e: std::net::AddrParseError| invalid("addr", &self.addr, e.to_string()))
    }

    pub fn collector_timeout(&self) -> Duration {
        Duration::from_millis(self.collector_timeout_ms)
    }

    /// `None` when the budget is zero (no hosting-environment ceiling).
    pub fn execution_budget(&self) -> Option<Duration> {
        (self.execution_budget_ms > 0).then(|| Duration::from_millis(self.execution_budget_ms))
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            flush_delay: Duration::from_millis(self.flush_delay_ms),
            send_timeout: self.collector_timeout(),
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            max_body_bytes: self.max_body_bytes,
            transport: self.transport_config(),
            ..PipelineConfig::default()
        }
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| invalid(key, value, e.to_string()))
}

fn invalid(key: &str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.execution_budget(), Some(Duration::from_secs(300)));
        assert_eq!(config.pipeline_config().max_body_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn test_env_overrides() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("SDKGEN_ADDR", "127.0.0.1:9000"),
            ("SDKGEN_COLLECTOR_URL", "http://collector:8080"),
            ("SDKGEN_COLLECTOR_TIMEOUT_MS", "1500"),
            ("SDKGEN_EXECUTION_BUDGET_MS", "0"),
            ("SDKGEN_LOG_FORMAT", "json"),
        ]))
        .unwrap();
        assert_eq!(config.addr, "127.0.0.1:9000");
        assert_eq!(config.collector_url.as_deref(), Some("http://collector:8080"));
        assert_eq!(config.transport_config().send_timeout, Duration::from_millis(1500));
        assert_eq!(config.execution_budget(), None);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_blank_collector_url_means_log_sink() {
        let config = ServiceConfig::from_lookup(lookup(&[("SDKGEN_COLLECTOR_URL", "  ")])).unwrap();
        assert!(config.collector_url.is_none());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = ServiceConfig::from_lookup(lookup(&[("SDKGEN_MAX_BODY_BYTES", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "SDKGEN_MAX_BODY_BYTES"));

        let err = ServiceConfig::from_lookup(lookup(&[("SDKGEN_ADDR", "nowhere")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "addr"));

        let err = ServiceConfig::from_lookup(lookup(&[("SDKGEN_COLLECTOR_URL", "ftp://x")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "collector_url"));
    }

    #[test]
    fn test_yaml_file_with_env_on_top() {
        let dir = std::env::temp_dir().join(format!("sdkgen-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("service.yaml");
        std::fs::write(
            &path,
            "addr: 127.0.0.1:7000\nflush_delay_ms: 25\nlog_format: json\n",
        )
        .unwrap();

        let path_str = path.to_string_lossy().to_string();
        let config = ServiceConfig::from_lookup(lookup(&[
            ("SDKGEN_CONFIG", path_str.as_str()),
            ("SDKGEN_ADDR", "127.0.0.1:7001"),
        ]))
        .unwrap();
        assert_eq!(config.addr, "127.0.0.1:7001");
        assert_eq!(config.flush_delay_ms, 25);
        assert_eq!(config.log_format, LogFormat::Json);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let err = ServiceConfig::from_lookup(lookup(&[("SDKGEN_CONFIG", "/nonexistent/sdkgen.yaml")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
