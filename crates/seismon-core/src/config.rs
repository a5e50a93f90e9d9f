//! Configuration loading and typed config structures for the Seismon monitor.
//!
//! The canonical configuration lives in `seismon-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads the file and applies
//! environment overrides.

use std::path::Path;

use serde::Deserialize;
use seismon_types::ClusteringConfig;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level monitor configuration.
///
/// Mirrors the structure of `seismon-config.yaml`. All fields have defaults
/// matching the observed production values, so an absent file yields a
/// working monitor.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MonitorConfig {
    /// Upstream event stream settings.
    #[serde(default)]
    pub stream: StreamConfig,

    /// Live buffer capacities.
    #[serde(default)]
    pub store: StoreConfig,

    /// Grid and server clustering settings.
    #[serde(default)]
    pub clustering: ClusteringSettings,

    /// Timelapse playback settings.
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Backend analytics API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Gateway HTTP server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MonitorConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for deployment wiring:
    /// - `SEISMON_STREAM_URL` overrides `stream.url`
    /// - `SEISMON_API_URL` overrides `api.base_url`
    /// - `SEISMON_GATEWAY_PORT` overrides `gateway.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Override deployment wiring with environment variables when set.
    ///
    /// This allows Docker Compose (or any deployment) to point the monitor
    /// at its services without modifying the YAML config file. A
    /// non-numeric `SEISMON_GATEWAY_PORT` is ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SEISMON_STREAM_URL") {
            self.stream.url = val;
        }
        if let Ok(val) = std::env::var("SEISMON_API_URL") {
            self.api.base_url = val;
        }
        if let Ok(val) = std::env::var("SEISMON_GATEWAY_PORT") {
            if let Ok(port) = val.parse() {
                self.gateway.port = port;
            }
        }
    }
}

/// Upstream event stream configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StreamConfig {
    /// Source of live events.
    #[serde(default)]
    pub mode: StreamMode,

    /// WebSocket endpoint for `websocket` mode.
    #[serde(default = "default_stream_url")]
    pub url: String,

    /// Milliseconds between generated events in `simulator` mode.
    #[serde(default = "default_simulator_interval_ms")]
    pub simulator_interval_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            mode: StreamMode::default(),
            url: default_stream_url(),
            simulator_interval_ms: default_simulator_interval_ms(),
        }
    }
}

/// Which event source the monitor runs against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamMode {
    /// Connect to the configured WebSocket endpoint.
    #[default]
    Websocket,
    /// Generate synthetic events locally.
    Simulator,
}

/// Live buffer capacities.
///
/// The observed production caps differed per consumer (map 150, feed 50,
/// alert history 25); they are independent knobs here rather than one
/// shared constant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Maximum events held in the live store.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Maximum events returned in the newest-first feed view.
    #[serde(default = "default_feed_capacity")]
    pub feed_capacity: usize,

    /// Maximum alerts held in the alert history.
    #[serde(default = "default_alert_capacity")]
    pub alert_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            feed_capacity: default_feed_capacity(),
            alert_capacity: default_alert_capacity(),
        }
    }
}

/// Grid and server clustering settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClusteringSettings {
    /// Angular size of a grid cell in degrees.
    #[serde(default = "default_cell_size_deg")]
    pub cell_size_deg: f64,

    /// Defaults forwarded to the backend clustering engine.
    #[serde(default)]
    pub server: ClusteringConfig,

    /// Poll attempts after a clustering config change.
    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,

    /// Milliseconds between poll attempts.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Milliseconds before the first poll attempt.
    #[serde(default = "default_poll_initial_delay_ms")]
    pub poll_initial_delay_ms: u64,
}

impl Default for ClusteringSettings {
    fn default() -> Self {
        Self {
            cell_size_deg: default_cell_size_deg(),
            server: ClusteringConfig::default(),
            poll_attempts: default_poll_attempts(),
            poll_interval_ms: default_poll_interval_ms(),
            poll_initial_delay_ms: default_poll_initial_delay_ms(),
        }
    }
}

/// Timelapse playback settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaybackConfig {
    /// Initial interval between cursor advances in milliseconds.
    #[serde(default = "default_speed_ms")]
    pub default_speed_ms: u64,

    /// Speed presets offered to the UI, fastest last.
    #[serde(default = "default_speed_presets_ms")]
    pub speed_presets_ms: Vec<u64>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            default_speed_ms: default_speed_ms(),
            speed_presets_ms: default_speed_presets_ms(),
        }
    }
}

/// Backend analytics API configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the analytics backend. Empty disables backend features.
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// Request timeout in milliseconds.
    #[serde(default = "default_api_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            request_timeout_ms: default_api_timeout_ms(),
        }
    }
}

/// Gateway HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayConfig {
    /// Bind address.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_stream_url() -> String {
    "ws://localhost:8000/ws".to_owned()
}

const fn default_simulator_interval_ms() -> u64 {
    2_000
}

const fn default_capacity() -> usize {
    150
}

const fn default_feed_capacity() -> usize {
    50
}

const fn default_alert_capacity() -> usize {
    25
}

const fn default_cell_size_deg() -> f64 {
    0.5
}

const fn default_poll_attempts() -> u32 {
    5
}

const fn default_poll_interval_ms() -> u64 {
    1_500
}

const fn default_poll_initial_delay_ms() -> u64 {
    1_000
}

const fn default_speed_ms() -> u64 {
    500
}

fn default_speed_presets_ms() -> Vec<u64> {
    vec![1_000, 500, 250, 125]
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_owned()
}

const fn default_api_timeout_ms() -> u64 {
    10_000
}

fn default_gateway_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_gateway_port() -> u16 {
    8090
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_observed_values() {
        let config = MonitorConfig::default();
        assert_eq!(config.store.capacity, 150);
        assert_eq!(config.store.feed_capacity, 50);
        assert_eq!(config.store.alert_capacity, 25);
        assert!((config.clustering.cell_size_deg - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.clustering.poll_attempts, 5);
        assert_eq!(config.clustering.poll_interval_ms, 1_500);
        assert_eq!(config.clustering.poll_initial_delay_ms, 1_000);
        assert_eq!(config.playback.speed_presets_ms, vec![1_000, 500, 250, 125]);
        assert_eq!(config.stream.mode, StreamMode::Websocket);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
stream:
  mode: simulator
  url: "ws://feed.example:9000/ws"
  simulator_interval_ms: 250

store:
  capacity: 300
  feed_capacity: 100
  alert_capacity: 40

clustering:
  cell_size_deg: 1.0
  server:
    eps_km: 50.0
    time_window_hours: 48.0
    min_samples: 5
  poll_attempts: 3
  poll_interval_ms: 2000
  poll_initial_delay_ms: 500

playback:
  default_speed_ms: 250
  speed_presets_ms: [2000, 1000, 500]

api:
  base_url: "http://backend.example:8000"
  request_timeout_ms: 5000

gateway:
  host: "127.0.0.1"
  port: 9090

logging:
  level: "debug"
"#;

        let config = MonitorConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_else(MonitorConfig::default);

        assert_eq!(config.stream.mode, StreamMode::Simulator);
        assert_eq!(config.store.capacity, 300);
        assert_eq!(config.clustering.server.min_samples, 5);
        assert_eq!(config.playback.speed_presets_ms, vec![2_000, 1_000, 500]);
        assert_eq!(config.gateway.port, 9090);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = r#"
store:
  capacity: 10
"#;
        let config = MonitorConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_else(MonitorConfig::default);

        assert_eq!(config.store.capacity, 10);
        assert_eq!(config.store.feed_capacity, 50);
        assert_eq!(config.gateway.port, default_gateway_port());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = MonitorConfig::parse("stream: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }
}
