use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("trail capacity must be at least 1")]
    ZeroTrailCapacity,
    #[error("trail min_opacity must be within [0, 1], got {0}")]
    OpacityOutOfRange(f64),
    #[error("egress timeout must be non-zero")]
    ZeroEgressTimeout,
    #[error("cycle tick period must be non-zero")]
    ZeroTickPeriod,
    #[error("max_datagrams_per_tick must be at least 1")]
    ZeroDrainLimit,
    #[error("receive buffer must be at least {min} bytes, got {got}")]
    ReceiveBufferTooSmall { min: usize, got: usize },
}

/// Smallest receive buffer accepted; a telemetry line never comes close.
pub const MIN_RECV_BUFFER_BYTES: usize = 64;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// UDP telemetry ingress.
    pub telemetry: TelemetryConfig,
    /// Planetarium viewer forwarding.
    pub egress: EgressConfig,
    /// Pointing trail history.
    pub trail: TrailConfig,
    /// Update cycle timing.
    pub cycle: CycleConfig,
    /// Display thresholds handed to the presentation layer.
    pub display: DisplayConfig,
}

impl AppConfig {
    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trail.capacity == 0 {
            return Err(ConfigError::ZeroTrailCapacity);
        }
        if !(0.0..=1.0).contains(&self.trail.min_opacity) {
            return Err(ConfigError::OpacityOutOfRange(self.trail.min_opacity));
        }
        if self.egress.timeout_ms == 0 {
            return Err(ConfigError::ZeroEgressTimeout);
        }
        if self.cycle.tick_ms == 0 {
            return Err(ConfigError::ZeroTickPeriod);
        }
        if self.telemetry.max_datagrams_per_tick == 0 {
            return Err(ConfigError::ZeroDrainLimit);
        }
        if self.telemetry.recv_buffer_bytes < MIN_RECV_BUFFER_BYTES {
            return Err(ConfigError::ReceiveBufferTooSmall {
                min: MIN_RECV_BUFFER_BYTES,
                got: self.telemetry.recv_buffer_bytes,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Local address to bind. "0.0.0.0" listens on all interfaces.
    pub bind_addr: String,
    /// Local UDP port.
    pub port: u16,
    /// Size of the datagram receive buffer.
    pub recv_buffer_bytes: usize,
    /// Upper bound on datagrams drained in a single tick.
    pub max_datagrams_per_tick: usize,
    /// Feed the listener from the built-in sweep simulator instead of a real mount.
    pub simulate: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 5005,
            recv_buffer_bytes: 1024,
            max_datagrams_per_tick: 32,
            simulate: false,
        }
    }
}

impl TelemetryConfig {
    /// "addr:port" string suitable for binding.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EgressConfig {
    /// Disable to run without a planetarium viewer.
    pub enabled: bool,
    /// Full URL of the viewer's view endpoint.
    pub url: String,
    /// Per-request timeout.
    pub timeout_ms: u64,
    /// Field of view sent with every update, in degrees.
    pub fov_deg: f64,
}

impl Default for EgressConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "http://localhost:8090/api/main/view".to_string(),
            timeout_ms: 200,
            fov_deg: 60.0,
        }
    }
}

impl EgressConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    /// Maximum number of tip positions retained.
    pub capacity: usize,
    /// Opacity of the oldest retained point.
    pub min_opacity: f64,
    /// Distance from the mount origin to the receiver tip along the boresight.
    pub tip_length: f64,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            capacity: 200,
            min_opacity: 0.05,
            tip_length: 0.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Update period in milliseconds (16 ms is roughly 60 Hz).
    pub tick_ms: u64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self { tick_ms: 16 }
    }
}

impl CycleConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Altitudes below this many degrees are flagged on the HUD.
    pub altitude_warning_deg: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            altitude_warning_deg: 15.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_mount_setup() {
        let config = AppConfig::default();
        assert_eq!(config.telemetry.socket_addr(), "0.0.0.0:5005");
        assert_eq!(config.egress.url, "http://localhost:8090/api/main/view");
        assert_eq!(config.egress.timeout(), Duration::from_millis(200));
        assert_eq!(config.trail.capacity, 200);
        assert_eq!(config.cycle.period(), Duration::from_millis(16));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [telemetry]
            port = 6000

            [egress]
            enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(config.telemetry.port, 6000);
        assert_eq!(config.telemetry.bind_addr, "0.0.0.0");
        assert!(!config.egress.enabled);
        assert_eq!(config.egress.fov_deg, 60.0);
        assert_eq!(config.display.altitude_warning_deg, 15.0);
    }

    #[test]
    fn validation_catches_unusable_values() {
        let mut config = AppConfig::default();
        config.trail.min_opacity = 1.5;
        assert_eq!(config.validate(), Err(ConfigError::OpacityOutOfRange(1.5)));

        let mut config = AppConfig::default();
        config.cycle.tick_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTickPeriod));

        let mut config = AppConfig::default();
        config.telemetry.recv_buffer_bytes = 8;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ReceiveBufferTooSmall { min: 64, got: 8 })
        );
    }
}
