use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub detection: DetectionConfig,
    pub alert: AlertConfig,
}

/// Tunables of the debounce/hysteresis engine and the escalation gate.
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Minimum detected eyes for a face to count as awake.
    pub min_eyes_open: u32,
    /// How long eyes must stay closed before the state flips to drowsy.
    pub drowsy_threshold_secs: f64,
    /// Cadence of the periodic status sync.
    pub heartbeat_interval_secs: f64,
    /// Escalation fires only past this many cumulative drowsy events.
    pub escalation_base: u64,
    /// Re-escalate every this many events past the base.
    pub escalation_period: u64,
    /// Depth of the sample channel between acquisition and the loop.
    pub sample_queue_depth: usize,
}

#[derive(Debug, Clone)]
pub struct AlertConfig {
    pub sync_url: String,
    pub sos_url: String,
    pub sync_timeout_ms: u64,
    pub sos_timeout_ms: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("{name} must be at least 1")]
    Zero { name: &'static str },
    #[error("invalid {name} '{value}': {reason}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        reason: String,
    },
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 5001_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            detection: DetectionConfig {
                min_eyes_open: env_or_parse("MIN_EYES_OPEN", 1_u32),
                drowsy_threshold_secs: env_or_parse("DROWSY_THRESHOLD_SECS", 1.5_f64),
                heartbeat_interval_secs: env_or_parse("HEARTBEAT_INTERVAL_SECS", 2.0_f64),
                escalation_base: env_or_parse("ESCALATION_BASE", 10_u64),
                escalation_period: env_or_parse("ESCALATION_PERIOD", 5_u64),
                sample_queue_depth: env_or_parse("SAMPLE_QUEUE_DEPTH", 32_usize),
            },
            alert: AlertConfig {
                sync_url: env_or("SYNC_URL", "http://localhost:5000/api/drowsiness"),
                sos_url: env_or("SOS_URL", "http://localhost:5000/api/sos"),
                sync_timeout_ms: env_or_parse("SYNC_TIMEOUT_MS", 100_u64),
                sos_timeout_ms: env_or_parse("SOS_TIMEOUT_MS", 1000_u64),
            },
        }
    }

    /// Misconfiguration is fatal at startup, never during the loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.detection;
        if d.drowsy_threshold_secs <= 0.0 {
            return Err(ConfigError::NonPositive {
                name: "DROWSY_THRESHOLD_SECS",
                value: d.drowsy_threshold_secs,
            });
        }
        if d.heartbeat_interval_secs <= 0.0 {
            return Err(ConfigError::NonPositive {
                name: "HEARTBEAT_INTERVAL_SECS",
                value: d.heartbeat_interval_secs,
            });
        }
        if d.escalation_period == 0 {
            return Err(ConfigError::Zero {
                name: "ESCALATION_PERIOD",
            });
        }
        if d.sample_queue_depth == 0 {
            return Err(ConfigError::Zero {
                name: "SAMPLE_QUEUE_DEPTH",
            });
        }
        if self.alert.sync_timeout_ms == 0 {
            return Err(ConfigError::Zero {
                name: "SYNC_TIMEOUT_MS",
            });
        }
        if self.alert.sos_timeout_ms == 0 {
            return Err(ConfigError::Zero {
                name: "SOS_TIMEOUT_MS",
            });
        }
        check_url("SYNC_URL", &self.alert.sync_url)?;
        check_url("SOS_URL", &self.alert.sos_url)?;
        Ok(())
    }
}

impl DetectionConfig {
    pub fn drowsy_threshold(&self) -> Duration {
        Duration::from_secs_f64(self.drowsy_threshold_secs)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs_f64(self.heartbeat_interval_secs)
    }
}

fn check_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
    reqwest::Url::parse(value)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidUrl {
            name,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
