use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::rig_monitor::AlertConfig;

/// Persistent rigmon configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    /// Poll tick period in milliseconds (~30 Hz by default)
    pub poll_interval_ms: u64,
    pub alerts: AlertConfig,
    pub alarm: AlarmConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            poll_interval_ms: 33,
            alerts: AlertConfig::default(),
            alarm: AlarmConfig::default(),
        }
    }
}

/// Where the sensor store lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub db: i64,
    pub connect_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            db: 0,
            connect_timeout_ms: 2000,
        }
    }
}

impl StoreConfig {
    pub fn url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }
}

/// Audible alarm timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmConfig {
    /// Pause between two chimes while an alert is unacknowledged
    pub repeat_interval_ms: u64,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            repeat_interval_ms: 1000,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let data = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        if data.trim().is_empty() {
            return Ok(Config::default());
        }

        match serde_json::from_str::<Config>(&data) {
            Ok(config) => Ok(config.sanitized()),
            Err(e) => {
                // A broken file must not keep the monitor from starting
                log::warn!(
                    "Ignoring unreadable config file {:?}: {}; using defaults",
                    config_path,
                    e
                );
                Ok(Config::default())
            }
        }
    }

    /// Replace intervals of zero, which `set_value` would have refused,
    /// with their defaults
    fn sanitized(mut self) -> Self {
        let defaults = Config::default();
        let checks: [(&str, &mut u64, u64); 3] = [
            (
                "poll_interval_ms",
                &mut self.poll_interval_ms,
                defaults.poll_interval_ms,
            ),
            (
                "alarm.repeat_interval_ms",
                &mut self.alarm.repeat_interval_ms,
                defaults.alarm.repeat_interval_ms,
            ),
            (
                "store.connect_timeout_ms",
                &mut self.store.connect_timeout_ms,
                defaults.store.connect_timeout_ms,
            ),
        ];

        for (key, value, default) in checks {
            if *value == 0 {
                log::warn!("Config {} must be greater than 0; using {}", key, default);
                *value = default;
            }
        }
        self
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, data)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("rigmon").join("config.json"))
    }

    /// Default location of the dashboard log file
    pub fn get_log_path() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir().with_context(|| "Could not determine cache directory")?;

        Ok(cache_dir.join("rigmon").join("rigmon.log"))
    }

    /// Names accepted by [`Config::set_value`]
    pub const KEYS: &'static [&'static str] = &[
        "store.host",
        "store.port",
        "store.db",
        "store.connect_timeout_ms",
        "poll_interval_ms",
        "alerts.max_temperature",
        "alerts.max_pressure",
        "alerts.min_stall_pressure",
        "alerts.stall_speed_threshold",
        "alerts.max_screwjack_travel",
        "alarm.repeat_interval_ms",
    ];

    /// Set a single value addressed by a dotted key, e.g. `alerts.max_pressure`
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "store.host" => {
                if value.trim().is_empty() {
                    bail!("store.host cannot be empty");
                }
                self.store.host = value.trim().to_string();
            }
            "store.port" => self.store.port = parse_value(key, value)?,
            "store.db" => self.store.db = parse_value(key, value)?,
            "store.connect_timeout_ms" => {
                self.store.connect_timeout_ms = parse_positive(key, value)?
            }
            "poll_interval_ms" => self.poll_interval_ms = parse_positive(key, value)?,
            "alerts.max_temperature" => self.alerts.max_temperature = parse_value(key, value)?,
            "alerts.max_pressure" => self.alerts.max_pressure = parse_value(key, value)?,
            "alerts.min_stall_pressure" => {
                self.alerts.min_stall_pressure = parse_value(key, value)?
            }
            "alerts.stall_speed_threshold" => {
                self.alerts.stall_speed_threshold = parse_value(key, value)?
            }
            "alerts.max_screwjack_travel" => {
                self.alerts.max_screwjack_travel = parse_value(key, value)?
            }
            "alarm.repeat_interval_ms" => {
                self.alarm.repeat_interval_ms = parse_positive(key, value)?
            }
            _ => bail!(
                "Unknown config key '{}'. Valid keys: {}",
                key,
                Self::KEYS.join(", ")
            ),
        }
        Ok(())
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("Invalid value '{}' for {}: {}", value, key, e))
}

fn parse_positive(key: &str, value: &str) -> Result<u64> {
    let parsed: u64 = parse_value(key, value)?;
    if parsed == 0 {
        bail!("{} must be greater than zero", key);
    }
    Ok(parsed)
}
