//! Configuration management for Postdeck

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Environment variable pointing at an explicit config file
pub const CONFIG_ENV: &str = "POSTDECK_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub composer: ComposerSettings,
    pub sink: SinkSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerSettings {
    /// Maximum number of items in the master media list
    pub media_capacity: usize,
    /// Display-only caption length threshold
    pub caption_soft_limit: usize,
    /// Time an unset schedule time reads as, "HH:MM"
    #[serde(with = "hour_minute")]
    pub default_post_time: NaiveTime,
    /// How long an "applied to all" acknowledgment stays visible
    pub applied_ack_ms: u64,
    /// Reject auto-post mode for unconnected platforms when it is set,
    /// instead of only overriding it on read
    pub enforce_reminder_only_on_write: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkSettings {
    /// Simulated latency of the console sink
    pub delay_ms: u64,
}

pub fn default_post_time() -> NaiveTime {
    NaiveTime::from_hms_opt(11, 30, 0).unwrap_or(NaiveTime::MIN)
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self {
            media_capacity: 20,
            caption_soft_limit: 280,
            default_post_time: default_post_time(),
            applied_ack_ms: 2000,
            enforce_reminder_only_on_write: false,
        }
    }
}

impl ComposerSettings {
    pub fn applied_ack_window(&self) -> Duration {
        Duration::from_millis(self.applied_ack_ms)
    }
}

impl Default for SinkSettings {
    fn default() -> Self {
        Self { delay_ms: 1000 }
    }
}

impl SinkSettings {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Config {
    /// Load configuration from the default location
    ///
    /// A missing file at the default location yields the defaults. A file
    /// named through `POSTDECK_CONFIG` has to exist.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if std::env::var_os(CONFIG_ENV).is_none() && !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.composer.media_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "composer.media_capacity".to_string(),
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        if self.composer.caption_soft_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "composer.caption_soft_limit".to_string(),
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("postdeck").join("config.toml"))
}

mod hour_minute {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(|e| serde::de::Error::custom(format!("invalid time '{}': {}", raw, e)))
    }
}
