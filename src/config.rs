use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::ephemeris::{Format, LoadOptions};
use crate::events::SearchConfig;
use crate::frames::Observer;
use crate::time::Zone;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub ephemeris: EphemerisConfig,
    #[serde(default)]
    pub observer: Option<ObserverConfig>,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub time: TimeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EphemerisConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub format: Option<Format>,
    /// Picks one set out of a multi-satellite TLE file.
    #[serde(default)]
    pub norad_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObserverConfig {
    pub name: Option<String>,
    /// `"lat,lon"` in degrees.
    pub coordinates: String,
    #[serde(default)]
    pub elevation_m: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SearchSettings {
    #[serde(flatten)]
    pub finder: SearchConfig,
    #[serde(default = "default_window", deserialize_with = "human_duration")]
    pub window: Duration,
}

fn default_window() -> Duration {
    Duration::from_secs(24 * 3600)
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            finder: SearchConfig::default(),
            window: default_window(),
        }
    }
}

impl SearchSettings {
    pub fn window_hours(&self) -> f64 {
        self.window.as_secs_f64() / 3600.0
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TimeConfig {
    #[serde(default)]
    pub zone: Zone,
}

/// Reads a humantime string such as `90s` or `24h`.
pub(crate) fn human_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    humantime::parse_duration(text.trim()).map_err(serde::de::Error::custom)
}

impl Config {
    /// Loads and validates a config file. A relative ephemeris path is
    /// taken relative to the config file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content)?;
        if config.ephemeris.path.is_relative() {
            if let Some(dir) = path.parent() {
                config.ephemeris.path = dir.join(&config.ephemeris.path);
            }
        }
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.search
            .finder
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.search.window.is_zero() {
            return Err(ConfigError::Invalid("search window must be positive".into()));
        }
        self.observer()?;
        Ok(())
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            format: self.ephemeris.format,
            norad_id: self.ephemeris.norad_id,
        }
    }

    pub fn observer(&self) -> Result<Option<Observer>, ConfigError> {
        let Some(observer) = &self.observer else {
            return Ok(None);
        };
        let parsed = Observer::from_coordinates(&observer.coordinates)
            .and_then(|o| Observer::new(o.latitude_deg, o.longitude_deg, observer.elevation_m));
        parsed.map(Some).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "invalid observer coordinates '{}'",
                observer.coordinates
            ))
        })
    }
}
