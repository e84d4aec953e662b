use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::model::Coordinate;

/// Provider endpoint and request settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL without trailing slash, e.g. "https://api.open-meteo.com/v1".
    pub base_url: String,
    pub timeout_secs: u64,
    /// Forecast horizon in days (1-16).
    pub forecast_days: u8,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.open-meteo.com/v1".to_string(),
            timeout_secs: 10,
            forecast_days: 3,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 3600 }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> chrono::Duration {
        // chrono caps durations at i64::MAX milliseconds
        let secs = self.ttl_secs.min(i64::MAX as u64 / 1000) as i64;
        chrono::Duration::seconds(secs)
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// [api]
/// timeout_secs = 10
///
/// [location]
/// latitude = 37.5665
/// longitude = 126.978
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    /// Location used when none is given on the command line.
    pub location: Coordinate,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            cache: CacheConfig::default(),
            location: Coordinate::SEOUL,
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "meteo-dash", "meteo")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    fn validate(&self) -> Result<()> {
        if self.api.timeout_secs == 0 {
            return Err(anyhow!("api.timeout_secs must be greater than zero"));
        }
        if !(1..=16).contains(&self.api.forecast_days) {
            return Err(anyhow!(
                "api.forecast_days must be between 1 and 16, got {}",
                self.api.forecast_days
            ));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(anyhow!("api.base_url must not be empty"));
        }
        if self.cache.ttl_secs == 0 {
            return Err(anyhow!("cache.ttl_secs must be greater than zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard() {
        let cfg = Config::default();
        assert_eq!(cfg.api.base_url, "https://api.open-meteo.com/v1");
        assert_eq!(cfg.api.timeout_secs, 10);
        assert_eq!(cfg.api.forecast_days, 3);
        assert_eq!(cfg.cache.ttl_secs, 3600);
        assert_eq!(cfg.cache.ttl(), chrono::Duration::hours(1));
        assert_eq!(cfg.location.latitude(), 37.5665);
        assert_eq!(cfg.location.longitude(), 126.978);
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = Config::from_toml("").expect("empty config should parse");
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = Config::from_toml(
            r#"
            [cache]
            ttl_secs = 120

            [location]
            latitude = 52.52
            longitude = 13.405
            "#,
        )
        .expect("config should parse");

        assert_eq!(cfg.cache.ttl_secs, 120);
        assert_eq!(cfg.api.timeout_secs, 10);
        assert_eq!(cfg.location.latitude(), 52.52);
    }

    #[test]
    fn rejects_bad_values() {
        let err = Config::from_toml("[api]\nforecast_days = 30\n").unwrap_err();
        assert!(err.to_string().contains("forecast_days"));

        let err = Config::from_toml("[api]\ntimeout_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));

        let err = Config::from_toml("[cache]\nttl_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("ttl_secs"));
        assert!(Config::from_toml("[cache]\nttl_secs = 1\n").is_ok());

        assert!(Config::from_toml("[location]\nlatitude = 95.0\nlongitude = 0.0\n").is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.cache.ttl_secs = 60;
        cfg.location = Coordinate::new(-33.8688, 151.2093).unwrap();
        cfg.save_to(&path).expect("save should succeed");

        let loaded = Config::load_from(&path).expect("load should succeed");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).expect("missing file is not an error");
        assert_eq!(cfg, Config::default());
    }
}
