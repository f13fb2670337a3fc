use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::model::Coordinate;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// base_url = "http://127.0.0.1:5000"
/// debounce_ms = 400
///
/// [default_location]
/// lat = 28.6139
/// lon = 77.209
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend origin; endpoint paths (`/api/...`) are appended to it.
    pub base_url: String,
    pub timeout_secs: u64,
    /// Quiet period after the last keystroke before a search runs.
    pub debounce_ms: u64,
    /// How long the dashboard waits for its API handle before disabling itself.
    pub ready_timeout_ms: u64,
    pub default_location: Option<Coordinate>,
    /// Where exported files land; current directory when unset.
    pub download_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 20,
            debounce_ms: 400,
            ready_timeout_ms: 5000,
            default_location: None,
            download_dir: None,
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub fn start_location(&self) -> Coordinate {
        self.default_location.unwrap_or_default()
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Check values that would otherwise only fail at request time.
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base_url '{}'", self.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow!(
                "Invalid base_url '{}': scheme must be http or https",
                self.base_url
            ));
        }
        if let Some(loc) = &self.default_location {
            loc.validate().context("Invalid default_location")?;
        }
        Ok(())
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file yet.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
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
        let dirs = ProjectDirs::from("dev", "cropdash", "cropdash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
