// config.rs

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

const APP_NAME: &str = "mount_console";
const CONFIG_FILE_NAME: &str = "config.json";

fn default_tick_ms() -> u64 {
    50
}

pub fn default_config_path() -> PathBuf {
    let mut dir = dirs_next::config_dir().unwrap_or_else(|| {
        dirs_next::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
    });
    dir.push(APP_NAME);
    dir.push(CONFIG_FILE_NAME);
    dir
}

pub fn default_log_dir() -> PathBuf {
    let mut dir = dirs_next::data_local_dir().unwrap_or_else(|| {
        dirs_next::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".local")
            .join("share")
    });
    dir.push(APP_NAME);
    dir
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("slew rate must be a positive number of degrees per second, got {0}")]
    InvalidSlewRate(f64),
}

/// Which mount the console drives.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MountBackend {
    /// In-memory mount that slews at a fixed rate.
    Simulated { slew_rate_deg_per_sec: f64 },
    /// A mount driver on an INDI server, e.g. `localhost:7624`.
    Indi {
        address: String,
        #[serde(default)]
        device: Option<String>,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub mount: MountBackend,
    /// JSON catalog body; the compiled-in catalog is used when absent.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    /// UI polling period.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mount: MountBackend::Simulated {
                slew_rate_deg_per_sec: 4.0,
            },
            catalog_path: None,
            tick_ms: default_tick_ms(),
            log_dir: None,
        }
    }
}

impl Config {
    /// Load from the default location, or return default if missing
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Self::load_from(&default_config_path())
    }

    /// Load from `path`, or return default if missing
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let raw = fs::read_to_string(path)?;
            let cfg: Config = serde_json::from_str(&raw)?;
            cfg.validate()?;
            Ok(cfg)
        } else {
            Ok(Config::default())
        }
    }

    /// Save current config to `path`, creating its directory
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(path, serialized)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self.mount {
            MountBackend::Simulated {
                slew_rate_deg_per_sec: rate,
            } if !(rate.is_finite() && rate > 0.0) => Err(ConfigError::InvalidSlewRate(rate)),
            _ => Ok(()),
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(default_log_dir)
    }
}
