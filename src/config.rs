use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use crate::bkt::BktParameters;
use crate::error::Result;

pub const CONFIG_ENV: &str = "QUIZTRACE_CONFIG";
const APP_DIR: &str = "quiztrace";
const DEFAULT_CONFIG_NAME: &str = "config.json";
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bkt: BktParameters,
    pub log_level: String,
    /// File the values were read from; `None` when running on defaults
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bkt: BktParameters::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            source: None,
        }
    }
}

impl Config {
    /// Loads from `$QUIZTRACE_CONFIG`, else the per-user config file if it
    /// exists, else defaults.
    ///
    /// A file named by the environment variable must exist; the per-user file
    /// is optional.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_file(path);
        }

        let path = app_dir().join(DEFAULT_CONFIG_NAME);
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.bkt.validate()
    }
}

/// Where the config file is looked up, for display.
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    app_dir().join(DEFAULT_CONFIG_NAME)
}

pub fn app_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

pub fn log_dir() -> PathBuf {
    app_dir().join("logs")
}
