use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ConnectionProfile;

pub const CURRENT_VERSION: u32 = 1;
pub const LOCAL_CONFIG_FILE: &str = "seedload.toml";
const CONFIG_DIR_NAME: &str = "seedload";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config format in {path}: {message}")]
    InvalidFormat { path: PathBuf, message: String },
    #[error("Config version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSection {
    /// Validated when the loader is built, so a bad value surfaces as a load error.
    pub batch_size: i64,
    pub timeout_secs: u64,
    pub mysql_bin: String,
}

impl Default for LoaderSection {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            timeout_secs: 30,
            mysql_bin: "mysql".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,
    pub connection: ConnectionProfile,
    pub loader: LoaderSection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            connection: ConnectionProfile::default(),
            loader: LoaderSection::default(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: AppConfig =
            toml::from_str(content).map_err(|e| ConfigError::InvalidFormat {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if config.version != CURRENT_VERSION {
            return Err(ConfigError::VersionMismatch {
                found: config.version,
                expected: CURRENT_VERSION,
            });
        }
        Ok(config)
    }

    /// An explicit path must exist. Otherwise the first existing candidate wins,
    /// and with none present the built-in defaults apply.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::resolve_from(explicit, &default_search_paths())
    }

    pub fn resolve_from(explicit: Option<&Path>, candidates: &[PathBuf]) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load(path);
        }

        match candidates.iter().find(|p| p.is_file()) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn with_password_override(mut self, password: Option<String>) -> Self {
        if let Some(password) = password {
            self.connection.password = password;
        }
        self
    }

    pub fn to_profile(&self) -> ConnectionProfile {
        self.connection.clone()
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// `./seedload.toml`, then the per-user config file.
pub fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    paths.extend(user_config_path());
    paths
}
