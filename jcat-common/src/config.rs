//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "JCAT_CONFIG";

/// Environment variable naming the data root folder
pub const ROOT_FOLDER_ENV_VAR: &str = "JCAT_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "jcat.db";

/// What the count attached to a facet candidate measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMode {
    /// Number of matching videos
    #[default]
    Videos,
    /// Number of distinct artists appearing in the matching videos
    Artists,
}

/// Count aggregation per facet category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CountPolicy {
    pub instrument: CountMode,
    pub artist: CountMode,
    pub duration: CountMode,
    pub video_type: CountMode,
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JcatConfig {
    /// Data folder holding the database; OS default when absent
    pub root_folder: Option<PathBuf>,
    /// Catalog document fetched on first run
    pub bootstrap_url: Option<String>,
    pub bootstrap_timeout_ms: u64,
    pub event_capacity: usize,
    pub counts: CountPolicy,
}

impl Default for JcatConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            bootstrap_url: None,
            bootstrap_timeout_ms: 30_000,
            event_capacity: 100,
            counts: CountPolicy::default(),
        }
    }
}

impl JcatConfig {
    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration with priority:
    /// 1. Explicit path (highest priority)
    /// 2. `JCAT_CONFIG` environment variable
    /// 3. Platform config file
    /// 4. Built-in defaults
    ///
    /// An explicitly named file that cannot be read is an error; a missing
    /// platform file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::from_file(Path::new(&path));
        }

        match platform_config_file() {
            Some(path) => {
                debug!("Using platform config file: {}", path.display());
                Self::from_file(&path)
            }
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Database path inside the resolved root folder
    pub fn database_path(&self, cli_root: Option<&str>) -> PathBuf {
        resolve_root_folder(cli_root, self.root_folder.as_deref()).join(DATABASE_FILE_NAME)
    }

    pub fn bootstrap_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.bootstrap_timeout_ms)
    }
}

/// Root folder resolution priority:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config value
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>, config_value: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV_VAR) {
        return PathBuf::from(path);
    }

    if let Some(path) = config_value {
        return path.to_path_buf();
    }

    default_root_folder()
}

/// Existing platform config file, if any
fn platform_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("jcat").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/jcat/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("jcat"))
        .unwrap_or_else(|| PathBuf::from("./jcat_data"))
}
