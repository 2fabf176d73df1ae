/// Configuration management for the marketplace client
///
/// Holds the catalog URLs, the local vsix directories, the prerelease switch
/// and install settings, persisted as TOML.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::PkgError;

pub type ConfigError = PkgError;

fn config_msg(message: impl Into<String>) -> ConfigError {
    PkgError::Config(message.into())
}

/// User configuration for the marketplace client
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarketConfig {
    /// Catalog base URLs; only the first one is queried
    #[serde(default)]
    pub api_sources: Vec<String>,

    /// Directories scanned for `.vsix` archives
    #[serde(default)]
    pub directory_sources: Vec<PathBuf>,

    /// Ask catalogs for pre-release versions
    #[serde(default)]
    pub prerelease: bool,

    /// Install settings
    #[serde(default)]
    pub install: InstallSettings,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallSettings {
    /// Command receiving the artifact path as its last argument
    #[serde(default = "default_install_command")]
    pub command: Vec<String>,

    /// Where artifacts are staged before installation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<PathBuf>,

    /// HTTP timeout in seconds (0 keeps the client default)
    #[serde(default = "default_timeout")]
    pub http_timeout: u64,
}

fn default_install_command() -> Vec<String> {
    vec!["code".to_string(), "--install-extension".to_string()]
}

fn default_timeout() -> u64 {
    30
}

impl Default for InstallSettings {
    fn default() -> Self {
        InstallSettings {
            command: default_install_command(),
            scratch_dir: None,
            http_timeout: default_timeout(),
        }
    }
}

impl MarketConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| config_msg(format!("Failed to read config {}: {}", path.display(), e)))?;

        Self::from_str(&content)
    }

    /// Save configuration to file
    pub fn to_file(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| config_msg(format!("Failed to create config directory: {}", e)))?;
        }

        let content = self.to_string()?;
        std::fs::write(path, content)
            .map_err(|e| config_msg(format!("Failed to write config: {}", e)))
    }

    /// Parse TOML from string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| config_msg(format!("Invalid config format: {}", e)))
    }

    /// Serialize to TOML string
    pub fn to_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| config_msg(format!("Failed to serialize: {}", e)))
    }

    /// The catalog that gets queried, if any
    pub fn primary_api_source(&self) -> Option<&str> {
        self.api_sources
            .iter()
            .map(|url| url.trim())
            .find(|url| !url.is_empty())
    }

    /// Add a catalog URL; returns `false` when it is already configured
    pub fn add_api_source(&mut self, url: &str) -> bool {
        let url = url.trim();
        if url.is_empty() || self.api_sources.iter().any(|existing| existing == url) {
            return false;
        }
        self.api_sources.push(url.to_string());
        true
    }

    /// Add a vsix directory; returns `false` when it is already configured
    pub fn add_directory_source(&mut self, dir: &Path) -> bool {
        if dir.as_os_str().is_empty() || self.directory_sources.iter().any(|existing| existing == dir) {
            return false;
        }
        self.directory_sources.push(dir.to_path_buf());
        true
    }

    /// Flip the prerelease switch and return the new value
    pub fn toggle_prerelease(&mut self) -> bool {
        self.prerelease = !self.prerelease;
        self.prerelease
    }

    /// Scratch directory for staged artifacts
    pub fn scratch_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.install.scratch_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(get_config_dir()?.join("temp")),
        }
    }
}

/// Configuration file manager
pub struct ConfigManager {
    config_path: PathBuf,
    config: MarketConfig,
}

impl ConfigManager {
    /// Load the file at `config_path`, or start from defaults when it does
    /// not exist yet
    pub fn load(config_path: PathBuf) -> Result<Self, ConfigError> {
        let config = if config_path.exists() {
            MarketConfig::from_file(&config_path)?
        } else {
            tracing::debug!("no config at {}, using defaults", config_path.display());
            MarketConfig::default()
        };

        Ok(ConfigManager {
            config_path,
            config,
        })
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut MarketConfig {
        &mut self.config
    }

    /// Save changes to file
    pub fn save(&self) -> Result<(), ConfigError> {
        self.config.to_file(&self.config_path)
    }

    /// Reload configuration from file
    pub fn reload(&mut self) -> Result<(), ConfigError> {
        self.config = MarketConfig::from_file(&self.config_path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

/// Get standard config directory
pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| config_msg("Cannot determine home directory"))?;

    Ok(PathBuf::from(home).join(".mymarket"))
}

/// Get standard config file path
pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    Ok(get_config_dir()?.join("config.toml"))
}
