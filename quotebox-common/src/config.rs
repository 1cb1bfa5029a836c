//! Configuration loading and resolution
//!
//! Every value resolves in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable config file never stops startup; it is reported
//! and the remaining sources are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const ENV_CONFIG: &str = "QUOTEBOX_CONFIG";
pub const ENV_DATABASE: &str = "QUOTEBOX_DATABASE";
pub const ENV_BIND: &str = "QUOTEBOX_BIND";
pub const ENV_STAFF_PASSWORD: &str = "QUOTEBOX_STAFF_PASSWORD";
pub const ENV_PUBLIC_BASE_URL: &str = "QUOTEBOX_PUBLIC_BASE_URL";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlConfig {
    pub database_path: Option<PathBuf>,
    pub bind_addr: Option<String>,
    pub staff_password: Option<String>,
    pub public_base_url: Option<String>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub bind: Option<String>,
    pub staff_password: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub database_path: PathBuf,
    pub bind_addr: String,
    pub staff_password: Option<String>,
    pub public_base_url: Option<String>,
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            staff_password: None,
            public_base_url: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Resolve from CLI, environment, TOML file and defaults
    ///
    /// Also reports what happened to the config file, so the caller can log
    /// it once tracing is up.
    pub fn resolve(cli: &CliOverrides) -> (Self, ConfigFile) {
        let (toml, file) = load_config_file(cli);
        (Self::merge(cli, &toml), file)
    }

    /// Combine CLI, environment and an already-loaded TOML config
    pub fn merge(cli: &CliOverrides, toml: &TomlConfig) -> Self {
        let database_path = cli
            .database
            .clone()
            .or_else(|| env_value(ENV_DATABASE).map(PathBuf::from))
            .or_else(|| toml.database_path.clone())
            .unwrap_or_else(default_database_path);

        let bind_addr = cli
            .bind
            .clone()
            .or_else(|| env_value(ENV_BIND))
            .or_else(|| toml.bind_addr.clone())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let staff_password = cli
            .staff_password
            .clone()
            .or_else(|| env_value(ENV_STAFF_PASSWORD))
            .or_else(|| toml.staff_password.clone())
            .filter(|p| !p.is_empty());

        let public_base_url = env_value(ENV_PUBLIC_BASE_URL)
            .or_else(|| toml.public_base_url.clone())
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        let log_level = toml
            .log_level
            .clone()
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Self {
            database_path,
            bind_addr,
            staff_password,
            public_base_url,
            log_level,
        }
    }
}

/// Config file location: CLI, then `QUOTEBOX_CONFIG`, then the platform config dir
pub fn config_file_path(cli: &CliOverrides) -> Option<PathBuf> {
    cli.config
        .clone()
        .or_else(|| env_value(ENV_CONFIG).map(PathBuf::from))
        .or_else(default_config_path)
}

/// Outcome of looking for the config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigFile {
    Loaded(PathBuf),
    Missing(PathBuf),
    Invalid { path: PathBuf, error: String },
    /// No platform config directory and no explicit path
    Unavailable,
}

impl ConfigFile {
    /// Log the outcome; a missing or broken file is never fatal
    pub fn log(&self) {
        match self {
            ConfigFile::Loaded(path) => info!("Loaded config from {}", path.display()),
            ConfigFile::Missing(path) => {
                info!("Config file not found at {}; using defaults", path.display())
            }
            ConfigFile::Invalid { path, error } => {
                warn!("Ignoring config file {}: {}", path.display(), error)
            }
            ConfigFile::Unavailable => warn!("No config directory on this platform; using defaults"),
        }
    }
}

/// Read the config file, falling back to an empty config on any problem
pub fn load_config_file(cli: &CliOverrides) -> (TomlConfig, ConfigFile) {
    let Some(path) = config_file_path(cli) else {
        return (TomlConfig::default(), ConfigFile::Unavailable);
    };

    if !path.exists() {
        return (TomlConfig::default(), ConfigFile::Missing(path));
    }

    match TomlConfig::load(&path) {
        Ok(config) => (config, ConfigFile::Loaded(path)),
        Err(e) => (
            TomlConfig::default(),
            ConfigFile::Invalid {
                path,
                error: e.to_string(),
            },
        ),
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// `<config_dir>/quotebox/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("quotebox").join("config.toml"))
}

/// Get OS-dependent default database path
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("quotebox"))
        .unwrap_or_else(|| PathBuf::from("./quotebox_data"))
        .join("quotebox.db")
}
