use std::path::{Path, PathBuf};

use config::{Config, ConfigBuilder, Environment, File as ConfigFile, FileFormat, builder::DefaultState};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::models::Mode;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_CONFIG: &str = include_str!("../config.toml");

const ENV_PREFIX: &str = "INFORM";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("could not determine a home directory for the current user")]
    NoHome,

    #[error("failed to load settings: {0}")]
    Config(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Logs {
    pub enabled: bool,
    pub dir: String,
    pub level: LogLevel,
    pub retention_days: u64,
}

impl Logs {
    /// Base name of the chat log file; the appender adds a date suffix.
    pub const FILE: &'static str = "chat.log";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub api_base: String,
    pub default_mode: Mode,
    pub logs: Logs,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "inform")
}

/// Directory holding `config.toml`. `INFORM_CONFIG_DIR` takes precedence.
pub fn config_dir() -> Result<PathBuf, SettingsError> {
    if let Ok(dir) = std::env::var("INFORM_CONFIG_DIR") {
        return Ok(PathBuf::from(dir));
    }

    project_dirs()
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(SettingsError::NoHome)
}

fn default_log_dir() -> String {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
        .to_string_lossy()
        .into_owned()
}

impl Settings {
    /// Builder preloaded with every default. Callers add sources or
    /// overrides on top; tests use this to avoid touching the user's config.
    pub fn builder() -> Result<ConfigBuilder<DefaultState>, SettingsError> {
        Ok(Config::builder()
            .set_default("api_base", DEFAULT_API_BASE)?
            .set_default("default_mode", Mode::default().as_str())?
            .set_default("logs.enabled", true)?
            .set_default("logs.dir", default_log_dir())?
            .set_default("logs.level", LogLevel::default().as_directive())?
            .set_default("logs.retention_days", 4)?)
    }

    /// Load defaults, then `config.toml` from the config directory, then
    /// `INFORM_*` environment variables.
    pub fn new() -> Result<Self, SettingsError> {
        let config_file = config_dir()?.join("config.toml");
        Self::load_from(&config_file)
    }

    pub fn load_from(config_file: &Path) -> Result<Self, SettingsError> {
        tracing::debug!(path = %config_file.display(), "loading settings");

        let settings = Self::builder()?
            .add_source(ConfigFile::from(config_file).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            default_mode: Mode::default(),
            logs: Logs {
                enabled: true,
                dir: default_log_dir(),
                level: LogLevel::default(),
                retention_days: 4,
            },
        }
    }
}
