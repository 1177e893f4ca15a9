//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::error::TrackerError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// CSV file listing the tracked authors
    #[serde(default = "default_author_list")]
    pub author_list: PathBuf,

    /// Folder holding one known-books JSON file per author
    #[serde(default = "default_authors_folder")]
    pub authors_folder: PathBuf,

    /// Amazon storefront base URL
    #[serde(default = "default_storefront_url")]
    pub storefront_url: String,

    /// Plaintext list of candidate user agents, one per line
    #[serde(default = "default_user_agents_url")]
    pub user_agents_url: String,

    /// Author searched for when probing user agents
    #[serde(default = "default_probe_author")]
    pub probe_author: String,

    /// Pushover messages endpoint
    #[serde(default = "default_pushover_url")]
    pub pushover_url: String,

    /// Pushover user key
    #[serde(default)]
    pub pushover_user: Option<String>,

    /// Pushover application token
    #[serde(default)]
    pub pushover_token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Log verbosity
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_author_list() -> PathBuf {
    PathBuf::from("authors.csv")
}

fn default_authors_folder() -> PathBuf {
    PathBuf::from("authors")
}

fn default_storefront_url() -> String {
    "https://www.amazon.com".to_string()
}

fn default_user_agents_url() -> String {
    "https://gist.githubusercontent.com/pzb/b4b6f57144aea7827ae4/raw/cf847b76a142955b1410c8bcef3aabe221a63db1/user-agents.txt".to_string()
}

fn default_probe_author() -> String {
    "Robin Hobb".to_string()
}

fn default_pushover_url() -> String {
    "https://api.pushover.net/1/messages.json".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            author_list: default_author_list(),
            authors_folder: default_authors_folder(),
            storefront_url: default_storefront_url(),
            user_agents_url: default_user_agents_url(),
            probe_author: default_probe_author(),
            pushover_url: default_pushover_url(),
            pushover_user: None,
            pushover_token: None,
            timeout_secs: default_timeout_secs(),
            log_level: LogLevel::Info,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("amz-book-tracker").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Some(path) = non_empty_env("BOOK_TRACKER_AUTHOR_LIST") {
            self.author_list = PathBuf::from(path);
        }

        if let Some(path) = non_empty_env("BOOK_TRACKER_AUTHORS_FOLDER") {
            self.authors_folder = PathBuf::from(path);
        }

        self
    }

    /// Returns the Pushover credentials, or `None` on a dry run.
    ///
    /// Both values are required otherwise.
    pub fn credentials(&self, dry_run: bool) -> Result<Option<Credentials>, TrackerError> {
        if dry_run {
            return Ok(None);
        }

        match (non_blank(&self.pushover_user), non_blank(&self.pushover_token)) {
            (Some(user), Some(token)) => {
                Ok(Some(Credentials { user: user.to_string(), token: token.to_string() }))
            }
            _ => Err(TrackerError::MissingCredentials),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Pushover user key and application token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub token: String,
}

/// Log verbosity levels accepted on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
    Critical,
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            "critical" => Ok(LogLevel::Critical),
            _ => Err(format!(
                "Unknown log level: {}. Use: DEBUG, INFO, WARNING, ERROR, CRITICAL",
                s
            )),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARNING"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warning => tracing::Level::WARN,
            LogLevel::Error | LogLevel::Critical => tracing::Level::ERROR,
        }
    }
}
