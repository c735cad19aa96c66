//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::config_path;
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Service endpoints
    #[serde(default)]
    pub services: ServicesConfig,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Startup health check settings
    #[serde(default)]
    pub readiness: ReadinessConfig,

    /// Data population settings
    #[serde(default)]
    pub seed: SeedConfig,

    /// Input and output file names
    #[serde(default)]
    pub files: FilesConfig,
}

/// Base URLs of the services the runner talks to
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    #[serde(default = "default_store_1_url")]
    pub store_1_url: String,

    #[serde(default = "default_store_2_url")]
    pub store_2_url: String,

    #[serde(default = "default_order_url")]
    pub order_url: String,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            store_1_url: default_store_1_url(),
            store_2_url: default_store_2_url(),
            order_url: default_order_url(),
        }
    }
}

fn default_store_1_url() -> String {
    "http://localhost:5001".to_string()
}
fn default_store_2_url() -> String {
    "http://localhost:5002".to_string()
}
fn default_order_url() -> String {
    "http://localhost:5003".to_string()
}

/// Timeout settings in seconds
#[derive(Debug, Deserialize, Clone)]
pub struct Timeouts {
    /// Timeout for each query or purchase call
    #[serde(default = "default_request")]
    pub request_secs: u64,

    /// Timeout for a single health probe
    #[serde(default = "default_probe")]
    pub probe_secs: u64,

    /// Timeout for each data population call
    #[serde(default = "default_seed_request")]
    pub seed_request_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request_secs: default_request(),
            probe_secs: default_probe(),
            seed_request_secs: default_seed_request(),
        }
    }
}

fn default_request() -> u64 {
    10
}
fn default_probe() -> u64 {
    2
}
fn default_seed_request() -> u64 {
    30
}

impl Timeouts {
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    pub fn probe(&self) -> Duration {
        Duration::from_secs(self.probe_secs)
    }

    pub fn seed_request(&self) -> Duration {
        Duration::from_secs(self.seed_request_secs)
    }
}

/// Startup health check configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ReadinessConfig {
    /// Give up after this many failed probe rounds
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause between probe rounds
    #[serde(default = "default_interval")]
    pub interval_ms: u64,

    /// Pause after all services answered
    #[serde(default = "default_settle")]
    pub settle_ms: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_ms: default_interval(),
            settle_ms: default_settle(),
        }
    }
}

fn default_max_attempts() -> u32 {
    60
}
fn default_interval() -> u64 {
    1000
}
fn default_settle() -> u64 {
    2000
}

impl ReadinessConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Data population configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SeedConfig {
    /// Populate the stores before running commands
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Pause after population so the stores can catch up
    #[serde(default = "default_settle")]
    pub settle_ms: u64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            settle_ms: default_settle(),
        }
    }
}

fn default_true() -> bool {
    true
}

impl SeedConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Command file and transcript locations
#[derive(Debug, Deserialize, Clone)]
pub struct FilesConfig {
    #[serde(default = "default_input")]
    pub input: PathBuf,

    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
        }
    }
}

fn default_input() -> PathBuf {
    PathBuf::from("query.txt")
}
fn default_output() -> PathBuf {
    PathBuf::from("response.txt")
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.readiness.max_attempts == 0 {
            return Err(Error::Config(
                "readiness.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.timeouts.request_secs == 0 || self.timeouts.probe_secs == 0 {
            return Err(Error::Config("timeouts must be non-zero".to_string()));
        }
        Ok(())
    }
}
