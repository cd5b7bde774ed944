use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::common::format;
use crate::sweeper::DirPolicy;

/// Environment variable that relocates the data directory
pub const HOME_ENV: &str = "RUNSWEEP_HOME";

/// Global runsweep configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory swept when none is given on the command line
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Retention window in seconds
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,

    /// Entry names that are never deleted
    #[serde(default = "default_exempt")]
    pub exempt: Vec<String>,

    /// What to do with subdirectory entries
    #[serde(default)]
    pub dir_policy: DirPolicy,

    /// Write a history record after each sweep
    #[serde(default = "default_keep_history")]
    pub keep_history: bool,

    /// Output format preference
    #[serde(default)]
    pub output_format: OutputFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Quiet,
}

fn default_directory() -> PathBuf {
    PathBuf::from("run")
}
fn default_retention_secs() -> u64 {
    60
}
fn default_exempt() -> Vec<String> {
    vec!["massccs".to_string()]
}
fn default_keep_history() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            retention_secs: default_retention_secs(),
            exempt: default_exempt(),
            dir_policy: DirPolicy::default(),
            keep_history: default_keep_history(),
            output_format: OutputFormat::Human,
        }
    }
}

impl Config {
    /// Get the runsweep data directory (`$RUNSWEEP_HOME` or ~/.runsweep)
    pub fn data_dir() -> PathBuf {
        if let Some(dir) = std::env::var_os(HOME_ENV) {
            return PathBuf::from(dir);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".runsweep")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        Self::data_dir().join("config.toml")
    }

    /// Get the sweep history directory
    pub fn history_dir() -> PathBuf {
        Self::data_dir().join("history")
    }

    /// Get the logs directory
    pub fn logs_dir() -> PathBuf {
        Self::data_dir().join("logs")
    }

    /// Load config from file, or fall back to defaults if it does not exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            Self::parse(&contents)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Parse config from TOML text
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        let dir = Self::data_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config dir: {}", dir.display()))?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Initialize all runsweep directories
    pub fn init_dirs() -> Result<()> {
        let dirs = [Self::data_dir(), Self::history_dir(), Self::logs_dir()];
        for dir in &dirs {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }

    /// Retention window as a duration
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    /// Set a single key from its string form
    /// Set `key` from its command-line values.
    ///
    /// `exempt` replaces the list with `values` taken verbatim (empty strings
    /// dropped, so `""` clears it); names may contain commas. Every other key
    /// takes exactly one value.
    pub fn set(&mut self, key: &str, values: &[String]) -> Result<()> {
        if key == "exempt" {
            self.exempt = values.iter().filter(|v| !v.is_empty()).cloned().collect();
            return Ok(());
        }
        let value = match values {
            [value] => value.as_str(),
            _ => anyhow::bail!("Config key '{}' takes a single value", key),
        };
        match key {
            "directory" => self.directory = PathBuf::from(value),
            "retention_secs" => {
                self.retention_secs = value
                    .parse()
                    .with_context(|| format!("Invalid retention_secs: {}", value))?
            }
            "retention" => {
                self.retention_secs = format::parse_duration(value)
                    .map_err(anyhow::Error::msg)?
                    .as_secs()
            }
            "dir_policy" => self.dir_policy = value.parse()?,
            "keep_history" => {
                self.keep_history = value
                    .parse()
                    .with_context(|| format!("Invalid keep_history: {}", value))?
            }
            "output_format" => {
                self.output_format = match value {
                    "human" => OutputFormat::Human,
                    "json" => OutputFormat::Json,
                    "quiet" => OutputFormat::Quiet,
                    _ => anyhow::bail!("Unknown output format: {}", value),
                }
            }
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        Ok(())
    }
}
