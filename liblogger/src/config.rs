/*
 * Logger configuration
 *
 * This module handles:
 * - Parsing the [logging] section of a TOML file (app_config.toml by default)
 * - The LogType enum for output destinations (Console, File)
 * - The LogLevel enum for severity levels (Debug, Info, Warn, Error)
 * - Default values for every setting
 *
 * Unknown keys and other sections of the file are ignored, so the engine
 * can keep its own settings next to [logging].
 */

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Log severity levels, ordered from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

// Case-insensitive, and accepts "warning" as an alias
impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(serde::de::Error::unknown_variant(
                &s,
                &["debug", "info", "warn", "warning", "error"],
            )),
        }
    }
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Supported output types for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogType {
    Console,
    File,
}

impl<'de> Deserialize<'de> for LogType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_lowercase().as_str() {
            "console" => Ok(LogType::Console),
            "file" => Ok(LogType::File),
            _ => Err(serde::de::Error::unknown_variant(&s, &["console", "file"])),
        }
    }
}

/// Configuration for the logger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Type of output (console, file)
    #[serde(rename = "type", default = "default_log_type")]
    pub log_type: LogType,

    /// Minimum log level to record
    #[serde(default = "default_threshold")]
    pub threshold: LogLevel,

    /// File name (or path) for file-based logging
    #[serde(default)]
    pub file_path: Option<String>,

    /// Folder for log files, joined in front of `file_path`
    #[serde(default)]
    pub log_folder: Option<String>,

    /// Hand lines to a background worker instead of writing inline
    #[serde(default)]
    pub async_logging: bool,

    /// Flush the file after every line
    #[serde(default)]
    pub force_flush: bool,
}

fn default_log_type() -> LogType {
    LogType::Console
}

fn default_threshold() -> LogLevel {
    LogLevel::Info
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            log_type: default_log_type(),
            threshold: default_threshold(),
            file_path: None,
            log_folder: None,
            async_logging: false,
            force_flush: false,
        }
    }
}

/// The [logging] section of a larger TOML document
#[derive(Debug, Deserialize)]
struct ConfigWrapper {
    #[serde(default)]
    logging: Option<LogConfig>,
}

impl LogConfig {
    /// Create configuration from a TOML file.
    ///
    /// A missing file is not an error: the defaults are used instead.
    pub fn from_file<P: AsRef<Path>>(file_path: P) -> Result<Self, String> {
        let file_path = file_path.as_ref();
        let config_str = match fs::read_to_string(file_path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!(
                    "Warning: Could not read config file '{}': {}. Using defaults.",
                    file_path.display(),
                    e
                );
                return Ok(LogConfig::default());
            }
        };

        Self::from_toml_str(&config_str)
    }

    /// Parse the [logging] section out of a TOML document
    pub fn from_toml_str(config_str: &str) -> Result<Self, String> {
        let wrapper: ConfigWrapper = toml::from_str(config_str)
            .map_err(|e| format!("Failed to parse logging config: {}", e))?;
        Ok(wrapper.logging.unwrap_or_default())
    }

    /// Full path of the log file, if file logging is configured
    pub fn resolved_file_path(&self) -> Option<PathBuf> {
        let file_path = self.file_path.as_ref()?;
        Some(match &self.log_folder {
            Some(folder) => Path::new(folder).join(file_path),
            None => PathBuf::from(file_path),
        })
    }
}
