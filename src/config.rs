//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub calibration: CalibrationConfig,
}

/// Device discovery configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DeviceConfig {
    /// Explicit device node; empty means auto-detect.
    #[serde(default)]
    pub path: String,

    /// Substrings the kernel device name must all contain during
    /// auto-detection.
    #[serde(default = "default_name_patterns")]
    pub name_patterns: Vec<String>,

    /// Open the device in non-blocking mode.
    #[serde(default)]
    pub nonblocking: bool,
}

/// Deadzone filter configuration
#[derive(Debug, Deserialize, Clone)]
pub struct FilterConfig {
    #[serde(default = "default_threshold")]
    pub threshold: u16,
}

/// Calibration configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CalibrationConfig {
    /// Run a calibration pass when the device is opened.
    #[serde(default = "default_calibrate_on_open")]
    pub on_open: bool,

    /// Bound on the calibration sampling window.
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
}

// Default value functions
fn default_name_patterns() -> Vec<String> {
    vec!["3Dconnexion".to_string(), "Space".to_string()]
}
fn default_threshold() -> u16 { 0 }
fn default_calibrate_on_open() -> bool { true }
fn default_window_ms() -> u64 { 100 }

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            name_patterns: default_name_patterns(),
            nonblocking: false,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            on_open: default_calibrate_on_open(),
            window_ms: default_window_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            filter: FilterConfig::default(),
            calibration: CalibrationConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use spacenav_input::config::Config;
    ///
    /// let config = Config::load("config/spacenav.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.device.path.is_empty() && self.device.name_patterns.is_empty() {
            return Err(crate::error::Error::Config(toml::de::Error::custom(
                "name_patterns cannot be empty when no device path is set",
            )));
        }

        if self.calibration.window_ms == 0 || self.calibration.window_ms > 10000 {
            return Err(crate::error::Error::Config(toml::de::Error::custom(
                "window_ms must be between 1 and 10000",
            )));
        }

        Ok(())
    }
}
