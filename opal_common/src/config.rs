//! Configuration loading traits and types.
//!
//! This module provides a standardized way to load TOML configuration
//! files across the OPAL workspace, plus the `ServerConfig` consumed by
//! the server binary.
//!
//! # Usage
//!
//! ```rust,no_run
//! use opal_common::config::{ConfigLoader, ServerConfig, ConfigError};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = ServerConfig::load(Path::new("server.toml"))?;
//!     config.validate()?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

/// Common configuration fields shared across OPAL applications.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "opal-edge-01"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: "opal-edge".to_string(),
        }
    }
}

/// Server endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    /// TCP port the transport layer binds to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the DER-encoded server certificate. Absence of the file
    /// is not an error; the server starts without a certificate.
    #[serde(default = "default_certificate")]
    pub certificate: PathBuf,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            certificate: default_certificate(),
        }
    }
}

fn default_port() -> u16 {
    16664
}

fn default_certificate() -> PathBuf {
    PathBuf::from("server_cert.der")
}

/// Backing paths for the hardware-backed variables.
///
/// Each binding is created only if its backing path is accessible at
/// startup; a missing path silently disables the binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardwareSection {
    /// CPU temperature sensor file (text integer, millidegrees).
    #[serde(default = "default_thermal_zone")]
    pub thermal_zone: PathBuf,

    /// LED trigger file (mode selector).
    #[serde(default = "default_led_trigger")]
    pub led_trigger: PathBuf,

    /// LED brightness file (text "0"/"1").
    #[serde(default = "default_led_brightness")]
    pub led_brightness: PathBuf,

    /// Trigger mode restored at shutdown.
    #[serde(default = "default_led_default_trigger")]
    pub led_default_trigger: String,
}

impl Default for HardwareSection {
    fn default() -> Self {
        Self {
            thermal_zone: default_thermal_zone(),
            led_trigger: default_led_trigger(),
            led_brightness: default_led_brightness(),
            led_default_trigger: default_led_default_trigger(),
        }
    }
}

fn default_thermal_zone() -> PathBuf {
    PathBuf::from("/sys/class/thermal/thermal_zone0/temp")
}

fn default_led_trigger() -> PathBuf {
    PathBuf::from("/sys/class/leds/led0/trigger")
}

fn default_led_brightness() -> PathBuf {
    PathBuf::from("/sys/class/leds/led0/brightness")
}

fn default_led_default_trigger() -> String {
    "mmc0".to_string()
}

/// Top-level server configuration.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "info"
/// service_name = "opal-edge-01"
///
/// [server]
/// port = 16664
/// certificate = "server_cert.der"
///
/// [hardware]
/// thermal_zone = "/sys/class/thermal/thermal_zone0/temp"
/// led_trigger = "/sys/class/leds/led0/trigger"
/// led_brightness = "/sys/class/leds/led0/brightness"
/// led_default_trigger = "mmc0"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Common fields.
    #[serde(default)]
    pub shared: SharedConfig,

    /// Endpoint settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Hardware backing paths.
    #[serde(default)]
    pub hardware: HardwareSection,
}

impl ServerConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `service_name` is empty
    /// - `port` is zero
    /// - any hardware backing path is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shared.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port cannot be zero".to_string(),
            ));
        }
        for (name, path) in [
            ("hardware.thermal_zone", &self.hardware.thermal_zone),
            ("hardware.led_trigger", &self.hardware.led_trigger),
            ("hardware.led_brightness", &self.hardware.led_brightness),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{name} cannot be empty"
                )));
            }
        }
        Ok(())
    }
}

/// Trait for loading configuration from TOML files.
///
/// This trait provides a default implementation that works with any type
/// implementing `serde::de::DeserializeOwned`.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - Successfully loaded and parsed configuration
    /// * `Err(ConfigError)` - Loading or parsing failed
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_default() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 16664);
        assert_eq!(config.hardware.led_default_trigger, "mmc0");
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = ServerConfig::default();
        config.server.port = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_empty_service_name_rejected() {
        let mut config = ServerConfig::default();
        config.shared.service_name.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_empty_hardware_path_rejected() {
        let mut config = ServerConfig::default();
        config.hardware.thermal_zone = PathBuf::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
