//! httplog Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! Minimal config should just work - only specify what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use httplog_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str(
//!     "[[presets.simple.metrics]]\nname = \"http_requests_total\"\nkind = \"counter\"",
//! )
//! .unwrap();
//! assert_eq!(config.global.preset, "simple");
//! ```
//!
//! # Example Minimal Config
//!
//! ```toml
//! [[presets.simple.metrics]]
//! name = "http_requests_total"
//! kind = "counter"
//! labels = [
//!     { name = "host", line_index = 0 },
//!     { name = "status", line_index = 2 },
//! ]
//! ```
//!
//! # Example Full Config
//!
//! See `configs/example.toml` for all available options.

mod error;
mod global;
mod listen;
mod logging;
mod preset;
mod validation;

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use global::{GlobalConfig, DEFAULT_BUFFER_SIZE};
pub use listen::{DebugConfig, SyslogConfig, WebConfig};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use preset::{
    LabelSpec, MathSpec, MetricKind, MetricSpec, Preset, ReplacementSpec, UpstreamSpec,
};

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults, except that the
/// active preset must exist and declare at least one metric.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Global settings (active preset, worker count, queue capacity)
    pub global: GlobalConfig,

    /// Logging configuration
    pub log: LogConfig,

    /// Syslog ingestion socket
    pub syslog: SyslogConfig,

    /// HTTP scrape endpoint
    pub web: WebConfig,

    /// Debug endpoint toggle
    pub debug: DebugConfig,

    /// Named presets (metric specifications sharing one log schema)
    pub presets: HashMap<String, Preset>,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML, or
    /// fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// Get the active preset
    ///
    /// Validation guarantees the preset exists in a parsed config, but a
    /// hand-built `Config` may not carry it, so this stays fallible.
    pub fn active_preset(&self) -> Result<&Preset> {
        self.presets
            .get(&self.global.preset)
            .ok_or_else(|| ConfigError::unknown_preset(&self.global.preset))
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
