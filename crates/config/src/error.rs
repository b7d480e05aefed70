//! Configuration error types

use std::io;
use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("failed to read config file '{path}': {source}")]
    IoError {
        /// Path to the file
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The active preset is not declared in the configuration
    #[error("preset '{preset}' not found in configuration")]
    UnknownPreset {
        /// Name of the missing preset
        preset: String,
    },

    /// The active preset declares no metrics
    #[error("preset '{preset}' declares no metrics")]
    EmptyPreset {
        /// Name of the empty preset
        preset: String,
    },

    /// Listen address has an unsupported scheme or is malformed
    #[error("invalid listen address '{address}': {message}")]
    InvalidListenAddress {
        /// The offending address
        address: String,
        /// What is wrong with it
        message: String,
    },

    /// Validation error - invalid value
    #[error("{component} '{name}' has invalid {field}: {message}")]
    InvalidValue {
        /// Component type
        component: &'static str,
        /// Name of the component
        name: String,
        /// Field name
        field: &'static str,
        /// Error message
        message: String,
    },
}

impl ConfigError {
    /// Create an UnknownPreset error
    pub fn unknown_preset(preset: impl Into<String>) -> Self {
        Self::UnknownPreset {
            preset: preset.into(),
        }
    }

    /// Create an EmptyPreset error
    pub fn empty_preset(preset: impl Into<String>) -> Self {
        Self::EmptyPreset {
            preset: preset.into(),
        }
    }

    /// Create an InvalidListenAddress error
    pub fn invalid_listen_address(
        address: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidListenAddress {
            address: address.into(),
            message: message.into(),
        }
    }

    /// Create an InvalidValue error
    pub fn invalid_value(
        component: &'static str,
        name: impl Into<String>,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            component,
            name: name.into(),
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_preset_error() {
        let err = ConfigError::unknown_preset("nginx_full");
        assert!(err.to_string().contains("nginx_full"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_empty_preset_error() {
        let err = ConfigError::empty_preset("simple");
        assert!(err.to_string().contains("simple"));
        assert!(err.to_string().contains("no metrics"));
    }

    #[test]
    fn test_invalid_listen_address_error() {
        let err = ConfigError::invalid_listen_address("tcp://0.0.0.0:514", "unsupported scheme");
        assert!(err.to_string().contains("tcp://0.0.0.0:514"));
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_invalid_value_error() {
        let err = ConfigError::invalid_value("metric", "http_requests_total", "kind", "unknown");
        assert!(err.to_string().contains("http_requests_total"));
        assert!(err.to_string().contains("kind"));
    }
}
