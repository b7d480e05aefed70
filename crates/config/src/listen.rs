//! Listen address configuration
//!
//! Addresses for the syslog ingestion socket and the HTTP scrape endpoint.

use serde::Deserialize;

/// Syslog ingestion configuration
///
/// The listen address uses a URI-like scheme prefix:
///
/// - `udp://host:port` - UDP datagram socket
/// - `unix://path` - unix datagram socket
///
/// # Example
///
/// ```toml
/// [syslog]
/// listen_address = "udp://[::]:8514"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SyslogConfig {
    /// Datagram listen address (`udp://host:port` or `unix://path`)
    /// Default: "udp://[::]:8514"
    pub listen_address: String,
}

impl Default for SyslogConfig {
    fn default() -> Self {
        Self {
            listen_address: "udp://[::]:8514".into(),
        }
    }
}

/// HTTP scrape endpoint configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WebConfig {
    /// Address the scrape endpoint binds to
    /// Default: "[::]:4040"
    pub listen_address: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            listen_address: "[::]:4040".into(),
        }
    }
}

/// Debug endpoint toggle
///
/// The debug endpoint itself is served by the host process; the core only
/// carries the toggle through.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DebugConfig {
    /// Enable the separate debug endpoint
    /// Default: false
    pub enable: bool,
}
