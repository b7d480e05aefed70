//! Configuration validation
//!
//! Validates config consistency:
//! - The active preset exists and declares at least one metric
//! - The syslog listen address carries a supported scheme
//! - The web listen address is non-empty
//!
//! Per-metric structural checks (empty names, missing value indexes,
//! pattern compilation) are performed when the preset is compiled into
//! live metrics, not here.

use crate::error::{ConfigError, Result};
use crate::Config;

/// Schemes the syslog listener accepts
const SYSLOG_SCHEMES: &[&str] = &["udp://", "unix://"];

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_preset(config)?;
    validate_syslog(config)?;
    validate_web(config)?;
    Ok(())
}

/// The active preset must exist and be non-empty
fn validate_preset(config: &Config) -> Result<()> {
    let name = &config.global.preset;

    let preset = config
        .presets
        .get(name)
        .ok_or_else(|| ConfigError::unknown_preset(name))?;

    if preset.metrics.is_empty() {
        return Err(ConfigError::empty_preset(name));
    }

    Ok(())
}

/// The syslog listen address must use a supported datagram scheme
fn validate_syslog(config: &Config) -> Result<()> {
    let addr = &config.syslog.listen_address;

    if addr.is_empty() {
        return Err(ConfigError::invalid_listen_address(addr, "address is empty"));
    }

    if !SYSLOG_SCHEMES.iter().any(|scheme| addr.starts_with(scheme)) {
        return Err(ConfigError::invalid_listen_address(
            addr,
            "must start with udp:// or unix://",
        ));
    }

    Ok(())
}

/// The web listen address must be non-empty
fn validate_web(config: &Config) -> Result<()> {
    if config.web.listen_address.is_empty() {
        return Err(ConfigError::invalid_value(
            "web",
            "web",
            "listen_address",
            "address is empty",
        ));
    }

    Ok(())
}
